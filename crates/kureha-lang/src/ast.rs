use smol_str::SmolStr;

pub mod build;
pub mod node;
pub mod params;

pub use node::{
    Alternate, BinaryOperator, Block, BlockStyle, Body, Call, CallOperator, ConditionalKind, Expr, LoopKind, Node,
    RescueClause, StringPart, UnaryOperator, VariableKind, WhenClause,
};
pub use params::{KeywordParam, KeywordRest, NamedSplat, OptionalParam, ParamTarget, Params};

pub type Name = SmolStr;
pub type Statements = Vec<Node>;
