//! Parse tree model consumed by the kureha minifier.
//!
//! Trees are built by an external Ruby parser and handed over either as Rust
//! values (see [`build`]) or, with the `ast-json` feature, as JSON documents.
//!
//! ```rust
//! use kureha_lang::{build, Expr};
//!
//! let call = build::fcall("puts", vec![build::string("hi")]);
//! assert!(matches!(call.expr, Expr::Call(_)));
//! ```
#[cfg(feature = "ast-json")]
use serde::{Deserialize, Serialize};

pub mod ast;
mod error;
mod range;

pub use ast::build;
pub use ast::{
    Alternate, BinaryOperator, Block, BlockStyle, Body, Call, CallOperator, ConditionalKind, Expr, KeywordParam,
    KeywordRest, LoopKind, Name, NamedSplat, Node, OptionalParam, ParamTarget, Params, RescueClause, Statements,
    StringPart, UnaryOperator, VariableKind, WhenClause,
};
pub use error::SyntaxError;
pub use range::{Position, Range};

/// What an upstream parser hands over: the tree plus any diagnostics it raised.
#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub struct ParseResult {
    pub program: Node,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub errors: Vec<SyntaxError>,
}

impl ParseResult {
    pub fn new(program: Node) -> Self {
        Self {
            program,
            errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[cfg(feature = "ast-json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[cfg(feature = "ast-json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<Node> for ParseResult {
    fn from(program: Node) -> Self {
        ParseResult::new(program)
    }
}
