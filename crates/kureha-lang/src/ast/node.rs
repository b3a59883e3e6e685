#[cfg(feature = "ast-json")]
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{Name, Params, Statements};
use crate::range::Range;

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub struct Node {
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub range: Range,
    #[cfg_attr(feature = "ast-json", serde(deserialize_with = "json::deserialize_expr"))]
    pub expr: Expr,
}

impl Node {
    pub fn new(expr: Expr) -> Self {
        Self {
            range: Range::default(),
            expr,
        }
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        self.expr.kind_name()
    }

    #[cfg(feature = "ast-json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "ast-json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Expr> for Node {
    fn from(expr: Expr) -> Self {
        Node::new(expr)
    }
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub enum Expr {
    Program(Statements),
    Statements(Statements),
    Parentheses(Statements),

    Def {
        receiver: Option<Box<Node>>,
        name: Name,
        params: Option<Params>,
        body: Body,
    },
    Class {
        path: Box<Node>,
        superclass: Option<Box<Node>>,
        body: Body,
    },
    SingletonClass {
        target: Box<Node>,
        body: Body,
    },
    Module {
        path: Box<Node>,
        body: Body,
    },

    Conditional {
        kind: ConditionalKind,
        predicate: Box<Node>,
        consequent: Statements,
        alternate: Option<Alternate>,
        #[cfg_attr(feature = "ast-json", serde(default))]
        modifier: bool,
    },
    Ternary {
        predicate: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    Case {
        subject: Option<Box<Node>>,
        whens: Vec<WhenClause>,
        #[cfg_attr(feature = "ast-json", serde(default))]
        else_: Option<Statements>,
    },
    Loop {
        kind: LoopKind,
        predicate: Box<Node>,
        body: Statements,
        #[cfg_attr(feature = "ast-json", serde(default))]
        modifier: bool,
        #[cfg_attr(feature = "ast-json", serde(default))]
        do_while: bool,
    },
    For {
        targets: Vec<Node>,
        collection: Box<Node>,
        body: Statements,
    },
    Begin(Body),
    RescueModifier {
        expression: Box<Node>,
        rescue: Box<Node>,
    },
    Return(Vec<Node>),
    Break(Vec<Node>),
    Next(Vec<Node>),
    Redo,
    Retry,
    Yield(Vec<Node>),
    /// `args: None` is the implicit-argument `super`.
    Super {
        args: Option<Vec<Node>>,
        block: Option<Block>,
    },
    Alias {
        new_name: Box<Node>,
        old_name: Box<Node>,
    },
    Undef(Vec<Node>),
    Defined(Box<Node>),

    Lambda(Block),
    Call(Call),
    BinaryOp {
        op: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Node>,
    },

    /// Source digits, possibly signed or radix-prefixed.
    Integer(SmolStr),
    Float(f64),
    True,
    False,
    Nil,
    SelfRef,
    Symbol(SmolStr),
    String(String),
    InterpolatedString(Vec<StringPart>),
    InterpolatedSymbol(Vec<StringPart>),
    XString(Vec<StringPart>),
    Regex {
        parts: Vec<StringPart>,
        #[cfg_attr(feature = "ast-json", serde(default))]
        flags: SmolStr,
    },
    /// Adjacent string literals, `"a" "b"`.
    StringConcat(Vec<Node>),
    Array(Vec<Node>),
    Hash(Vec<Node>),
    /// Brace-less hash in argument position, `f(a: 1)`.
    KeywordHash(Vec<Node>),
    Pair {
        key: Box<Node>,
        value: Box<Node>,
    },
    Range {
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
        #[cfg_attr(feature = "ast-json", serde(default))]
        exclusive: bool,
    },
    Splat(Option<Box<Node>>),
    DoubleSplat(Option<Box<Node>>),
    BlockArgument(Option<Box<Node>>),
    ForwardingArguments,

    /// The name carries its sigil (`@a`, `@@a`, `$a`).
    Variable {
        kind: VariableKind,
        name: Name,
    },
    ConstantPath {
        parent: Option<Box<Node>>,
        name: Name,
    },
    Assign {
        target: Box<Node>,
        value: Box<Node>,
    },
    OpAssign {
        target: Box<Node>,
        operator: BinaryOperator,
        value: Box<Node>,
    },
    MultiAssign {
        targets: Vec<Node>,
        values: Vec<Node>,
    },
    /// Nested destructuring target, `(a, b), c = ...`.
    MultiTarget(Vec<Node>),

    Comment(String),
    BlankLine,

    /// A construct the upstream parser recognised but this tree has no shape for.
    Unsupported {
        kind: SmolStr,
    },
}

impl Expr {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Program(_) => "program",
            Expr::Statements(_) => "statements",
            Expr::Parentheses(_) => "parentheses",
            Expr::Def { .. } => "def",
            Expr::Class { .. } => "class",
            Expr::SingletonClass { .. } => "singleton_class",
            Expr::Module { .. } => "module",
            Expr::Conditional {
                kind: ConditionalKind::If,
                ..
            } => "if",
            Expr::Conditional {
                kind: ConditionalKind::Unless,
                ..
            } => "unless",
            Expr::Ternary { .. } => "ternary",
            Expr::Case { .. } => "case",
            Expr::Loop {
                kind: LoopKind::While,
                ..
            } => "while",
            Expr::Loop {
                kind: LoopKind::Until,
                ..
            } => "until",
            Expr::For { .. } => "for",
            Expr::Begin(_) => "begin",
            Expr::RescueModifier { .. } => "rescue_modifier",
            Expr::Return(_) => "return",
            Expr::Break(_) => "break",
            Expr::Next(_) => "next",
            Expr::Redo => "redo",
            Expr::Retry => "retry",
            Expr::Yield(_) => "yield",
            Expr::Super { .. } => "super",
            Expr::Alias { .. } => "alias",
            Expr::Undef(_) => "undef",
            Expr::Defined(_) => "defined",
            Expr::Lambda(_) => "lambda",
            Expr::Call(_) => "call",
            Expr::BinaryOp { .. } => "binary_op",
            Expr::UnaryOp { .. } => "unary_op",
            Expr::Integer(_) => "integer",
            Expr::Float(_) => "float",
            Expr::True => "true",
            Expr::False => "false",
            Expr::Nil => "nil",
            Expr::SelfRef => "self",
            Expr::Symbol(_) => "symbol",
            Expr::String(_) => "string",
            Expr::InterpolatedString(_) => "interpolated_string",
            Expr::InterpolatedSymbol(_) => "interpolated_symbol",
            Expr::XString(_) => "xstring",
            Expr::Regex { .. } => "regex",
            Expr::StringConcat(_) => "string_concat",
            Expr::Array(_) => "array",
            Expr::Hash(_) => "hash",
            Expr::KeywordHash(_) => "keyword_hash",
            Expr::Pair { .. } => "pair",
            Expr::Range { .. } => "range",
            Expr::Splat(_) => "splat",
            Expr::DoubleSplat(_) => "double_splat",
            Expr::BlockArgument(_) => "block_argument",
            Expr::ForwardingArguments => "forwarding_arguments",
            Expr::Variable { .. } => "variable",
            Expr::ConstantPath { .. } => "constant_path",
            Expr::Assign { .. } => "assign",
            Expr::OpAssign { .. } => "op_assign",
            Expr::MultiAssign { .. } => "multi_assign",
            Expr::MultiTarget(_) => "multi_target",
            Expr::Comment(_) => "comment",
            Expr::BlankLine => "blank_line",
            Expr::Unsupported { .. } => "unsupported",
        }
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self, Expr::Comment(_) | Expr::BlankLine)
    }
}

/// Statements of a definition, `begin` or `do` block with their exception clauses.
#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Body {
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub statements: Statements,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub rescues: Vec<RescueClause>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub else_: Option<Statements>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub ensure: Option<Statements>,
}

impl Body {
    pub fn has_clauses(&self) -> bool {
        !self.rescues.is_empty() || self.else_.is_some() || self.ensure.is_some()
    }
}

impl From<Statements> for Body {
    fn from(statements: Statements) -> Self {
        Body {
            statements,
            ..Default::default()
        }
    }
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RescueClause {
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub exceptions: Vec<Node>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub reference: Option<Box<Node>>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub body: Statements,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub struct WhenClause {
    pub conditions: Vec<Node>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub body: Statements,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub enum Alternate {
    /// Must hold a non-modifier `if` conditional.
    Elsif(Box<Node>),
    Else(Statements),
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ConditionalKind {
    If,
    Unless,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum LoopKind {
    While,
    Until,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum BlockStyle {
    #[default]
    Brace,
    Do,
}

/// A block attached to a call or `super`, also the body of a lambda.
#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Block {
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub params: Option<Params>,
    /// Block-local variables, `|a; b|`.
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub locals: Vec<Name>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub body: Body,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub style: BlockStyle,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum CallOperator {
    #[default]
    Dot,
    SafeNavigation,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Call {
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub receiver: Option<Box<Node>>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub operator: CallOperator,
    pub name: Name,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub args: Vec<Node>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub block: Option<Block>,
    /// Set when the source was a bare identifier with no receiver, arguments or parentheses.
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub variable_call: bool,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum VariableKind {
    Local,
    Instance,
    Class,
    Global,
    Constant,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub enum StringPart {
    Text(String),
    Embedded(Statements),
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum BinaryOperator {
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Gt,
    Ge,
    Lt,
    Le,
    Cmp,
    Eq,
    CaseEq,
    NotEq,
    Match,
    NotMatch,
    And,
    Or,
    /// Low-precedence `and`.
    KeywordAnd,
    /// Low-precedence `or`.
    KeywordOr,
}

impl BinaryOperator {
    pub fn from_method_name(name: &str) -> Option<Self> {
        Some(match name {
            "**" => BinaryOperator::Pow,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Mod,
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "<<" => BinaryOperator::Shl,
            ">>" => BinaryOperator::Shr,
            "&" => BinaryOperator::BitAnd,
            "|" => BinaryOperator::BitOr,
            "^" => BinaryOperator::BitXor,
            ">" => BinaryOperator::Gt,
            ">=" => BinaryOperator::Ge,
            "<" => BinaryOperator::Lt,
            "<=" => BinaryOperator::Le,
            "<=>" => BinaryOperator::Cmp,
            "==" => BinaryOperator::Eq,
            "===" => BinaryOperator::CaseEq,
            "!=" => BinaryOperator::NotEq,
            "=~" => BinaryOperator::Match,
            "!~" => BinaryOperator::NotMatch,
            _ => return None,
        })
    }
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum UnaryOperator {
    /// `!` and `not`.
    Not,
    BitNot,
    Plus,
    Negate,
}

impl UnaryOperator {
    pub fn from_method_name(name: &str) -> Option<Self> {
        Some(match name {
            "!" => UnaryOperator::Not,
            "~" => UnaryOperator::BitNot,
            "+@" => UnaryOperator::Plus,
            "-@" => UnaryOperator::Negate,
            _ => return None,
        })
    }
}

#[cfg(feature = "ast-json")]
mod json {
    use std::fmt;

    use serde::de::{self, IntoDeserializer};
    use serde::{Deserialize, Deserializer};

    use super::Expr;

    /// Node kinds an upstream parser emits that the model has no shape for become
    /// `Expr::Unsupported`, so they fail at render time under their own name.
    pub(super) fn deserialize_expr<'de, D>(deserializer: D) -> Result<Expr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let kind = match &value {
            serde_json::Value::String(kind) => Some(kind.as_str()),
            serde_json::Value::Object(map) if map.len() == 1 => map.keys().next().map(String::as_str),
            _ => None,
        };

        if let Some(kind) = kind.filter(|kind| !is_known_kind(kind)) {
            return Ok(Expr::Unsupported { kind: kind.into() });
        }

        Expr::deserialize(value).map_err(de::Error::custom)
    }

    fn is_known_kind(kind: &str) -> bool {
        !matches!(
            Expr::deserialize(IntoDeserializer::<KindCheck>::into_deserializer(kind)),
            Err(KindCheck::Unknown)
        )
    }

    /// Error type that only tells an unknown variant tag apart from every other failure.
    #[derive(Debug)]
    enum KindCheck {
        Unknown,
        Other,
    }

    impl fmt::Display for KindCheck {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                KindCheck::Unknown => write!(f, "unknown node kind"),
                KindCheck::Other => write!(f, "known node kind"),
            }
        }
    }

    impl std::error::Error for KindCheck {}

    impl de::Error for KindCheck {
        fn custom<T: fmt::Display>(_msg: T) -> Self {
            KindCheck::Other
        }

        fn unknown_variant(_variant: &str, _expected: &'static [&'static str]) -> Self {
            KindCheck::Unknown
        }
    }
}
