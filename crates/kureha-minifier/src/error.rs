use kureha_lang::{Node, Range, SyntaxError};
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    UnsupportedConstruct(#[from] UnsupportedConstruct),
}

/// A tree shape the renderer has no rule for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported construct `{kind}` at line {}, column {}", .range.start.line, .range.start.column)]
pub struct UnsupportedConstruct {
    pub kind: SmolStr,
    pub range: Range,
}

impl UnsupportedConstruct {
    pub fn new(kind: impl Into<SmolStr>, range: Range) -> Self {
        Self {
            kind: kind.into(),
            range,
        }
    }

    pub(crate) fn at(node: &Node) -> Self {
        Self::new(node.kind_name(), node.range)
    }
}
