#[cfg(feature = "ast-json")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::range::Range;

/// A diagnostic reported by the upstream parser that built the tree.
///
/// The message is kept verbatim so callers can surface it unchanged.
#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub range: Range,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: Range) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}
