//! Renders Ruby parse trees back to source text with every optional space,
//! newline, parenthesis and comment stripped.
//!
//! ```rust
//! use kureha_lang::{BinaryOperator, build};
//! use kureha_minifier::{RenderOptions, render};
//!
//! let sum = build::binary(BinaryOperator::Add, build::local("a"), build::local("b"));
//! let product = build::binary(BinaryOperator::Mul, build::parens(vec![sum]), build::local("c"));
//!
//! assert_eq!(render(&product, &RenderOptions::default()).unwrap(), "(a+b)*c");
//! ```
use kureha_lang::{Node, ParseResult};
use renderer::Renderer;

mod buffer;
mod error;
mod interpolation;
pub mod literal;
mod options;
mod params;
pub mod precedence;
mod renderer;
pub mod separator;

pub use error::{Error, UnsupportedConstruct};
pub use options::RenderOptions;
pub use precedence::{Associativity, Operator, OperatorDescriptor, Side, needs_parens};

/// Renders `node` as compact source text.
///
/// A `Program` root renders its statements as a sequence; any other node
/// renders as a single statement.
pub fn render(node: &Node, options: &RenderOptions) -> Result<String, Error> {
    let _span = tracing::debug_span!("render", kind = node.kind_name()).entered();

    Renderer::new(options).render(node).inspect_err(|err| {
        tracing::debug!(error = %err, "render failed");
    })
}

/// Renders a parse result, refusing trees whose parser reported syntax errors.
pub fn minify(result: &ParseResult, options: &RenderOptions) -> Result<String, Error> {
    if let Some(error) = result.errors.first() {
        tracing::debug!(count = result.errors.len(), "parse result carries syntax errors");
        return Err(Error::Syntax(error.clone()));
    }

    render(&result.program, options)
}

/// Reusable renderer configuration, for callers minifying many trees.
#[derive(Clone, Debug, Default)]
pub struct Minifier {
    options: RenderOptions,
}

impl Minifier {
    pub fn new(options: Option<RenderOptions>) -> Self {
        Self {
            options: options.unwrap_or_default(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render(&self, node: &Node) -> Result<String, Error> {
        render(node, &self.options)
    }

    pub fn minify(&self, result: &ParseResult) -> Result<String, Error> {
        minify(result, &self.options)
    }
}
