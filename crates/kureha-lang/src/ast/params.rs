#[cfg(feature = "ast-json")]
use serde::{Deserialize, Serialize};

use super::{Name, Node};

/// Parameter list of a method, block or lambda.
///
/// Fields are kept in the order the language requires them to be declared.
#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Params {
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub requireds: Vec<ParamTarget>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub optionals: Vec<OptionalParam>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub rest: Option<NamedSplat>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub posts: Vec<ParamTarget>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub keywords: Vec<KeywordParam>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub keyword_rest: Option<KeywordRest>,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub block: Option<NamedSplat>,
    /// `def f(...)`.
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub forwarding: bool,
    /// Block parameters written `|a,|`.
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub trailing_comma: bool,
}

impl Params {
    pub fn required<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        Params {
            requireds: names.into_iter().map(|name| ParamTarget::Name(name.into())).collect(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requireds.is_empty()
            && self.optionals.is_empty()
            && self.rest.is_none()
            && self.posts.is_empty()
            && self.keywords.is_empty()
            && self.keyword_rest.is_none()
            && self.block.is_none()
            && !self.forwarding
    }
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub enum ParamTarget {
    Name(Name),
    /// `|(a, b)|`
    Destructure(Vec<ParamTarget>),
    Splat(NamedSplat),
}

/// `*args`, `&blk` or their anonymous forms.
#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Default)]
pub struct NamedSplat {
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub name: Option<Name>,
}

impl NamedSplat {
    pub fn named(name: impl Into<Name>) -> Self {
        NamedSplat {
            name: Some(name.into()),
        }
    }

    pub fn anonymous() -> Self {
        NamedSplat { name: None }
    }
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub struct OptionalParam {
    pub name: Name,
    pub default: Node,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub struct KeywordParam {
    pub name: Name,
    #[cfg_attr(feature = "ast-json", serde(default))]
    pub default: Option<Node>,
}

#[cfg_attr(feature = "ast-json", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub enum KeywordRest {
    Named(NamedSplat),
    /// `**nil`
    NoKeywords,
}
