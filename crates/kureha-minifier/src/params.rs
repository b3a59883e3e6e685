use kureha_lang::{KeywordRest, NamedSplat, ParamTarget, Params};

use crate::{
    Error,
    precedence::{Operator, Side},
    renderer::{Placement, Renderer, operator_of},
};

/// What closes the parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamsDelimiter {
    Parentheses,
    /// Block parameters, where a bare `|` in a default value would close the list.
    Pipes,
}

impl Renderer<'_> {
    pub(crate) fn params(&mut self, params: &Params, delimiter: ParamsDelimiter) -> Result<(), Error> {
        let mut first = true;

        for target in &params.requireds {
            self.param_separator(&mut first);
            self.param_target(target);
        }

        for optional in &params.optionals {
            self.param_separator(&mut first);
            self.buffer.push_str(&optional.name);
            self.buffer.push_str("=");

            if delimiter == ParamsDelimiter::Pipes && operator_of(&optional.default).is_some() {
                self.buffer.push_str("(");
                self.node(&optional.default, Placement::Grouped)?;
                self.buffer.push_str(")");
            } else {
                self.operand(&optional.default, Operator::Assign, Side::Right)?;
            }
        }

        if let Some(rest) = &params.rest {
            self.param_separator(&mut first);
            self.named_splat("*", rest);
        }

        for target in &params.posts {
            self.param_separator(&mut first);
            self.param_target(target);
        }

        for keyword in &params.keywords {
            self.param_separator(&mut first);
            self.buffer.push_str(&keyword.name);
            self.buffer.push_str(":");

            if let Some(default) = &keyword.default {
                if delimiter == ParamsDelimiter::Pipes && operator_of(default).is_some() {
                    self.buffer.push_str("(");
                    self.node(default, Placement::Grouped)?;
                    self.buffer.push_str(")");
                } else {
                    self.list_item(default)?;
                }
            }
        }

        match &params.keyword_rest {
            Some(KeywordRest::Named(splat)) => {
                self.param_separator(&mut first);
                self.named_splat("**", splat);
            }
            Some(KeywordRest::NoKeywords) => {
                self.param_separator(&mut first);
                self.buffer.push_str("**nil");
            }
            None => {}
        }

        if let Some(block) = &params.block {
            self.param_separator(&mut first);
            self.named_splat("&", block);
        }

        if params.forwarding {
            self.param_separator(&mut first);
            self.buffer.push_str("...");
        }

        if params.trailing_comma && !first {
            self.buffer.push_str(",");
        }

        Ok(())
    }

    fn param_separator(&mut self, first: &mut bool) {
        if !std::mem::take(first) {
            self.buffer.push_str(",");
        }
    }

    fn param_target(&mut self, target: &ParamTarget) {
        match target {
            ParamTarget::Name(name) => self.buffer.push_str(name),
            ParamTarget::Splat(splat) => self.named_splat("*", splat),
            ParamTarget::Destructure(targets) => {
                self.buffer.push_str("(");
                for (index, target) in targets.iter().enumerate() {
                    if index > 0 {
                        self.buffer.push_str(",");
                    }
                    self.param_target(target);
                }
                self.buffer.push_str(")");
            }
        }
    }

    fn named_splat(&mut self, prefix: &str, splat: &NamedSplat) {
        self.buffer.push_str(prefix);
        if let Some(name) = &splat.name {
            self.buffer.push_str(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kureha_lang::{BinaryOperator, KeywordParam, OptionalParam, build};
    use rstest::rstest;

    use crate::RenderOptions;

    fn render_params(params: &Params, delimiter: ParamsDelimiter) -> String {
        let options = RenderOptions::default();
        let mut renderer = Renderer::new(&options);
        renderer.params(params, delimiter).unwrap();
        renderer.buffer.into_string()
    }

    #[rstest]
    #[case::required(Params::required(["a", "b"]), "a,b")]
    #[case::optional(
        Params {
            optionals: vec![OptionalParam { name: "x".into(), default: build::int(1) }],
            ..Params::required(["a"])
        },
        "a,x=1"
    )]
    #[case::rest_and_post(
        Params {
            rest: Some(NamedSplat::named("rest")),
            posts: vec![ParamTarget::Name("last".into())],
            ..Params::required(["first"])
        },
        "first,*rest,last"
    )]
    #[case::keywords(
        Params {
            keywords: vec![
                KeywordParam { name: "a".into(), default: None },
                KeywordParam { name: "b".into(), default: Some(build::symbol("c")) },
            ],
            keyword_rest: Some(KeywordRest::Named(NamedSplat::named("opts"))),
            ..Params::default()
        },
        "a:,b: :c,**opts"
    )]
    #[case::anonymous(
        Params {
            rest: Some(NamedSplat::anonymous()),
            keyword_rest: Some(KeywordRest::Named(NamedSplat::anonymous())),
            block: Some(NamedSplat::anonymous()),
            ..Params::default()
        },
        "*,**,&"
    )]
    #[case::no_keywords(
        Params { keyword_rest: Some(KeywordRest::NoKeywords), ..Params::required(["a"]) },
        "a,**nil"
    )]
    #[case::block(Params { block: Some(NamedSplat::named("blk")), ..Params::default() }, "&blk")]
    #[case::forwarding(Params { forwarding: true, ..Params::required(["a"]) }, "a,...")]
    #[case::destructure(
        Params {
            requireds: vec![
                ParamTarget::Destructure(vec![
                    ParamTarget::Name("k".into()),
                    ParamTarget::Splat(NamedSplat::named("v")),
                ]),
            ],
            ..Params::default()
        },
        "(k,*v)"
    )]
    fn test_params(#[case] params: Params, #[case] expected: &str) {
        assert_eq!(render_params(&params, ParamsDelimiter::Parentheses), expected);
    }

    #[test]
    fn test_trailing_comma_in_block_params() {
        let params = Params {
            trailing_comma: true,
            ..Params::required(["a"])
        };
        assert_eq!(render_params(&params, ParamsDelimiter::Pipes), "a,");
    }

    #[rstest]
    #[case::parentheses(ParamsDelimiter::Parentheses, "x=a|b")]
    #[case::pipes(ParamsDelimiter::Pipes, "x=(a|b)")]
    fn test_operator_default(#[case] delimiter: ParamsDelimiter, #[case] expected: &str) {
        let params = Params {
            optionals: vec![OptionalParam {
                name: "x".into(),
                default: build::binary(BinaryOperator::BitOr, build::local("a"), build::local("b")),
            }],
            ..Params::default()
        };
        assert_eq!(render_params(&params, delimiter), expected);
    }
}
