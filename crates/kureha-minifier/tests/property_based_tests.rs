//! Property-based tests for operator grouping.
//!
//! Random operator trees are rendered and read back with a small
//! precedence-climbing parser that follows Ruby's operator table and the
//! lexer rules that decide where one token ends: signed numeric literals,
//! regular expression flags and method calls on numbers. The parsed shape
//! must match the original tree, up to regrouped `&&`/`||` chains.
use kureha_lang::{BinaryOperator, Expr, Node, StringPart, UnaryOperator, build};
use kureha_minifier::{RenderOptions, render};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Leaf(String),
    Unary(&'static str, Box<Shape>),
    Binary(&'static str, Box<Shape>, Box<Shape>),
    /// Flattened `&&`/`||` chain.
    Chain(&'static str, Vec<Shape>),
    /// Zero-argument method call, `2.abs`.
    Call(Box<Shape>, String),
    /// `statement if predicate`.
    Modifier(Box<Shape>, Box<Shape>),
}

impl Shape {
    fn binary(symbol: &'static str, left: Shape, right: Shape) -> Shape {
        if matches!(symbol, "&&" | "||") {
            let mut operands = Vec::new();
            for side in [left, right] {
                match side {
                    Shape::Chain(inner, items) if inner == symbol => operands.extend(items),
                    other => operands.push(other),
                }
            }
            Shape::Chain(symbol, operands)
        } else {
            Shape::Binary(symbol, Box::new(left), Box::new(right))
        }
    }
}

const BINARY: &[(BinaryOperator, &str)] = &[
    (BinaryOperator::Pow, "**"),
    (BinaryOperator::Mul, "*"),
    (BinaryOperator::Div, "/"),
    (BinaryOperator::Mod, "%"),
    (BinaryOperator::Add, "+"),
    (BinaryOperator::Sub, "-"),
    (BinaryOperator::Shl, "<<"),
    (BinaryOperator::Shr, ">>"),
    (BinaryOperator::BitAnd, "&"),
    (BinaryOperator::BitOr, "|"),
    (BinaryOperator::BitXor, "^"),
    (BinaryOperator::Gt, ">"),
    (BinaryOperator::Ge, ">="),
    (BinaryOperator::Lt, "<"),
    (BinaryOperator::Le, "<="),
    (BinaryOperator::Cmp, "<=>"),
    (BinaryOperator::Eq, "=="),
    (BinaryOperator::CaseEq, "==="),
    (BinaryOperator::NotEq, "!="),
    (BinaryOperator::And, "&&"),
    (BinaryOperator::Or, "||"),
];

const UNARY: &[(UnaryOperator, &str)] = &[
    (UnaryOperator::Not, "!"),
    (UnaryOperator::BitNot, "~"),
    (UnaryOperator::Plus, "+"),
    (UnaryOperator::Negate, "-"),
];

fn float_leaf(value: f64) -> String {
    format!("{}f", value)
}

fn negated(leaf: String) -> Shape {
    Shape::Unary("-", Box::new(Shape::Leaf(leaf)))
}

fn shape_of(node: &Node) -> Shape {
    match &node.expr {
        Expr::Variable { name, .. } => Shape::Leaf(name.to_string()),
        Expr::Integer(text) => match text.strip_prefix('-') {
            Some(digits) => negated(digits.to_string()),
            None => Shape::Leaf(text.to_string()),
        },
        Expr::Float(value) if *value < 0.0 => negated(float_leaf(-value)),
        Expr::Float(value) => Shape::Leaf(float_leaf(*value)),
        Expr::Regex { parts, flags } => match parts.as_slice() {
            [StringPart::Text(source)] => Shape::Leaf(format!("/{}/{}", source, flags)),
            other => panic!("unexpected regex parts {other:?}"),
        },
        Expr::Call(call) => {
            let receiver = call.receiver.as_deref().expect("method calls have a receiver");
            Shape::Call(Box::new(shape_of(receiver)), call.name.to_string())
        }
        Expr::BinaryOp { op, left, right } => {
            let symbol = BINARY
                .iter()
                .find(|(candidate, _)| candidate == op)
                .map(|(_, symbol)| *symbol)
                .unwrap();
            Shape::binary(symbol, shape_of(left), shape_of(right))
        }
        Expr::UnaryOp { op, operand } => {
            let symbol = UNARY
                .iter()
                .find(|(candidate, _)| candidate == op)
                .map(|(_, symbol)| *symbol)
                .unwrap();
            Shape::Unary(symbol, Box::new(shape_of(operand)))
        }
        other => panic!("unexpected node {other:?}"),
    }
}

/// Binding power and right-associativity of a binary symbol.
fn binding(symbol: &str) -> Option<(u8, bool)> {
    Some(match symbol {
        "**" => (16, true),
        "*" | "/" | "%" => (14, false),
        "+" | "-" => (13, false),
        "<<" | ">>" => (12, false),
        "&" => (11, false),
        "|" | "^" => (10, false),
        ">" | ">=" | "<" | "<=" => (9, false),
        "<=>" | "==" | "===" | "!=" => (8, false),
        "&&" => (7, false),
        "||" => (6, false),
        _ => return None,
    })
}

const TOKENS: &[&str] = &[
    "<=>", "===", "**", "<<", ">>", "&&", "||", "<=", ">=", "==", "!=", "*", "/", "%", "+", "-", "&", "|", "^", ">",
    "<", "!", "~", "(", ")", ".",
];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Symbol(&'static str),
    Word(String),
    Integer(String),
    Float(f64),
    /// Source and flags; letters right after the closing `/` are always read as flags.
    Regex(String, String),
}

impl Token {
    fn is_numeric(&self) -> bool {
        matches!(self, Token::Integer(_) | Token::Float(_))
    }
}

fn take_while(chars: &[char], start: usize, predicate: impl Fn(char) -> bool) -> usize {
    chars[start..]
        .iter()
        .position(|c| !predicate(*c))
        .map_or(chars.len(), |offset| start + offset)
}

fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut position = 0;

    while position < chars.len() {
        let c = chars[position];

        if c == ' ' {
            position += 1;
            continue;
        }

        // `/` opens a regex wherever an operand is expected.
        let expects_operand = match tokens.last() {
            None => true,
            Some(Token::Symbol(symbol)) => *symbol != ")",
            Some(Token::Word(word)) => word == "if",
            Some(_) => false,
        };
        if c == '/' && expects_operand {
            let close = position + 1 + chars[position + 1..].iter().position(|c| *c == '/').unwrap();
            let end = take_while(&chars, close + 1, |c| c.is_ascii_alphabetic());
            tokens.push(Token::Regex(
                chars[position + 1..close].iter().collect(),
                chars[close + 1..end].iter().collect(),
            ));
            position = end;
            continue;
        }

        if c.is_ascii_digit() {
            let mut end = take_while(&chars, position, |c| c.is_ascii_digit());
            let mut float = false;
            if chars.get(end) == Some(&'.') && chars.get(end + 1).is_some_and(char::is_ascii_digit) {
                end = take_while(&chars, end + 1, |c| c.is_ascii_digit());
                float = true;
            }
            if chars.get(end) == Some(&'e') {
                let digits = if chars.get(end + 1) == Some(&'-') { end + 2 } else { end + 1 };
                end = take_while(&chars, digits, |c| c.is_ascii_digit());
                float = true;
            }

            let literal: String = chars[position..end].iter().collect();
            tokens.push(if float {
                Token::Float(literal.parse().unwrap())
            } else {
                Token::Integer(literal)
            });
            position = end;
            continue;
        }

        let rest: String = chars[position..].iter().collect();
        if let Some(symbol) = TOKENS.iter().find(|symbol| rest.starts_with(**symbol)) {
            tokens.push(Token::Symbol(*symbol));
            position += symbol.len();
            continue;
        }

        let end = take_while(&chars, position, |c| c.is_ascii_alphanumeric() || c == '_');
        assert!(end > position, "unexpected character in {text:?}");
        tokens.push(Token::Word(chars[position..end].iter().collect()));
        position = end;
    }

    tokens
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_symbol(&self) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Symbol(symbol)) => Some(*symbol),
            _ => None,
        }
    }

    fn next(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        self.position += 1;
        token
    }

    fn statement(&mut self) -> Shape {
        let statement = self.expression(0);

        if self.peek() == Some(&Token::Word("if".to_string())) {
            self.next();
            let predicate = self.expression(0);
            return Shape::Modifier(Box::new(statement), Box::new(predicate));
        }

        statement
    }

    fn expression(&mut self, min_binding: u8) -> Shape {
        let mut left = self.prefix();

        while let Some((binding, right_assoc)) = self.peek_symbol().and_then(binding) {
            if binding < min_binding {
                break;
            }

            let Token::Symbol(symbol) = self.next() else {
                unreachable!()
            };
            let right = self.expression(if right_assoc { binding } else { binding + 1 });
            left = Shape::binary(symbol, left, right);
        }

        left
    }

    fn prefix(&mut self) -> Shape {
        match self.next() {
            // A sign directly before a number is part of the literal, so a method
            // call binds to the signed number. `-2**2` is still `-(2**2)`.
            Token::Symbol(sign @ ("-" | "+")) if self.peek().is_some_and(Token::is_numeric) => {
                let after_literal = self.tokens.get(self.position + 1);
                if after_literal == Some(&Token::Symbol(".")) {
                    let literal = Shape::Unary(sign, Box::new(self.primary()));
                    self.postfix(literal)
                } else if sign == "-" {
                    Shape::Unary("-", Box::new(self.expression(16)))
                } else {
                    Shape::Unary("+", Box::new(self.expression(17)))
                }
            }
            Token::Symbol("!") => Shape::Unary("!", Box::new(self.expression(17))),
            Token::Symbol("~") => Shape::Unary("~", Box::new(self.expression(17))),
            Token::Symbol("+") => Shape::Unary("+", Box::new(self.expression(17))),
            Token::Symbol("-") => Shape::Unary("-", Box::new(self.expression(16))),
            _ => {
                self.position -= 1;
                let primary = self.primary();
                self.postfix(primary)
            }
        }
    }

    fn primary(&mut self) -> Shape {
        match self.next() {
            Token::Symbol("(") => {
                let inner = self.expression(0);
                assert_eq!(self.next(), Token::Symbol(")"));
                inner
            }
            Token::Word(word) => Shape::Leaf(word),
            Token::Integer(digits) => Shape::Leaf(digits),
            Token::Float(value) => Shape::Leaf(float_leaf(value)),
            Token::Regex(source, flags) => Shape::Leaf(format!("/{}/{}", source, flags)),
            token => panic!("unexpected token {token:?}"),
        }
    }

    fn postfix(&mut self, mut receiver: Shape) -> Shape {
        while self.peek_symbol() == Some(".") {
            self.next();
            let Token::Word(name) = self.next() else {
                panic!("expected a method name");
            };
            receiver = Shape::Call(Box::new(receiver), name);
        }
        receiver
    }
}

fn parse(text: &str) -> Shape {
    let mut parser = Parser {
        tokens: tokenize(text),
        position: 0,
    };
    let shape = parser.statement();
    assert_eq!(parser.position, parser.tokens.len(), "trailing tokens in {text:?}");
    shape
}

mod strategies {
    use super::*;

    fn variable() -> impl Strategy<Value = Node> {
        "[a-z][a-z0-9_]{0,4}"
            .prop_filter("Avoid reserved words", |name| {
                !matches!(
                    name.as_str(),
                    "if" | "in" | "do" | "or" | "and" | "end" | "not" | "nil" | "def" | "for" | "self"
                )
            })
            .prop_map(|name| build::local(&name))
    }

    fn number() -> impl Strategy<Value = Node> {
        prop_oneof![
            (0i64..1000).prop_map(build::int),
            (1i64..1000).prop_map(|n| build::int(-n)),
            (1u32..100_000).prop_map(|n| build::float(f64::from(n) / 100.0)),
            (1u32..100_000).prop_map(|n| build::float(-f64::from(n) / 100.0)),
        ]
    }

    fn regex() -> impl Strategy<Value = Node> {
        ("[a-z]{1,3}", prop::sample::select(vec!["", "", "i", "m"])).prop_map(|(source, flags)| {
            Node::new(Expr::Regex {
                parts: vec![StringPart::Text(source)],
                flags: flags.into(),
            })
        })
    }

    fn method_call() -> impl Strategy<Value = Node> {
        (
            prop_oneof![number(), variable()],
            prop::sample::select(vec!["abs", "floor", "succ", "to_i"]),
        )
            .prop_map(|(receiver, name)| build::call(receiver, name, vec![]))
    }

    pub fn leaf() -> impl Strategy<Value = Node> {
        prop_oneof![3 => variable(), 3 => number(), 1 => regex(), 2 => method_call()]
    }

    pub fn operator_tree() -> impl Strategy<Value = Node> {
        leaf().prop_recursive(5, 48, 2, |inner| {
            prop_oneof![
                (prop::sample::select(BINARY), inner.clone(), inner.clone())
                    .prop_map(|((op, _), left, right)| build::binary(op, left, right)),
                (prop::sample::select(UNARY), inner).prop_map(|((op, _), operand)| build::unary(op, operand)),
            ]
        })
    }
}

proptest! {
    #[test]
    fn test_grouping_preserves_structure(tree in strategies::operator_tree()) {
        let rendered = render(&tree, &RenderOptions::default()).unwrap();
        prop_assert_eq!(parse(&rendered), shape_of(&tree), "rendered as {}", rendered);
    }

    #[test]
    fn test_operator_trees_render_without_whitespace(tree in strategies::operator_tree()) {
        let rendered = render(&tree, &RenderOptions::default()).unwrap();
        // `a/ /b/` is the one place a space separates two operator tokens.
        prop_assert!(!rendered.replace("/ /", "//").contains(char::is_whitespace), "rendered as {}", rendered);
    }

    #[test]
    fn test_modifier_keyword_stays_a_separate_token(tree in strategies::operator_tree()) {
        let statement = build::if_modifier(build::vcall("ready"), tree.clone());
        let rendered = render(&statement, &RenderOptions::default()).unwrap();
        prop_assert_eq!(
            parse(&rendered),
            Shape::Modifier(Box::new(shape_of(&tree)), Box::new(Shape::Leaf("ready".to_string()))),
            "rendered as {}",
            rendered
        );
    }

    #[test]
    fn test_render_is_deterministic(tree in strategies::operator_tree()) {
        let options = RenderOptions::default();
        prop_assert_eq!(render(&tree, &options).unwrap(), render(&tree, &options).unwrap());
    }

    #[test]
    fn test_separator_option_only_changes_separators(
        names in prop::collection::vec("[a-z]{1,6}".prop_filter("Avoid reserved words", |name| {
            !matches!(name.as_str(), "if" | "in" | "do" | "or" | "and" | "end" | "not" | "nil" | "def" | "for")
        }), 1..8)
    ) {
        let program = build::program(names.iter().map(|name| build::vcall(name)).collect());
        let joined = render(&program, &RenderOptions::default()).unwrap();
        let lines = render(&program, &RenderOptions { insert_separators: false, ..Default::default() }).unwrap();

        prop_assert_eq!(joined.replace(';', "\n"), lines);
        prop_assert_eq!(joined, names.join(";"));
    }
}
