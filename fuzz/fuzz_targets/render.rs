#![no_main]

use arbitrary::Arbitrary;
use kureha_lang::{BinaryOperator, BlockStyle, Node, Params, build};
use kureha_minifier::{Minifier, RenderOptions};
use libfuzzer_sys::fuzz_target;

const OPERATORS: &[BinaryOperator] = &[
    BinaryOperator::Add,
    BinaryOperator::Sub,
    BinaryOperator::Mul,
    BinaryOperator::Pow,
    BinaryOperator::Shl,
    BinaryOperator::BitOr,
    BinaryOperator::Eq,
    BinaryOperator::Lt,
    BinaryOperator::And,
    BinaryOperator::Or,
];

#[derive(Debug, Clone, Arbitrary)]
enum Expr {
    Local(String),
    Int(i64),
    Str(String),
    Symbol(String),
    Binary(u8, Box<Expr>, Box<Expr>),
    Call(Box<Expr>, String, Vec<Expr>),
    Command(String, Vec<Expr>),
    Array(Vec<Expr>),
    Interpolated(String, Box<Expr>),
}

#[derive(Debug, Clone, Arbitrary)]
enum Statement {
    Expr(Expr),
    Assign(String, Expr),
    Def(String, Vec<String>, Vec<Statement>),
    If(Expr, Vec<Statement>, Option<Vec<Statement>>),
    Modifier(Expr, Expr),
    Block(Expr, Vec<String>, Vec<Statement>, bool),
    Comment(String),
    BlankLine,
}

fn identifier(name: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == '_')
        .take(8)
        .collect();

    if name.is_empty() { "x".to_string() } else { format!("v{}", name) }
}

fn to_node(expr: &Expr) -> Node {
    match expr {
        Expr::Local(name) => build::local(&identifier(name)),
        Expr::Int(value) => build::int(*value),
        Expr::Str(value) => build::string(value),
        Expr::Symbol(name) => build::symbol(&identifier(name)),
        Expr::Binary(op, left, right) => build::binary(
            OPERATORS[*op as usize % OPERATORS.len()],
            to_node(left),
            to_node(right),
        ),
        Expr::Call(receiver, name, args) => {
            build::call(to_node(receiver), &identifier(name), args.iter().map(to_node).collect())
        }
        Expr::Command(name, args) => build::fcall(&identifier(name), args.iter().map(to_node).collect()),
        Expr::Array(elements) => build::array(elements.iter().map(to_node).collect()),
        Expr::Interpolated(text, embedded) => {
            build::interpolated(vec![build::text(text), build::embed(to_node(embedded))])
        }
    }
}

fn to_statement(statement: &Statement) -> Node {
    match statement {
        Statement::Expr(expr) => to_node(expr),
        Statement::Assign(name, value) => build::assign(build::local(&identifier(name)), to_node(value)),
        Statement::Def(name, params, body) => build::def(
            &identifier(name),
            (!params.is_empty()).then(|| Params::required(params.iter().map(|p| identifier(p)))),
            to_statements(body),
        ),
        Statement::If(predicate, consequent, alternate) => build::if_else(
            to_node(predicate),
            to_statements(consequent),
            alternate.as_deref().map(to_statements),
        ),
        Statement::Modifier(predicate, statement) => build::if_modifier(to_node(predicate), to_node(statement)),
        Statement::Block(receiver, params, body, brace) => build::with_block(
            build::call(to_node(receiver), "each", vec![]),
            (!params.is_empty()).then(|| Params::required(params.iter().map(|p| identifier(p)))),
            to_statements(body),
            if *brace { BlockStyle::Brace } else { BlockStyle::Do },
        ),
        Statement::Comment(text) => build::comment(&text.replace('\n', " ")),
        Statement::BlankLine => build::blank_line(),
    }
}

fn to_statements(statements: &[Statement]) -> Vec<Node> {
    statements.iter().map(to_statement).collect()
}

#[derive(Debug, Clone, Arbitrary)]
struct Context {
    raw_json: Option<String>,
    generated: Option<Vec<Statement>>,
    insert_separators: bool,
    strip_comments: bool,
    strip_blank_lines: bool,
    space_after_keywords: bool,
}

fuzz_target!(|context: Context| {
    let tree = match (&context.raw_json, &context.generated) {
        (Some(raw), _) => match Node::from_json(raw) {
            Ok(node) => node,
            Err(_) => return,
        },
        (_, Some(generated)) => build::program(to_statements(generated)),
        _ => return,
    };

    let minifier = Minifier::new(Some(RenderOptions {
        insert_separators: context.insert_separators,
        strip_comments: context.strip_comments,
        strip_blank_lines: context.strip_blank_lines,
        space_after_keywords: context.space_after_keywords,
    }));
    let _ = minifier.render(&tree);
});
