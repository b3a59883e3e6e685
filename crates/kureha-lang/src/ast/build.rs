//! Shorthand constructors for tree nodes.
//!
//! Embedding parsers and tests build trees through these instead of spelling
//! out every struct literal.
use smol_str::SmolStr;

use super::{
    Alternate, BinaryOperator, Block, BlockStyle, Body, Call, CallOperator, ConditionalKind, Expr, LoopKind, Name,
    Node, Params, StringPart, UnaryOperator, VariableKind,
};

pub fn program(statements: Vec<Node>) -> Node {
    Node::new(Expr::Program(statements))
}

pub fn parens(statements: Vec<Node>) -> Node {
    Node::new(Expr::Parentheses(statements))
}

pub fn local(name: &str) -> Node {
    variable(VariableKind::Local, name)
}

pub fn ivar(name: &str) -> Node {
    variable(VariableKind::Instance, name)
}

pub fn gvar(name: &str) -> Node {
    variable(VariableKind::Global, name)
}

pub fn constant(name: &str) -> Node {
    variable(VariableKind::Constant, name)
}

pub fn variable(kind: VariableKind, name: &str) -> Node {
    Node::new(Expr::Variable {
        kind,
        name: SmolStr::new(name),
    })
}

pub fn int(value: i64) -> Node {
    Node::new(Expr::Integer(SmolStr::new(value.to_string())))
}

pub fn float(value: f64) -> Node {
    Node::new(Expr::Float(value))
}

pub fn string(value: &str) -> Node {
    Node::new(Expr::String(value.to_string()))
}

pub fn symbol(name: &str) -> Node {
    Node::new(Expr::Symbol(SmolStr::new(name)))
}

pub fn text(value: &str) -> StringPart {
    StringPart::Text(value.to_string())
}

pub fn embed(node: Node) -> StringPart {
    StringPart::Embedded(vec![node])
}

pub fn interpolated(parts: Vec<StringPart>) -> Node {
    Node::new(Expr::InterpolatedString(parts))
}

pub fn array(elements: Vec<Node>) -> Node {
    Node::new(Expr::Array(elements))
}

pub fn hash(pairs: Vec<Node>) -> Node {
    Node::new(Expr::Hash(pairs))
}

pub fn pair(key: Node, value: Node) -> Node {
    Node::new(Expr::Pair {
        key: Box::new(key),
        value: Box::new(value),
    })
}

pub fn range(left: Node, right: Node, exclusive: bool) -> Node {
    Node::new(Expr::Range {
        left: Some(Box::new(left)),
        right: Some(Box::new(right)),
        exclusive,
    })
}

/// Method call with an explicit receiver.
pub fn call(receiver: Node, name: &str, args: Vec<Node>) -> Node {
    Node::new(Expr::Call(Call {
        receiver: Some(Box::new(receiver)),
        operator: CallOperator::Dot,
        name: Name::new(name),
        args,
        block: None,
        variable_call: false,
    }))
}

/// Receiver-less method call, `puts(x)`.
pub fn fcall(name: &str, args: Vec<Node>) -> Node {
    Node::new(Expr::Call(Call {
        name: Name::new(name),
        args,
        ..Default::default()
    }))
}

/// Bare identifier that resolves to a method, `foo`.
pub fn vcall(name: &str) -> Node {
    Node::new(Expr::Call(Call {
        name: Name::new(name),
        variable_call: true,
        ..Default::default()
    }))
}

/// Attaches a block to a call or `super` node; other nodes are returned unchanged.
pub fn with_block(mut node: Node, params: Option<Params>, body: Vec<Node>, style: BlockStyle) -> Node {
    let attached = Block {
        params,
        locals: Vec::new(),
        body: Body::from(body),
        style,
    };

    match &mut node.expr {
        Expr::Call(call) => call.block = Some(attached),
        Expr::Super { block, .. } => *block = Some(attached),
        _ => {}
    }

    node
}

pub fn binary(op: BinaryOperator, left: Node, right: Node) -> Node {
    Node::new(Expr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn unary(op: UnaryOperator, operand: Node) -> Node {
    Node::new(Expr::UnaryOp {
        op,
        operand: Box::new(operand),
    })
}

pub fn assign(target: Node, value: Node) -> Node {
    Node::new(Expr::Assign {
        target: Box::new(target),
        value: Box::new(value),
    })
}

pub fn def(name: &str, params: Option<Params>, statements: Vec<Node>) -> Node {
    Node::new(Expr::Def {
        receiver: None,
        name: Name::new(name),
        params,
        body: Body::from(statements),
    })
}

pub fn class(name: &str, superclass: Option<Node>, statements: Vec<Node>) -> Node {
    Node::new(Expr::Class {
        path: Box::new(constant(name)),
        superclass: superclass.map(Box::new),
        body: Body::from(statements),
    })
}

pub fn module(name: &str, statements: Vec<Node>) -> Node {
    Node::new(Expr::Module {
        path: Box::new(constant(name)),
        body: Body::from(statements),
    })
}

pub fn if_else(predicate: Node, consequent: Vec<Node>, alternate: Option<Vec<Node>>) -> Node {
    Node::new(Expr::Conditional {
        kind: ConditionalKind::If,
        predicate: Box::new(predicate),
        consequent,
        alternate: alternate.map(Alternate::Else),
        modifier: false,
    })
}

/// `statement if predicate` as written in the source.
pub fn if_modifier(predicate: Node, statement: Node) -> Node {
    Node::new(Expr::Conditional {
        kind: ConditionalKind::If,
        predicate: Box::new(predicate),
        consequent: vec![statement],
        alternate: None,
        modifier: true,
    })
}

pub fn while_loop(predicate: Node, body: Vec<Node>) -> Node {
    Node::new(Expr::Loop {
        kind: LoopKind::While,
        predicate: Box::new(predicate),
        body,
        modifier: false,
        do_while: false,
    })
}

pub fn ret(args: Vec<Node>) -> Node {
    Node::new(Expr::Return(args))
}

pub fn comment(text: &str) -> Node {
    Node::new(Expr::Comment(text.to_string()))
}

pub fn blank_line() -> Node {
    Node::new(Expr::BlankLine)
}
