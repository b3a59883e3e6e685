#![cfg(feature = "ast-json")]

use kureha_lang::{BinaryOperator, Expr, Node, ParseResult, Position, Range, build};

#[test]
fn test_node_serialization_deserialization() {
    let original = build::binary(BinaryOperator::Add, build::int(1), build::local("a"));

    let json = original.to_json().unwrap();
    assert!(json.contains("\"BinaryOp\""));
    assert!(json.contains("\"Add\""));

    let deserialized = Node::from_json(&json).unwrap();
    assert_eq!(deserialized, original);
}

#[test]
fn test_missing_range_defaults_to_first_column() {
    let node = Node::from_json(r#"{"expr": {"Symbol": "ok"}}"#).unwrap();

    assert_eq!(node.expr, Expr::Symbol("ok".into()));
    assert_eq!(node.range.start, Position::new(1, 1));
}

#[test]
fn test_call_fields_are_optional() {
    let node = Node::from_json(r#"{"expr": {"Call": {"name": "foo", "variable_call": true}}}"#).unwrap();

    assert_eq!(node, build::vcall("foo"));
}

#[test]
fn test_parse_result_with_errors() {
    let json = r#"{
  "program": {"expr": {"Program": []}},
  "errors": [
    {
      "message": "unexpected end-of-input",
      "range": {"start": {"line": 3, "column": 1}, "end": {"line": 3, "column": 4}}
    }
  ]
}"#;

    let result = ParseResult::from_json(json).unwrap();
    assert!(result.has_errors());
    assert_eq!(result.errors[0].message, "unexpected end-of-input");
    assert_eq!(
        result.errors[0].range,
        Range::new(Position::new(3, 1), Position::new(3, 4))
    );
}

#[test]
fn test_parse_result_round_trip() {
    let original = ParseResult::new(build::program(vec![build::def(
        "hello",
        None,
        vec![build::fcall("puts", vec![build::string("Hello, World!")])],
    )]));

    let json = original.to_json().unwrap();
    assert_eq!(ParseResult::from_json(&json).unwrap(), original);
}

#[test]
fn test_unknown_node_kind_is_rejected() {
    assert!(Node::from_json(r#"{"expr": {"PatternMatch": []}}"#).is_err());
}

#[test]
fn test_unknown_kind_becomes_unsupported() {
    let node = Node::from_json(
        r#"{
  "range": {"start": {"line": 2, "column": 3}, "end": {"line": 2, "column": 9}},
  "expr": {"PatternMatch": [{"expr": "Nil"}]}
}"#,
    )
    .unwrap();

    assert_eq!(
        node,
        Node::new(Expr::Unsupported {
            kind: "PatternMatch".into()
        })
        .with_range(Range::new(Position::new(2, 3), Position::new(2, 9)))
    );
}

#[test]
fn test_unknown_unit_kind_nested_in_known_node() {
    let node = Node::from_json(r#"{"expr": {"Array": [{"expr": "SourceEncoding"}, {"expr": "Nil"}]}}"#).unwrap();

    assert_eq!(
        node,
        build::array(vec![
            Node::new(Expr::Unsupported {
                kind: "SourceEncoding".into()
            }),
            Node::new(Expr::Nil),
        ])
    );
}

#[test]
fn test_malformed_known_kind_is_an_error() {
    assert!(Node::from_json(r#"{"expr": {"Call": {"variable_call": true}}}"#).is_err());
    assert!(Node::from_json(r#"{"expr": {"Array": 1}}"#).is_err());
}
