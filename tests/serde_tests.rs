//! JSON representation of syntax trees

#![cfg(feature = "serde")]

use pretty_assertions::assert_eq;
use scim_filter::{AttributePath, Node, PathExpression, parse_filter, parse_path};
use serde_json::json;

#[test]
fn test_comparison_json() {
    let node = parse_filter(r#"userName eq "bjensen""#).unwrap().unwrap();

    assert_eq!(
        serde_json::to_value(&node).unwrap(),
        json!({
            "type": "comparison",
            "attribute_path": { "schema": null, "names": ["userName"] },
            "operator": "eq",
            "value": "bjensen",
        })
    );
}

#[test]
fn test_tree_round_trips_through_json() {
    let node = parse_filter(r#"emails[type eq "work" and primary eq true] or not (title pr)"#)
        .unwrap()
        .unwrap();

    let json = serde_json::to_string(&node).unwrap();
    assert_eq!(serde_json::from_str::<Node>(&json).unwrap(), node);
}

#[test]
fn test_path_json() {
    let path = parse_path(r#"emails[type eq "work"].value"#).unwrap();
    let json = serde_json::to_value(&path).unwrap();

    assert_eq!(json["type"], "value");
    assert_eq!(json["sub_attribute"], "value");
    assert_eq!(serde_json::from_value::<PathExpression>(json).unwrap(), path);
}

#[test]
fn test_empty_attribute_path_is_rejected() {
    let result = serde_json::from_value::<AttributePath>(json!({ "names": [] }));
    assert!(result.is_err());
}

#[test]
fn test_null_comparison_keeps_value() {
    let node = parse_filter("manager eq null").unwrap().unwrap();
    let json = serde_json::to_value(&node).unwrap();

    assert_eq!(json["value"], serde_json::Value::Null);
    assert_eq!(serde_json::from_value::<Node>(json).unwrap(), node);
}

fn present_json(name: &str) -> serde_json::Value {
    json!({
        "type": "comparison",
        "attribute_path": { "schema": null, "names": [name] },
        "operator": "pr",
    })
}

#[test]
fn test_single_operand_connective_is_rejected() {
    let result = serde_json::from_value::<Node>(json!({
        "type": "conjunction",
        "children": [present_json("title")],
    }));

    let error = result.unwrap_err().to_string();
    assert!(error.contains("at least two operands"), "{error}");
}

#[test]
fn test_nested_same_kind_connective_is_flattened() {
    let node = serde_json::from_value::<Node>(json!({
        "type": "disjunction",
        "children": [
            { "type": "disjunction", "children": [present_json("a"), present_json("b")] },
            present_json("c"),
        ],
    }))
    .unwrap();

    assert_eq!(node, parse_filter("a pr or b pr or c pr").unwrap().unwrap());
}
