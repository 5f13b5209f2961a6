//! PATCH operation path parsing

use pretty_assertions::assert_eq;
use rstest::rstest;
use scim_filter::{
    AttributePath, Comparison, LogicalOperator, Node, Operator, PathExpression, PathParser, Value,
    ValuePath, parse_path,
};

fn path(schema: Option<&str>, names: &[&str]) -> AttributePath {
    AttributePath::new(schema.map(str::to_owned), names.iter().copied()).unwrap()
}

#[rstest]
#[case("members", None, &["members"])]
#[case("name.familyName", None, &["name", "familyName"])]
#[case(
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.displayName",
    Some("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"),
    &["manager", "displayName"]
)]
fn test_attribute_paths(
    #[case] input: &str,
    #[case] schema: Option<&str>,
    #[case] names: &[&str],
) {
    assert_eq!(
        parse_path(input),
        Ok(PathExpression::Attribute(path(schema, names)))
    );
}

#[test]
fn test_value_path() {
    let parsed = parse_path(r#"members[value eq "2819c223-7f76-453a-919d-413861904646"]"#).unwrap();

    assert_eq!(
        parsed,
        PathExpression::Value(ValuePath::new(
            path(None, &["members"]),
            Comparison::new(
                path(None, &["members", "value"]),
                Operator::Eq,
                Some(Value::from("2819c223-7f76-453a-919d-413861904646")),
            )
            .into(),
        ))
    );
    assert_eq!(parsed.as_value_path().unwrap().sub_attribute(), None);
}

#[test]
fn test_value_path_with_sub_attribute() {
    let parsed = PathParser::new()
        .parse(r#"emails[type eq "work" and primary eq true].value"#)
        .unwrap();
    let value_path = parsed.as_value_path().unwrap();

    assert_eq!(parsed.attribute_path(), &path(None, &["emails", "value"]));
    assert_eq!(value_path.collection_path(), path(None, &["emails"]));
    assert_eq!(value_path.sub_attribute(), Some("value"));
    let work = Comparison::new(path(None, &["emails", "type"]), Operator::Eq, Some("work".into()));
    let primary =
        Comparison::new(path(None, &["emails", "primary"]), Operator::Eq, Some(true.into()));
    assert_eq!(
        Some(value_path.predicate().clone()),
        Node::connective(LogicalOperator::And, [work.into(), primary.into()])
    );
}

#[test]
fn test_sub_attribute_matches_filter_predicate() {
    let parsed = parse_path(r#"name[foo eq "bar"].baz"#).unwrap();
    let value_path = parsed.as_value_path().unwrap();

    assert_eq!(value_path.attribute_path().names(), ["name", "baz"]);
    assert_eq!(
        value_path.predicate().as_comparison().unwrap().attribute_path(),
        &path(None, &["name", "foo"])
    );
}

#[test]
fn test_value_path_with_grouped_predicate() {
    let parsed =
        parse_path(r#"addresses[(type eq "work" or type eq "home") and primary eq true]"#).unwrap();
    let predicate = parsed.as_value_path().unwrap().predicate();

    assert_eq!(
        predicate
            .attribute_paths()
            .into_iter()
            .map(AttributePath::path)
            .collect::<Vec<_>>(),
        vec!["addresses.type", "addresses.type", "addresses.primary"]
    );
}

#[test]
fn test_path_converts_to_node() {
    let node = Node::from(parse_path("displayName").unwrap());
    assert_eq!(node.as_attribute_path(), Some(&path(None, &["displayName"])));
}
