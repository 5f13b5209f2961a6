//! Parent queries over parsed trees

use scim_filter::{Ancestry, Node, NodeKind, ParentQuery, parse_filter};

fn parse(input: &str) -> Node {
    parse_filter(input).unwrap().unwrap()
}

#[test]
fn test_root_has_no_parent() {
    let tree = parse("title pr");
    let ancestry = Ancestry::new(&tree);

    assert!(ancestry.parent(&tree).is_none());
    assert!(!ancestry.has_parent(&tree, ParentQuery::Any, false));
    assert!(!ancestry.has_parent(&tree, ParentQuery::Kind(NodeKind::Conjunction), true));
}

#[test]
fn test_value_path_predicate_parents() {
    let tree = parse(r#"name[not (formatted eq "foobar")]"#);
    let ancestry = Ancestry::new(&tree);

    let negation = tree.as_value_path().unwrap().predicate();
    let comparison = negation.as_negation().unwrap().inner();

    assert!(std::ptr::eq(ancestry.parent(negation).unwrap(), &tree));
    assert!(std::ptr::eq(ancestry.parent(comparison).unwrap(), negation));

    assert!(ancestry.has_parent(comparison, ParentQuery::Any, false));
    assert!(ancestry.has_parent(comparison, ParentQuery::Kind(NodeKind::Negation), false));
    assert!(!ancestry.has_parent(comparison, ParentQuery::Kind(NodeKind::ValuePath), false));
    assert!(ancestry.has_parent(comparison, ParentQuery::Kind(NodeKind::ValuePath), true));
    assert!(ancestry.has_parent(comparison, ParentQuery::Node(negation), false));
    assert!(!ancestry.has_parent(comparison, ParentQuery::Node(&tree), false));
    assert!(ancestry.has_parent(comparison, ParentQuery::Node(&tree), true));
}

#[test]
fn test_equal_but_distinct_nodes_are_not_parents() {
    let tree = parse("(title pr and title pr) or title pr");
    let ancestry = Ancestry::new(&tree);

    let inner = &tree.children()[0];
    let nested_leaf = &inner.children()[0];
    let outer_leaf = &tree.children()[1];

    assert_eq!(nested_leaf, outer_leaf);
    assert!(ancestry.has_parent(nested_leaf, ParentQuery::Node(inner), false));
    assert!(!ancestry.has_parent(outer_leaf, ParentQuery::Node(inner), false));
    assert_eq!(ancestry.ancestors(nested_leaf).count(), 2);
    assert_eq!(ancestry.len(), 5);
}
