// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Filter and path expression nodes

use super::operator::{LogicalOperator, Operator, Value};
use super::path::AttributePath;
use std::ops::Index;
use std::slice;

/// Kind of a [`Node`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum NodeKind {
    /// Bare attribute path
    AttributePath,
    /// Attribute comparison
    Comparison,
    /// `not (...)`
    Negation,
    /// Operands joined by `and`
    Conjunction,
    /// Operands joined by `or`
    Disjunction,
    /// `attr[...]`
    ValuePath,
}

/// Node of a parsed filter expression
///
/// Nodes own their children. Parent lookups go through
/// [`Ancestry`](super::Ancestry), which indexes a finished tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case", from = "repr::NodeRepr")
)]
pub enum Node {
    /// Bare attribute path, only produced by path parsing
    AttributePath(AttributePath),
    /// `attribute op value` or `attribute pr`
    Comparison(Comparison),
    /// Negated sub-expression
    Negation(Negation),
    /// Operands that must all hold
    Conjunction(Connective),
    /// Operands of which one must hold
    Disjunction(Connective),
    /// Predicate over the members of a multi-valued attribute
    ValuePath(ValuePath),
}

impl Node {
    /// Kind of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::AttributePath(_) => NodeKind::AttributePath,
            Node::Comparison(_) => NodeKind::Comparison,
            Node::Negation(_) => NodeKind::Negation,
            Node::Conjunction(_) => NodeKind::Conjunction,
            Node::Disjunction(_) => NodeKind::Disjunction,
            Node::ValuePath(_) => NodeKind::ValuePath,
        }
    }

    /// Join operands with a logical operator
    ///
    /// Operands that are connectives of the same kind are spliced in, so the
    /// result never directly contains a child of its own kind. Returns `None`
    /// when fewer than two operands are given.
    pub fn connective(
        operator: LogicalOperator,
        operands: impl IntoIterator<Item = Node>,
    ) -> Option<Node> {
        Connective::new(operands.into_iter().collect())
            .map(|connective| Self::flattened(operator, connective))
    }

    /// Join two operands, splicing same-kind connectives on either side
    pub(crate) fn join(operator: LogicalOperator, left: Node, right: Node) -> Node {
        Self::flattened(
            operator,
            Connective {
                children: vec![left, right],
            },
        )
    }

    fn flattened(operator: LogicalOperator, operands: Connective) -> Node {
        let mut children = Vec::with_capacity(operands.children.len());
        for operand in operands.children {
            match operand {
                Node::Conjunction(connective) if operator == LogicalOperator::And => {
                    children.extend(connective.children)
                }
                Node::Disjunction(connective) if operator == LogicalOperator::Or => {
                    children.extend(connective.children)
                }
                operand => children.push(operand),
            }
        }

        let connective = Connective { children };
        match operator {
            LogicalOperator::And => Node::Conjunction(connective),
            LogicalOperator::Or => Node::Disjunction(connective),
        }
    }

    /// Direct children in order
    pub fn children(&self) -> &[Node] {
        match self {
            Node::AttributePath(_) | Node::Comparison(_) => &[],
            Node::Negation(negation) => slice::from_ref(negation.inner()),
            Node::Conjunction(connective) | Node::Disjunction(connective) => connective.children(),
            Node::ValuePath(value_path) => slice::from_ref(value_path.predicate()),
        }
    }

    /// Logical operator of a conjunction or disjunction
    pub fn logical_operator(&self) -> Option<LogicalOperator> {
        match self {
            Node::Conjunction(_) => Some(LogicalOperator::And),
            Node::Disjunction(_) => Some(LogicalOperator::Or),
            _ => None,
        }
    }

    /// The comparison, if this is one
    pub fn as_comparison(&self) -> Option<&Comparison> {
        match self {
            Node::Comparison(comparison) => Some(comparison),
            _ => None,
        }
    }

    /// The negation, if this is one
    pub fn as_negation(&self) -> Option<&Negation> {
        match self {
            Node::Negation(negation) => Some(negation),
            _ => None,
        }
    }

    /// Operands of a conjunction or disjunction
    pub fn as_connective(&self) -> Option<&Connective> {
        match self {
            Node::Conjunction(connective) | Node::Disjunction(connective) => Some(connective),
            _ => None,
        }
    }

    /// The value path, if this is one
    pub fn as_value_path(&self) -> Option<&ValuePath> {
        match self {
            Node::ValuePath(value_path) => Some(value_path),
            _ => None,
        }
    }

    /// The attribute path, if this is a bare one
    pub fn as_attribute_path(&self) -> Option<&AttributePath> {
        match self {
            Node::AttributePath(path) => Some(path),
            _ => None,
        }
    }

    /// Re-root every comparison below this node under `prefix`
    ///
    /// Only comparisons, negations and connectives may appear inside a
    /// value path predicate. Any other node makes the rewrite fail.
    pub(crate) fn rooted_at(self, prefix: &AttributePath) -> Option<Node> {
        match self {
            Node::Comparison(comparison) => Some(Node::Comparison(comparison.rooted_at(prefix))),
            Node::Negation(negation) => (*negation.inner)
                .rooted_at(prefix)
                .map(|inner| Node::Negation(Negation::new(inner))),
            Node::Conjunction(connective) => connective.rooted_at(prefix).map(Node::Conjunction),
            Node::Disjunction(connective) => connective.rooted_at(prefix).map(Node::Disjunction),
            Node::AttributePath(_) | Node::ValuePath(_) => None,
        }
    }
}

impl From<Comparison> for Node {
    fn from(comparison: Comparison) -> Self {
        Node::Comparison(comparison)
    }
}

impl From<Negation> for Node {
    fn from(negation: Negation) -> Self {
        Node::Negation(negation)
    }
}

impl From<ValuePath> for Node {
    fn from(value_path: ValuePath) -> Self {
        Node::ValuePath(value_path)
    }
}

impl From<AttributePath> for Node {
    fn from(path: AttributePath) -> Self {
        Node::AttributePath(path)
    }
}

/// Comparison of an attribute against a literal
///
/// The value is absent exactly when the operator is `pr`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "repr::ComparisonRepr")
)]
pub struct Comparison {
    attribute_path: AttributePath,
    operator: Operator,
    value: Option<Value>,
}

impl Comparison {
    /// Create a comparison
    ///
    /// The value is dropped for `pr`, and a missing value for any other
    /// operator becomes [`Value::Null`].
    pub fn new(attribute_path: AttributePath, operator: Operator, value: Option<Value>) -> Self {
        let value = if operator.is_unary() {
            None
        } else {
            Some(value.unwrap_or(Value::Null))
        };

        Self {
            attribute_path,
            operator,
            value,
        }
    }

    /// `attribute pr`
    pub fn present(attribute_path: AttributePath) -> Self {
        Self::new(attribute_path, Operator::Pr, None)
    }

    /// Compared attribute
    pub fn attribute_path(&self) -> &AttributePath {
        &self.attribute_path
    }

    /// Comparison operator
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Compared value, absent for `pr`
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn rooted_at(self, prefix: &AttributePath) -> Self {
        Self {
            attribute_path: self.attribute_path.prefixed_by(prefix),
            ..self
        }
    }
}

/// Negated sub-expression
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Negation {
    inner: Box<Node>,
}

impl Negation {
    /// Negate a node
    pub fn new(inner: Node) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Negated node
    pub fn inner(&self) -> &Node {
        &self.inner
    }
}

/// Two or more operands of a conjunction or disjunction
///
/// Built through [`Node::connective`], which keeps same-kind connectives
/// flattened.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "repr::ConnectiveRepr")
)]
pub struct Connective {
    children: Vec<Node>,
}

impl Connective {
    fn new(children: Vec<Node>) -> Option<Self> {
        (children.len() >= 2).then_some(Self { children })
    }

    /// Operands in source order
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Number of operands, at least two
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Always `false`, a connective holds at least two operands
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Operand at `index`, if present
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Iterate over the operands
    pub fn iter(&self) -> slice::Iter<'_, Node> {
        self.children.iter()
    }

    fn rooted_at(self, prefix: &AttributePath) -> Option<Self> {
        self.children
            .into_iter()
            .map(|child| child.rooted_at(prefix))
            .collect::<Option<Vec<_>>>()
            .map(|children| Self { children })
    }
}

impl Index<usize> for Connective {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        &self.children[index]
    }
}

impl<'a> IntoIterator for &'a Connective {
    type Item = &'a Node;
    type IntoIter = slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

/// Predicate over the members of a multi-valued attribute
///
/// Every attribute path inside the predicate is already rooted at the
/// collection: in `emails[type eq "work"]` the comparison refers to
/// `emails.type`. In path expressions a trailing sub-attribute such as
/// `.value` is appended to [`attribute_path`](Self::attribute_path) and
/// also kept on its own.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValuePath {
    attribute_path: AttributePath,
    predicate: Box<Node>,
    sub_attribute: Option<String>,
}

impl ValuePath {
    /// Create a value path from a collection and an already rooted predicate
    pub fn new(attribute_path: AttributePath, predicate: Node) -> Self {
        Self {
            attribute_path,
            predicate: Box::new(predicate),
            sub_attribute: None,
        }
    }

    /// Target a sub-attribute of the matching members
    pub fn with_sub_attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let collection = self.collection_path();
        self.attribute_path = collection.join(name.as_str());
        self.sub_attribute = Some(name);
        self
    }

    /// Targeted attribute, including any sub-attribute
    pub fn attribute_path(&self) -> &AttributePath {
        &self.attribute_path
    }

    /// Filtered multi-valued attribute, without any sub-attribute
    pub fn collection_path(&self) -> AttributePath {
        match &self.sub_attribute {
            Some(_) if self.attribute_path.len() > 1 => {
                let names = &self.attribute_path.names()[..self.attribute_path.len() - 1];
                AttributePath::new(self.attribute_path.schema().map(str::to_owned), names)
                    .unwrap_or_else(|_| self.attribute_path.clone())
            }
            _ => self.attribute_path.clone(),
        }
    }

    /// Filter applied to the members
    pub fn predicate(&self) -> &Node {
        &self.predicate
    }

    /// Sub-attribute following the brackets, path expressions only
    pub fn sub_attribute(&self) -> Option<&str> {
        self.sub_attribute.as_deref()
    }
}

/// Result of parsing a PATCH operation path
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum PathExpression {
    /// `attr`, `attr.sub` or a schema-qualified form
    Attribute(AttributePath),
    /// `attr[filter]`, optionally followed by `.sub`
    Value(ValuePath),
}

impl PathExpression {
    /// Targeted attribute
    pub fn attribute_path(&self) -> &AttributePath {
        match self {
            PathExpression::Attribute(path) => path,
            PathExpression::Value(value_path) => value_path.attribute_path(),
        }
    }

    /// The value path, if this is one
    pub fn as_value_path(&self) -> Option<&ValuePath> {
        match self {
            PathExpression::Value(value_path) => Some(value_path),
            PathExpression::Attribute(_) => None,
        }
    }
}

impl From<PathExpression> for Node {
    fn from(path: PathExpression) -> Self {
        match path {
            PathExpression::Attribute(path) => Node::AttributePath(path),
            PathExpression::Value(value_path) => Node::ValuePath(value_path),
        }
    }
}

#[cfg(feature = "serde")]
mod repr {
    use super::{
        AttributePath, Comparison, Connective, LogicalOperator, Negation, Node, Operator, Value,
        ValuePath,
    };
    use thiserror::Error;

    /// Deserialized through [`Comparison::new`] so `eq null` keeps its value
    #[derive(serde::Deserialize)]
    pub(super) struct ComparisonRepr {
        attribute_path: AttributePath,
        operator: Operator,
        #[serde(default)]
        value: Option<Value>,
    }

    impl From<ComparisonRepr> for Comparison {
        fn from(repr: ComparisonRepr) -> Self {
            Comparison::new(repr.attribute_path, repr.operator, repr.value)
        }
    }

    #[derive(Error, Debug)]
    #[error("A connective should contain at least two operands.")]
    pub(super) struct TooFewOperands;

    #[derive(serde::Deserialize)]
    pub(super) struct ConnectiveRepr {
        children: Vec<Node>,
    }

    impl TryFrom<ConnectiveRepr> for Connective {
        type Error = TooFewOperands;

        fn try_from(repr: ConnectiveRepr) -> Result<Self, Self::Error> {
            Connective::new(repr.children).ok_or(TooFewOperands)
        }
    }

    /// Same shape as [`Node`], re-flattened on the way in
    #[derive(serde::Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub(super) enum NodeRepr {
        AttributePath(AttributePath),
        Comparison(Comparison),
        Negation(Negation),
        Conjunction(Connective),
        Disjunction(Connective),
        ValuePath(ValuePath),
    }

    impl From<NodeRepr> for Node {
        fn from(repr: NodeRepr) -> Self {
            match repr {
                NodeRepr::AttributePath(path) => Node::AttributePath(path),
                NodeRepr::Comparison(comparison) => Node::Comparison(comparison),
                NodeRepr::Negation(negation) => Node::Negation(negation),
                NodeRepr::Conjunction(connective) => {
                    Node::flattened(LogicalOperator::And, connective)
                }
                NodeRepr::Disjunction(connective) => {
                    Node::flattened(LogicalOperator::Or, connective)
                }
                NodeRepr::ValuePath(value_path) => Node::ValuePath(value_path),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(name: &str, value: &str) -> Node {
        Comparison::new(AttributePath::from_name(name), Operator::Eq, Some(value.into())).into()
    }

    #[test]
    fn test_comparison_value_invariant() {
        let present = Comparison::new(
            AttributePath::from_name("title"),
            Operator::Pr,
            Some(Value::from("ignored")),
        );
        assert_eq!(present.value(), None);

        let null = Comparison::new(AttributePath::from_name("title"), Operator::Eq, None);
        assert_eq!(null.value(), Some(&Value::Null));
    }

    #[test]
    fn test_connective_requires_two_operands() {
        assert!(Node::connective(LogicalOperator::And, [comparison("a", "1")]).is_none());

        let node =
            Node::connective(LogicalOperator::And, [comparison("a", "1"), comparison("b", "2")]);
        let Some(Node::Conjunction(connective)) = &node else {
            panic!("expected conjunction, got {node:?}");
        };
        assert_eq!(connective.len(), 2);
        assert_eq!(connective[1], comparison("b", "2"));
        assert_eq!(connective.iter().count(), 2);
    }

    #[test]
    fn test_join_splices_same_kind_operands() {
        let left = Node::join(LogicalOperator::And, comparison("a", "1"), comparison("b", "2"));
        let right = Node::join(LogicalOperator::And, comparison("c", "3"), comparison("d", "4"));
        let joined = Node::join(LogicalOperator::And, left, right);

        assert_eq!(joined.kind(), NodeKind::Conjunction);
        assert_eq!(joined.children().len(), 4);
        assert!(joined.children().iter().all(|child| child.kind() == NodeKind::Comparison));

        let disjunction =
            Node::join(LogicalOperator::Or, comparison("a", "1"), comparison("b", "2"));
        let mixed = Node::join(LogicalOperator::And, disjunction, comparison("c", "3"));
        assert_eq!(mixed.children().len(), 2);
        assert_eq!(mixed.children()[0].kind(), NodeKind::Disjunction);
    }

    #[test]
    fn test_rooted_at_rewrites_nested_comparisons() {
        let prefix = AttributePath::from_name("urn:example:emails");
        let predicate = Node::join(
            LogicalOperator::And,
            comparison("type", "work"),
            Negation::new(comparison("primary", "true")).into(),
        );

        let rooted = predicate.rooted_at(&prefix).unwrap();
        let paths: Vec<_> = rooted
            .children()
            .iter()
            .map(|child| match child {
                Node::Comparison(comparison) => comparison.attribute_path().to_string(),
                Node::Negation(negation) => negation
                    .inner()
                    .as_comparison()
                    .unwrap()
                    .attribute_path()
                    .to_string(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();

        assert_eq!(paths, vec!["urn:example:emails.type", "urn:example:emails.primary"]);
    }

    #[test]
    fn test_rooted_at_rejects_nested_value_path() {
        let prefix = AttributePath::from_name("name");
        let nested =
            ValuePath::new(AttributePath::from_name("emails"), comparison("emails.type", "work"));
        assert_eq!(Node::from(nested).rooted_at(&prefix), None);
        assert_eq!(Node::AttributePath(prefix.clone()).rooted_at(&prefix), None);
    }

    #[test]
    fn test_sub_attribute_extends_attribute_path() {
        let value_path =
            ValuePath::new(AttributePath::from_name("emails"), comparison("emails.type", "work"))
                .with_sub_attribute("value");

        assert_eq!(value_path.attribute_path().names(), ["emails", "value"]);
        assert_eq!(value_path.collection_path().names(), ["emails"]);
        assert_eq!(value_path.sub_attribute(), Some("value"));
    }

    #[test]
    fn test_children_and_kind() {
        let negation = Node::from(Negation::new(comparison("a", "1")));
        assert_eq!(negation.kind(), NodeKind::Negation);
        assert_eq!(negation.children(), [comparison("a", "1")]);
        assert!(comparison("a", "1").children().is_empty());
    }
}
