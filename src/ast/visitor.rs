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

//! Visitor pattern for AST traversal

use super::node::{Comparison, Connective, Negation, Node, ValuePath};
use super::path::AttributePath;

/// Trait for visiting AST nodes
///
/// `'ast` is the lifetime of the visited tree, so visitors may keep
/// references to the nodes they see.
pub trait Visitor<'ast>: Sized {
    /// The result type of visiting a node
    type Result;

    /// Visit any node
    fn visit_node(&mut self, node: &'ast Node) -> Self::Result {
        walk_node(self, node)
    }

    /// Visit a bare attribute path
    fn visit_attribute_path(&mut self, path: &'ast AttributePath) -> Self::Result;

    /// Visit a comparison
    fn visit_comparison(&mut self, comparison: &'ast Comparison) -> Self::Result;

    /// Visit a negation
    fn visit_negation(&mut self, negation: &'ast Negation) -> Self::Result;

    /// Visit the operands of an `and`
    fn visit_conjunction(&mut self, connective: &'ast Connective) -> Self::Result;

    /// Visit the operands of an `or`
    fn visit_disjunction(&mut self, connective: &'ast Connective) -> Self::Result;

    /// Visit a value path
    fn visit_value_path(&mut self, value_path: &'ast ValuePath) -> Self::Result;
}

/// Default implementation of walking a node
pub fn walk_node<'ast, V: Visitor<'ast>>(visitor: &mut V, node: &'ast Node) -> V::Result {
    match node {
        Node::AttributePath(path) => visitor.visit_attribute_path(path),
        Node::Comparison(comparison) => visitor.visit_comparison(comparison),
        Node::Negation(negation) => visitor.visit_negation(negation),
        Node::Conjunction(connective) => visitor.visit_conjunction(connective),
        Node::Disjunction(connective) => visitor.visit_disjunction(connective),
        Node::ValuePath(value_path) => visitor.visit_value_path(value_path),
    }
}

/// Collects every attribute path referenced by a tree, in source order
#[derive(Debug, Default)]
pub struct AttributePathCollector<'ast> {
    paths: Vec<&'ast AttributePath>,
}

impl<'ast> AttributePathCollector<'ast> {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected paths
    pub fn into_paths(self) -> Vec<&'ast AttributePath> {
        self.paths
    }
}

impl<'ast> Visitor<'ast> for AttributePathCollector<'ast> {
    type Result = ();

    fn visit_attribute_path(&mut self, path: &'ast AttributePath) {
        self.paths.push(path);
    }

    fn visit_comparison(&mut self, comparison: &'ast Comparison) {
        self.paths.push(comparison.attribute_path());
    }

    fn visit_negation(&mut self, negation: &'ast Negation) {
        self.visit_node(negation.inner());
    }

    fn visit_conjunction(&mut self, connective: &'ast Connective) {
        connective.iter().for_each(|child| self.visit_node(child));
    }

    fn visit_disjunction(&mut self, connective: &'ast Connective) {
        self.visit_conjunction(connective);
    }

    fn visit_value_path(&mut self, value_path: &'ast ValuePath) {
        self.paths.push(value_path.attribute_path());
        self.visit_node(value_path.predicate());
    }
}

impl Node {
    /// Every attribute path in this tree, in source order
    ///
    /// A value path contributes its own path followed by those of its
    /// predicate.
    pub fn attribute_paths(&self) -> Vec<&AttributePath> {
        let mut collector = AttributePathCollector::new();
        collector.visit_node(self);
        collector.into_paths()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LogicalOperator, Operator, Value};

    struct DepthCounter;

    impl<'ast> Visitor<'ast> for DepthCounter {
        type Result = usize;

        fn visit_attribute_path(&mut self, _path: &'ast AttributePath) -> usize {
            1
        }

        fn visit_comparison(&mut self, _comparison: &'ast Comparison) -> usize {
            1
        }

        fn visit_negation(&mut self, negation: &'ast Negation) -> usize {
            1 + self.visit_node(negation.inner())
        }

        fn visit_conjunction(&mut self, connective: &'ast Connective) -> usize {
            1 + connective
                .iter()
                .map(|child| self.visit_node(child))
                .max()
                .unwrap_or(0)
        }

        fn visit_disjunction(&mut self, connective: &'ast Connective) -> usize {
            self.visit_conjunction(connective)
        }

        fn visit_value_path(&mut self, value_path: &'ast ValuePath) -> usize {
            1 + self.visit_node(value_path.predicate())
        }
    }

    fn comparison(name: &str) -> Node {
        let path = AttributePath::from_name(name);
        Comparison::new(path, Operator::Eq, Some(Value::Integer(1))).into()
    }

    #[test]
    fn test_custom_visitor() {
        let inner = Node::join(LogicalOperator::And, comparison("b"), comparison("c"));
        let tree = Node::join(LogicalOperator::Or, comparison("a"), Negation::new(inner).into());

        assert_eq!(DepthCounter.visit_node(&tree), 4);
    }

    #[test]
    fn test_attribute_paths_in_source_order() {
        let tree = Node::join(
            LogicalOperator::And,
            comparison("userName"),
            ValuePath::new(AttributePath::from_name("emails"), comparison("emails.type")).into(),
        );

        let paths: Vec<String> = tree
            .attribute_paths()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(paths, vec!["userName", "emails", "emails.type"]);
    }
}
