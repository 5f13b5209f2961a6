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

//! Parent lookups over a finished tree
//!
//! Nodes own their children and hold no back references. [`Ancestry`]
//! walks a tree once and records, for every node, the index of its parent,
//! keyed by node address. The tree is borrowed for as long as the index
//! lives, so addresses stay valid.

use super::node::{Node, NodeKind};
use rustc_hash::FxHashMap;

/// What a parent must be to satisfy [`Ancestry::has_parent`]
#[derive(Debug, Clone, Copy)]
pub enum ParentQuery<'q> {
    /// Any parent at all
    Any,
    /// A parent of the given kind
    Kind(NodeKind),
    /// This exact node instance
    Node(&'q Node),
}

/// Parent index of a tree
#[derive(Debug)]
pub struct Ancestry<'ast> {
    nodes: Vec<&'ast Node>,
    parents: Vec<Option<usize>>,
    index: FxHashMap<*const Node, usize>,
}

impl<'ast> Ancestry<'ast> {
    /// Index every node below and including `root`
    pub fn new(root: &'ast Node) -> Self {
        let mut ancestry = Self {
            nodes: Vec::new(),
            parents: Vec::new(),
            index: FxHashMap::default(),
        };
        ancestry.record(root, None);
        ancestry
    }

    fn record(&mut self, node: &'ast Node, parent: Option<usize>) {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.parents.push(parent);
        self.index.insert(node as *const Node, id);

        for child in node.children() {
            self.record(child, Some(id));
        }
    }

    /// Root of the indexed tree
    pub fn root(&self) -> &'ast Node {
        self.nodes[0]
    }

    /// Number of indexed nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`, the root itself is indexed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` is part of the indexed tree
    pub fn contains(&self, node: &Node) -> bool {
        self.index.contains_key(&(node as *const Node))
    }

    /// Direct parent of `node`
    ///
    /// `None` for the root and for nodes outside the tree.
    pub fn parent(&self, node: &Node) -> Option<&'ast Node> {
        let id = *self.index.get(&(node as *const Node))?;
        self.parents[id].map(|parent| self.nodes[parent])
    }

    /// Ancestors of `node`, nearest first
    pub fn ancestors<'a>(&'a self, node: &Node) -> impl Iterator<Item = &'ast Node> + 'a {
        let mut current = self.index.get(&(node as *const Node)).copied();
        std::iter::from_fn(move || {
            let parent = self.parents[current?]?;
            current = Some(parent);
            Some(self.nodes[parent])
        })
    }

    /// Whether the parent of `node` satisfies `query`
    ///
    /// With `recursive` every ancestor is tried, nearest first, until one
    /// matches. [`ParentQuery::Any`] only asks whether a parent exists.
    pub fn has_parent(&self, node: &Node, query: ParentQuery<'_>, recursive: bool) -> bool {
        let matches = |parent: &Node| match query {
            ParentQuery::Any => true,
            ParentQuery::Kind(kind) => parent.kind() == kind,
            ParentQuery::Node(expected) => std::ptr::eq(parent, expected),
        };

        if recursive {
            self.ancestors(node).any(matches)
        } else {
            self.parent(node).is_some_and(matches)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        AttributePath, Comparison, LogicalOperator, Negation, Operator, ValuePath,
    };

    fn comparison(name: &str) -> Node {
        Comparison::new(AttributePath::from_name(name), Operator::Pr, None).into()
    }

    #[test]
    fn test_parent_links() {
        let tree = Node::join(
            LogicalOperator::And,
            comparison("a"),
            Negation::new(comparison("b")).into(),
        );
        let ancestry = Ancestry::new(&tree);

        let first = &tree.children()[0];
        let negation = &tree.children()[1];
        let negated = &negation.children()[0];

        assert_eq!(ancestry.len(), 4);
        assert!(ancestry.parent(&tree).is_none());
        assert!(std::ptr::eq(ancestry.parent(first).unwrap(), &tree));
        assert!(std::ptr::eq(ancestry.parent(negated).unwrap(), negation));
        assert_eq!(ancestry.ancestors(negated).count(), 2);
    }

    #[test]
    fn test_has_parent_queries() {
        let tree = Node::ValuePath(ValuePath::new(
            AttributePath::from_name("emails"),
            Node::join(
                LogicalOperator::Or,
                comparison("emails.type"),
                comparison("emails.value"),
            ),
        ));
        let ancestry = Ancestry::new(&tree);
        let disjunction = &tree.children()[0];
        let leaf = &disjunction.children()[1];

        assert!(ancestry.has_parent(leaf, ParentQuery::Any, false));
        assert!(!ancestry.has_parent(&tree, ParentQuery::Any, true));

        assert!(ancestry.has_parent(leaf, ParentQuery::Kind(NodeKind::Disjunction), false));
        assert!(!ancestry.has_parent(leaf, ParentQuery::Kind(NodeKind::ValuePath), false));
        assert!(ancestry.has_parent(leaf, ParentQuery::Kind(NodeKind::ValuePath), true));

        assert!(ancestry.has_parent(leaf, ParentQuery::Node(disjunction), false));
        assert!(!ancestry.has_parent(leaf, ParentQuery::Node(&tree), false));
        assert!(ancestry.has_parent(leaf, ParentQuery::Node(&tree), true));
    }

    #[test]
    fn test_foreign_node_has_no_parent() {
        let tree = Node::Negation(Negation::new(comparison("a")));
        let ancestry = Ancestry::new(&tree);
        let stranger = comparison("a");

        assert!(!ancestry.contains(&stranger));
        assert!(ancestry.parent(&stranger).is_none());
        assert!(!ancestry.has_parent(&stranger, ParentQuery::Any, true));
    }
}
