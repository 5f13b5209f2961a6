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

//! Rendering nodes back to filter text
//!
//! The output parses back to an equal tree. Connectives nested inside
//! other connectives or negations are parenthesized, and comparisons
//! inside a value path are written relative to its collection.

use super::node::{Comparison, Connective, Negation, Node, PathExpression, ValuePath};
use super::path::AttributePath;
use super::visitor::Visitor;
use std::fmt;

struct FilterWriter<'f, 'w> {
    out: &'f mut fmt::Formatter<'w>,
    collection: Option<AttributePath>,
}

impl FilterWriter<'_, '_> {
    fn write_operand(&mut self, node: &Node) -> fmt::Result {
        if node.logical_operator().is_some() {
            self.out.write_str("(")?;
            self.visit_node(node)?;
            self.out.write_str(")")
        } else {
            self.visit_node(node)
        }
    }

    fn write_connective(&mut self, connective: &Connective, keyword: &str) -> fmt::Result {
        for (index, child) in connective.iter().enumerate() {
            if index > 0 {
                write!(self.out, " {keyword} ")?;
            }
            self.write_operand(child)?;
        }
        Ok(())
    }
}

impl<'ast> Visitor<'ast> for FilterWriter<'_, '_> {
    type Result = fmt::Result;

    fn visit_attribute_path(&mut self, path: &'ast AttributePath) -> fmt::Result {
        write!(self.out, "{path}")
    }

    fn visit_comparison(&mut self, comparison: &'ast Comparison) -> fmt::Result {
        let path = comparison.attribute_path();
        match self.collection.as_ref().and_then(|collection| path.relative_to(collection)) {
            Some(relative) => write!(self.out, "{relative}")?,
            None => write!(self.out, "{path}")?,
        }

        write!(self.out, " {}", comparison.operator())?;
        if let Some(value) = comparison.value() {
            write!(self.out, " {value}")?;
        }
        Ok(())
    }

    fn visit_negation(&mut self, negation: &'ast Negation) -> fmt::Result {
        self.out.write_str("not (")?;
        self.visit_node(negation.inner())?;
        self.out.write_str(")")
    }

    fn visit_conjunction(&mut self, connective: &'ast Connective) -> fmt::Result {
        self.write_connective(connective, "and")
    }

    fn visit_disjunction(&mut self, connective: &'ast Connective) -> fmt::Result {
        self.write_connective(connective, "or")
    }

    fn visit_value_path(&mut self, value_path: &'ast ValuePath) -> fmt::Result {
        let collection = value_path.collection_path();
        write!(self.out, "{collection}[")?;

        let outer = self.collection.replace(collection);
        let result = self.visit_node(value_path.predicate());
        self.collection = outer;
        result?;

        self.out.write_str("]")?;
        if let Some(sub_attribute) = value_path.sub_attribute() {
            write!(self.out, ".{sub_attribute}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        FilterWriter {
            out: f,
            collection: None,
        }
        .visit_node(self)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathExpression::Attribute(path) => write!(f, "{path}"),
            PathExpression::Value(value_path) => FilterWriter {
                out: f,
                collection: None,
            }
            .visit_value_path(value_path),
        }
    }
}
