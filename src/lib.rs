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

//! SCIM filter expression and PATCH path parser
//!
//! Parses the filter language of RFC 7644 section 3.4.2.2 and the PATCH
//! operation path syntax of section 3.5.2 into a typed syntax tree.
//!
//! ```
//! use scim_filter::{parse_filter, parse_path, Node, Operator};
//!
//! let filter = parse_filter(r#"userName eq "bjensen" and title pr"#)?.unwrap();
//! let Node::Conjunction(operands) = &filter else { unreachable!() };
//! assert_eq!(operands.len(), 2);
//! assert_eq!(operands[1].as_comparison().unwrap().operator(), Operator::Pr);
//!
//! let path = parse_path(r#"emails[type eq "work"].value"#)?;
//! assert_eq!(path.attribute_path().path(), "emails.value");
//! # Ok::<(), scim_filter::ParseError>(())
//! ```

#![warn(missing_docs)]

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{
    Ancestry, AttributePath, Comparison, Connective, LogicalOperator, Negation, Node, NodeKind,
    Operator, ParentQuery, PathExpression, Value, ValuePath, Visitor,
};
pub use error::{ParseError, ParseResult};
pub use parser::{FilterParser, ParserMode, PathParser, SourceLocation};

/// Parse a filter expression
///
/// See [`FilterParser::parse`].
pub fn parse_filter(input: &str) -> ParseResult<Option<Node>> {
    FilterParser::new().parse(input)
}

/// Parse a PATCH operation path
///
/// See [`PathParser::parse`].
pub fn parse_path(input: &str) -> ParseResult<PathExpression> {
    PathParser::new().parse(input)
}
