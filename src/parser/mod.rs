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

//! SCIM filter and PATCH path parser
//!
//! [`FilterParser`] turns a filter such as
//! `emails[type eq "work" and value co "@example.com"] or title pr` into a
//! [`Node`] tree. [`PathParser`] accepts the restricted form used by PATCH
//! operation paths: an attribute path, or a single value path optionally
//! followed by a sub-attribute.
//!
//! Both parsers are plain values holding their mode. Scanner patterns are
//! compiled once per process and shared, so parsers are cheap to create and
//! safe to use from many threads at once.

pub(crate) mod grammar;
pub mod lexer;
pub mod span;
pub mod tokenizer;

use crate::ast::{Node, PathExpression};
use crate::error::ParseResult;
use grammar::Grammar;
use std::fmt;

pub use lexer::TokenStream;
pub use span::SourceLocation;
pub use tokenizer::{Token, TokenKind, Tokenizer};

/// Which expression form is being parsed
///
/// Path mode additionally recognizes a trailing `.subAttribute` after a
/// value path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ParserMode {
    /// Filter expressions, as in `?filter=`
    #[default]
    Filter,
    /// PATCH operation paths
    Path,
}

impl ParserMode {
    /// Lowercase mode name
    pub const fn as_str(self) -> &'static str {
        match self {
            ParserMode::Filter => "filter",
            ParserMode::Path => "path",
        }
    }
}

impl fmt::Display for ParserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parser for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParser {
    grammar: Grammar,
}

impl FilterParser {
    /// Create a filter parser
    pub const fn new() -> Self {
        Self {
            grammar: Grammar::new(ParserMode::Filter),
        }
    }

    /// Parse a filter expression
    ///
    /// Returns `Ok(None)` when the filter starts with an empty group or
    /// negation such as `()` or `not ()`. Input after a complete
    /// expression, like the `)` in `title pr)`, is ignored.
    pub fn parse(&self, input: &str) -> ParseResult<Option<Node>> {
        log::debug!("parsing filter {input:?}");

        let mut stream = self.grammar.tokenizer().tokenize(input)?;
        let node = self.grammar.parse_expression(&mut stream, false)?;

        if stream.has_next() {
            log::trace!(
                "ignoring {} trailing tokens of filter {input:?}",
                stream.tokens().len() - stream.position()
            );
        }

        Ok(node)
    }
}

impl Default for FilterParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parser for PATCH operation paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathParser {
    grammar: Grammar,
}

impl PathParser {
    /// Create a path parser
    pub const fn new() -> Self {
        Self {
            grammar: Grammar::new(ParserMode::Path),
        }
    }

    /// Parse a PATCH operation path
    ///
    /// Accepts `attr`, `attr.sub`, schema-qualified variants of both,
    /// `attr[filter]` and `attr[filter].sub`. Anything after the path is an
    /// error.
    pub fn parse(&self, input: &str) -> ParseResult<PathExpression> {
        log::debug!("parsing path {input:?}");

        let mut stream = self.grammar.tokenizer().tokenize(input)?;
        if !stream.is_next(&[TokenKind::Name]) {
            return Err(stream.expected_path());
        }

        let attribute_path = Grammar::parse_attribute_path(&mut stream)?;
        if !stream.has_next() {
            return Ok(PathExpression::Attribute(attribute_path));
        }

        if !stream.is_next(&[TokenKind::BracketOpen]) {
            return Err(stream.unexpected_next());
        }
        if attribute_path.len() > 1 {
            return Err(stream.unexpected());
        }

        let mut value_path = self.grammar.parse_value_path(&mut stream, attribute_path)?;
        if stream.is_next(&[TokenKind::SubAttribute]) {
            let sub_attribute = stream.consume(&[TokenKind::SubAttribute])?;
            value_path = value_path.with_sub_attribute(&sub_attribute.text[1..]);
        }

        if stream.has_next() {
            return Err(stream.unexpected_next());
        }

        Ok(PathExpression::Value(value_path))
    }
}

impl Default for PathParser {
    fn default() -> Self {
        Self::new()
    }
}
