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

//! Recursive descent grammar shared by filter and path parsing
//!
//! ```text
//! expression  := primary (LOGICAL expression)?
//! primary     := "(" body ")" | NOT "(" body ")" | NAME value_path | NAME comparison
//! value_path  := "[" expression "]"
//! comparison  := " pr" | OPERATOR literal
//! ```
//!
//! Parenthesized bodies are located by bracket matching and then scanned
//! and parsed on their own, so a group always forms a single operand.
//! Connectives are right-recursive: an operand that is itself a connective
//! of the same kind is flattened into its parent, one of the other kind
//! stays nested. `a and b or c` therefore becomes `and(a, or(b, c))`.

use super::ParserMode;
use super::lexer::TokenStream;
use super::tokenizer::{Token, TokenKind, Tokenizer};
use crate::ast::{
    AttributePath, Comparison, LogicalOperator, Negation, Node, Operator, Value, ValuePath,
};
use crate::error::{ParseError, ParseResult};
use std::ops::Range;

/// Grammar rules bound to a scanning mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Grammar {
    tokenizer: Tokenizer,
}

impl Grammar {
    pub(crate) const fn new(mode: ParserMode) -> Self {
        Self {
            tokenizer: Tokenizer::new(mode),
        }
    }

    pub(crate) fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Parse an expression from the current position
    ///
    /// Returns `None` when the expression starts with an empty group or
    /// negation. Tokens after a complete expression are left unconsumed.
    pub(crate) fn parse_expression(
        &self,
        stream: &mut TokenStream<'_>,
        in_value_path: bool,
    ) -> ParseResult<Option<Node>> {
        let node = if stream.is_next(&[TokenKind::ParenOpen]) {
            match self.parse_group(stream)? {
                Some(node) => node,
                None => return Ok(None),
            }
        } else if stream.is_next(&[TokenKind::Negation]) {
            match self.parse_negation(stream, in_value_path)? {
                Some(node) => node,
                None => return Ok(None),
            }
        } else if stream.is_next(&[TokenKind::Name]) {
            let attribute_path = Self::parse_attribute_path(stream)?;

            if stream.is_next(&[TokenKind::BracketOpen]) {
                if in_value_path || attribute_path.len() > 1 {
                    return Err(stream.unexpected());
                }
                Node::ValuePath(self.parse_value_path(stream, attribute_path)?)
            } else {
                Node::Comparison(Self::parse_comparison(stream, attribute_path)?)
            }
        } else {
            return Err(stream.unexpected());
        };

        if stream.is_next(&[TokenKind::LogicalOperator]) {
            return self.parse_connective(stream, node, in_value_path).map(Some);
        }

        Ok(Some(node))
    }

    /// `( expression )`, parsed as an independent filter
    fn parse_group(&self, stream: &mut TokenStream<'_>) -> ParseResult<Option<Node>> {
        let body = Self::enclosed(stream)?;
        if body.is_empty() {
            log::trace!("empty group ends at offset {}", body.end);
            return Ok(None);
        }

        let mut inner = self.tokenizer.tokenize_range(stream.source(), body)?;
        self.parse_expression(&mut inner, false)
    }

    /// `not ( expression )`
    fn parse_negation(
        &self,
        stream: &mut TokenStream<'_>,
        in_value_path: bool,
    ) -> ParseResult<Option<Node>> {
        stream.consume(&[TokenKind::Negation])?;

        let body = Self::enclosed(stream)?;
        if body.is_empty() {
            log::trace!("empty negation ends at offset {}", body.end);
            return Ok(None);
        }

        let mut inner = self.tokenizer.tokenize_range(stream.source(), body)?;
        Ok(self
            .parse_expression(&mut inner, in_value_path)?
            .map(|node| Node::Negation(Negation::new(node))))
    }

    /// Consume `( ... )` and return the byte range between the parentheses
    fn enclosed(stream: &mut TokenStream<'_>) -> ParseResult<Range<usize>> {
        let open = stream.consume(&[TokenKind::ParenOpen])?;

        let mut depth = 1usize;
        let closing = stream.tokens()[stream.position()..]
            .iter()
            .position(|token| {
                match token.kind {
                    TokenKind::ParenOpen => depth += 1,
                    TokenKind::ParenClose => depth -= 1,
                    _ => {}
                }
                depth == 0
            })
            .ok_or(ParseError::UnexpectedEnd)?;

        stream.reset_to(stream.position() + closing);
        let close = stream.consume(&[TokenKind::ParenClose])?;

        Ok(open.end()..close.offset)
    }

    pub(crate) fn parse_attribute_path(stream: &mut TokenStream<'_>) -> ParseResult<AttributePath> {
        let name = stream.consume(&[TokenKind::Name])?;
        Ok(AttributePath::from_name(name.text))
    }

    /// `[ expression ]` following a single-name attribute path
    ///
    /// The predicate is rewritten so every comparison in it is rooted at
    /// `attribute_path`. A predicate that is empty or holds anything but
    /// comparisons, negations and connectives is reported at the opening
    /// bracket.
    pub(crate) fn parse_value_path(
        &self,
        stream: &mut TokenStream<'_>,
        attribute_path: AttributePath,
    ) -> ParseResult<ValuePath> {
        let bracket = stream.position();
        stream.consume(&[TokenKind::BracketOpen])?;

        let predicate = self.parse_expression(stream, true)?;
        stream.consume(&[TokenKind::BracketClose])?;

        let Some(predicate) = predicate.and_then(|node| node.rooted_at(&attribute_path)) else {
            log::debug!("value path `{attribute_path}` has no valid predicate");
            stream.reset_to(bracket + 1);
            return Err(stream.invalid_value_path());
        };

        Ok(ValuePath::new(attribute_path, predicate))
    }

    /// Operator and value following an attribute path
    fn parse_comparison(
        stream: &mut TokenStream<'_>,
        attribute_path: AttributePath,
    ) -> ParseResult<Comparison> {
        let operator_token = stream.consume(&[TokenKind::ComparisonOperator])?;
        let operator: Operator = operator_token
            .trimmed()
            .parse()
            .map_err(|_| stream.unexpected_at(&operator_token))?;

        if operator.is_unary() {
            return Ok(Comparison::present(attribute_path));
        }

        let literal = stream.consume(&TokenKind::LITERALS)?;
        let value = Self::literal_value(&literal).ok_or_else(|| stream.unexpected_at(&literal))?;

        Ok(Comparison::new(attribute_path, operator, Some(value)))
    }

    fn literal_value(token: &Token<'_>) -> Option<Value> {
        match token.kind {
            TokenKind::String => Some(Value::String(
                token.text[1..token.text.len() - 1].to_owned(),
            )),
            TokenKind::Number => Value::from_number(token.text),
            TokenKind::Boolean => Some(Value::Boolean(token.text.eq_ignore_ascii_case("true"))),
            TokenKind::Null => Some(Value::Null),
            _ => None,
        }
    }

    /// `and`/`or` followed by the right-hand operand
    fn parse_connective(
        &self,
        stream: &mut TokenStream<'_>,
        left: Node,
        in_value_path: bool,
    ) -> ParseResult<Node> {
        let keyword_index = stream.position();
        let keyword = stream.consume(&[TokenKind::LogicalOperator])?;
        let operator: LogicalOperator = keyword
            .trimmed()
            .parse()
            .map_err(|_| stream.unexpected_at(&keyword))?;

        let Some(right) = self.parse_expression(stream, in_value_path)? else {
            log::debug!("`{}` at offset {} has no right operand", operator, keyword.offset);
            stream.reset_to(keyword_index + 2);
            return Err(stream.unexpected());
        };

        Ok(Node::join(operator, left, right))
    }
}
