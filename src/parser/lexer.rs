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

//! Token stream consumed by the grammar

use super::span::SourceLocation;
use super::tokenizer::{Token, TokenKind};
use crate::error::ParseError;

/// Ordered tokens of one scan with a cursor
///
/// The stream remembers the source it was scanned from so that any token
/// can be turned into a line and column for diagnostics. Streams for
/// parenthesized bodies share the caller's source and keep absolute offsets.
#[derive(Debug, Clone)]
pub struct TokenStream<'input> {
    source: &'input str,
    tokens: Vec<Token<'input>>,
    position: usize,
}

impl<'input> TokenStream<'input> {
    /// Create a new token stream positioned before the first token
    pub fn new(source: &'input str, tokens: Vec<Token<'input>>) -> Self {
        Self {
            source,
            tokens,
            position: 0,
        }
    }

    /// Input the tokens were scanned from
    pub fn source(&self) -> &'input str {
        self.source
    }

    /// All tokens, consumed or not
    pub fn tokens(&self) -> &[Token<'input>] {
        &self.tokens
    }

    /// Index of the next token to be consumed
    pub fn position(&self) -> usize {
        self.position
    }

    /// Reset to a previous position
    pub fn reset_to(&mut self, position: usize) {
        self.position = position.min(self.tokens.len());
    }

    /// Peek at the next token without consuming
    pub fn peek(&self) -> Option<&Token<'input>> {
        self.tokens.get(self.position)
    }

    /// Most recently consumed token
    pub fn current(&self) -> Option<&Token<'input>> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
    }

    /// Whether any tokens remain
    pub fn has_next(&self) -> bool {
        self.position < self.tokens.len()
    }

    /// Whether the next token has one of the given kinds
    pub fn is_next(&self, kinds: &[TokenKind]) -> bool {
        self.peek().is_some_and(|token| kinds.contains(&token.kind))
    }

    /// Consume and return the next token
    pub fn advance(&mut self) -> Option<Token<'input>> {
        let token = self.peek().copied()?;
        self.position += 1;
        Some(token)
    }

    /// Consume the next token, which must have one of the given kinds
    ///
    /// The cursor does not move when the token does not match.
    pub fn consume(&mut self, kinds: &[TokenKind]) -> Result<Token<'input>, ParseError> {
        match self.peek().copied() {
            Some(token) if kinds.contains(&token.kind) => {
                self.position += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::TokenMismatch {
                token: token.text.to_owned(),
                kind: token.kind,
                expected: kinds.to_vec(),
                location: self.location_of(&token),
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// Line and column of a token
    pub fn location_of(&self, token: &Token<'_>) -> SourceLocation {
        SourceLocation::locate(self.source, token.offset)
    }

    /// Error pointing at the most recently consumed token
    ///
    /// When nothing has been consumed yet the first token is reported
    /// instead, and an empty stream yields [`ParseError::EmptyInput`].
    pub fn unexpected(&mut self) -> ParseError {
        if self.position == 0 {
            self.advance();
        }

        match self.current() {
            Some(token) => self.unexpected_at(token),
            None => ParseError::EmptyInput,
        }
    }

    /// Error pointing at the next, unconsumed token
    pub fn unexpected_next(&self) -> ParseError {
        match self.peek() {
            Some(token) => self.unexpected_at(token),
            None => ParseError::UnexpectedEnd,
        }
    }

    /// Error pointing at the given token
    pub fn unexpected_at(&self, token: &Token<'_>) -> ParseError {
        ParseError::UnexpectedToken {
            token: token.text.to_owned(),
            kind: token.kind,
            location: self.location_of(token),
        }
    }

    /// Invalid value path error anchored at the most recently consumed token
    pub fn invalid_value_path(&self) -> ParseError {
        match self.current() {
            Some(token) => ParseError::InvalidValuePath {
                token: token.text.to_owned(),
                location: self.location_of(token),
            },
            None => ParseError::EmptyInput,
        }
    }

    /// Error for a path expression that does not start with a name
    pub fn expected_path(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::ExpectedPath {
                token: token.text.to_owned(),
                kind: token.kind,
                location: self.location_of(token),
            },
            None => ParseError::EmptyInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserMode;
    use crate::parser::tokenizer::Tokenizer;

    fn stream(input: &str) -> TokenStream<'_> {
        Tokenizer::new(ParserMode::Filter).tokenize(input).unwrap()
    }

    #[test]
    fn test_stream_navigation() {
        let mut stream = stream("title pr and active eq true");

        assert!(stream.is_next(&[TokenKind::Name]));
        assert!(stream.current().is_none());

        let name = stream.advance().unwrap();
        assert_eq!(name.text, "title");
        assert_eq!(stream.current(), Some(&name));
        assert_eq!(stream.position(), 1);

        stream.reset_to(4);
        assert_eq!(stream.peek().map(|token| token.text), Some(" eq "));

        stream.reset_to(100);
        assert!(!stream.has_next());
        assert!(stream.advance().is_none());
    }

    #[test]
    fn test_consume_mismatch_keeps_position() {
        let mut stream = stream("title and active");

        stream.consume(&[TokenKind::Name]).unwrap();
        let error = stream.consume(&[TokenKind::ComparisonOperator]).unwrap_err();

        assert_eq!(error.to_string(), "Unexpected \"and\" on line 1, column 6.");
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn test_consume_past_end() {
        let mut stream = stream("title");
        stream.advance();
        assert_eq!(
            stream.consume(&[TokenKind::ComparisonOperator]),
            Err(ParseError::UnexpectedEnd)
        );
    }

    #[test]
    fn test_unexpected_reports_first_token_before_consuming() {
        let mut stream = stream(r#" and userName eq "foobar""#);
        assert_eq!(
            stream.unexpected().to_string(),
            "Unexpected  and  on line 1, column 1."
        );
    }

    #[test]
    fn test_unexpected_on_empty_stream() {
        let mut stream = stream("");
        assert_eq!(stream.unexpected(), ParseError::EmptyInput);
        assert_eq!(stream.unexpected_next(), ParseError::UnexpectedEnd);
        assert_eq!(stream.expected_path(), ParseError::EmptyInput);
    }

    #[test]
    fn test_unexpected_next() {
        let mut stream = stream(r#"userName eq "foobar""#);
        stream.advance();
        assert_eq!(
            stream.unexpected_next().to_string(),
            "Unexpected  eq  on line 1, column 9."
        );
    }
}
