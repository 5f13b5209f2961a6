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

//! Regex-driven scanner for SCIM filter and path expressions
//!
//! At every position the scanner tries a fixed, ordered table of
//! case-insensitive patterns anchored at that position. The first pattern
//! that matches produces the next token, so the order of [`PATTERNS`] is
//! significant: literals win over names, and logical operators are tried
//! before comparison operators because both consume surrounding whitespace.
//!
//! Whitespace is never skipped on its own. It belongs to the operator
//! tokens (`" eq "`, `" and "`, `"not "`), which is why a stray space
//! anywhere else is a scan error.

use super::ParserMode;
use super::lexer::TokenStream;
use super::span::SourceLocation;
use crate::error::{ParseError, ParseResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// Integer or decimal number: `42`, `4.5`
    Number,
    /// Double-quoted string without escapes: `"bjensen"`
    String,
    /// `true` or `false`
    Boolean,
    /// `null`
    Null,
    /// `(`
    ParenOpen,
    /// `)`
    ParenClose,
    /// `[`
    BracketOpen,
    /// `]`
    BracketClose,
    /// `not` followed by whitespace
    Negation,
    /// `and` or `or` surrounded by whitespace
    LogicalOperator,
    /// Binary comparison operator surrounded by whitespace, or ` pr`
    ComparisonOperator,
    /// Attribute name, optionally schema-qualified and with one sub-attribute
    Name,
    /// Trailing `.name` after a value path, path mode only
    SubAttribute,
}

impl TokenKind {
    /// Token kinds accepted as a comparison value
    pub const LITERALS: [TokenKind; 4] = [
        TokenKind::String,
        TokenKind::Number,
        TokenKind::Boolean,
        TokenKind::Null,
    ];

    /// Human readable name used in diagnostics
    pub const fn description(self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::ParenOpen => "opening parenthesis",
            TokenKind::ParenClose => "closing parenthesis",
            TokenKind::BracketOpen => "opening bracket",
            TokenKind::BracketClose => "closing bracket",
            TokenKind::Negation => "negation",
            TokenKind::LogicalOperator => "logical operator",
            TokenKind::ComparisonOperator => "comparison operator",
            TokenKind::Name => "attribute name",
            TokenKind::SubAttribute => "sub-attribute",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A scanned token borrowing its text from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'input> {
    /// Lexical category
    pub kind: TokenKind,
    /// Matched text, including any whitespace the pattern consumed
    pub text: &'input str,
    /// Byte offset of the first matched character in the original input
    pub offset: usize,
}

impl<'input> Token<'input> {
    /// Create a new token
    pub const fn new(kind: TokenKind, text: &'input str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    /// Byte offset just past the token
    pub const fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Token text without surrounding whitespace
    pub fn trimmed(&self) -> &'input str {
        self.text.trim()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// Scanner patterns in priority order
///
/// Keyword patterns end in a word boundary so attribute names such as
/// `trueValue`, `nullable` or `primary` still scan as names.
const PATTERNS: &[(TokenKind, &str)] = &[
    (TokenKind::Number, r"[0-9]+(?:\.[0-9]+)?"),
    (TokenKind::String, r#""[^"]*""#),
    (TokenKind::Boolean, r"(?:true|false)\b"),
    (TokenKind::Null, r"null\b"),
    (TokenKind::ParenOpen, r"\("),
    (TokenKind::ParenClose, r"\)"),
    (TokenKind::BracketOpen, r"\["),
    (TokenKind::BracketClose, r"\]"),
    (TokenKind::Negation, r"not\s+"),
    (TokenKind::LogicalOperator, r"\s+(?:and|or)\s+"),
    (TokenKind::ComparisonOperator, r"\s(?:(?:eq|ne|co|sw|ew|gt|lt|ge|le)\s+|pr\b)"),
    (TokenKind::Name, r#"(?:[^"\s()\[\]]+:)*[-_a-z0-9]+(?:\.[-_a-z0-9]+)?"#),
];

/// Only matches when it runs to the end of the scanned range
const SUB_ATTRIBUTE_PATTERN: (TokenKind, &str) = (TokenKind::SubAttribute, r"\.[-_a-z0-9]+$");

/// Longest input fragment quoted in an unrecognized-input error
const FRAGMENT_LENGTH: usize = 10;

#[derive(Debug)]
struct Pattern {
    kind: TokenKind,
    regex: Regex,
}

fn compile<'a>(patterns: impl IntoIterator<Item = &'a (TokenKind, &'static str)>) -> Vec<Pattern> {
    patterns
        .into_iter()
        .map(|&(kind, pattern)| Pattern {
            kind,
            regex: Regex::new(&format!("^(?i:{pattern})"))
                .expect("scanner patterns are valid regular expressions"),
        })
        .collect()
}

static FILTER_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| compile(PATTERNS));

static PATH_PATTERNS: Lazy<Vec<Pattern>> =
    Lazy::new(|| compile(PATTERNS.iter().chain(std::iter::once(&SUB_ATTRIBUTE_PATTERN))));

/// Turns expression text into a [`TokenStream`]
///
/// The tokenizer holds no state besides its mode, so one instance can be
/// shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    mode: ParserMode,
}

impl Tokenizer {
    /// Create a tokenizer for the given mode
    pub const fn new(mode: ParserMode) -> Self {
        Self { mode }
    }

    /// Scan the whole input
    pub fn tokenize<'input>(&self, input: &'input str) -> ParseResult<TokenStream<'input>> {
        self.tokenize_range(input, 0..input.len())
    }

    /// Scan part of `source`, keeping token offsets relative to all of it
    ///
    /// Used for parenthesized bodies so errors inside a group still report
    /// coordinates in the caller's input. `range` must lie on token
    /// boundaries of a previous scan of the same source.
    pub(crate) fn tokenize_range<'input>(
        &self,
        source: &'input str,
        range: Range<usize>,
    ) -> ParseResult<TokenStream<'input>> {
        let patterns = match self.mode {
            ParserMode::Filter => &*FILTER_PATTERNS,
            ParserMode::Path => &*PATH_PATTERNS,
        };

        let mut tokens = Vec::new();
        let mut offset = range.start;

        while offset < range.end {
            let rest = &source[offset..range.end];
            let token = patterns.iter().find_map(|pattern| {
                pattern
                    .regex
                    .find(rest)
                    .filter(|found| !found.is_empty())
                    .map(|found| Token::new(pattern.kind, &rest[..found.end()], offset))
            });

            let Some(token) = token else {
                log::trace!("no token pattern matches at offset {offset} of {source:?}");
                return Err(ParseError::UnrecognizedInput {
                    fragment: rest.chars().take(FRAGMENT_LENGTH).collect(),
                    location: SourceLocation::locate(source, offset),
                });
            };

            offset = token.end();
            tokens.push(token);
        }

        log::trace!(
            "scanned {} {} tokens from {:?}",
            tokens.len(),
            self.mode,
            &source[range]
        );

        Ok(TokenStream::new(source, tokens))
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(ParserMode::Filter)
    }
}
