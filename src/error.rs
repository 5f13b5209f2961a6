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

//! Error types for SCIM filter and path parsing

use crate::parser::span::SourceLocation;
use crate::parser::tokenizer::TokenKind;
use thiserror::Error;

/// Result type used throughout the parser
pub type ParseResult<T> = Result<T, ParseError>;

/// Error raised while scanning or parsing an expression
///
/// The rendered messages are stable and meant to be shown to API clients,
/// so they quote the offending input and its 1-based line and column.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// No token pattern matches at the given position
    #[error("Unexpected '{fragment}' on {location}.")]
    UnrecognizedInput {
        /// Up to ten characters of the unmatched input
        fragment: String,
        /// Where scanning stopped
        location: SourceLocation,
    },

    /// A token was required but the input ran out
    #[error("Unexpected end of string.")]
    UnexpectedEnd,

    /// The next token is not one of the kinds the grammar required
    #[error("Unexpected \"{}\" on {location}.", .token.trim())]
    TokenMismatch {
        /// Raw text of the offending token
        token: String,
        /// Kind of the offending token
        kind: TokenKind,
        /// Kinds that would have been accepted
        expected: Vec<TokenKind>,
        /// Where the token starts
        location: SourceLocation,
    },

    /// A token appeared where the grammar does not allow it
    #[error("Unexpected {token} on {location}.")]
    UnexpectedToken {
        /// Raw text of the offending token
        token: String,
        /// Kind of the offending token
        kind: TokenKind,
        /// Where the token starts
        location: SourceLocation,
    },

    /// The input produced no tokens at all
    #[error("Unexpected value at line 1, column 1.")]
    EmptyInput,

    /// A value path predicate is empty or contains something other than
    /// comparisons, negations and connectives
    #[error("Unexpected {token} on {location}.")]
    InvalidValuePath {
        /// Raw text of the token the error is anchored at
        token: String,
        /// Where that token starts
        location: SourceLocation,
    },

    /// A path expression does not start with an attribute name
    #[error("Expected an attribute or value path, got \"{token}\".")]
    ExpectedPath {
        /// Raw text of the leading token
        token: String,
        /// Kind of the leading token
        kind: TokenKind,
        /// Where the token starts
        location: SourceLocation,
    },
}

impl ParseError {
    /// Source location the error points at, when it has one
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Self::UnrecognizedInput { location, .. }
            | Self::TokenMismatch { location, .. }
            | Self::UnexpectedToken { location, .. }
            | Self::InvalidValuePath { location, .. }
            | Self::ExpectedPath { location, .. } => Some(*location),
            Self::UnexpectedEnd | Self::EmptyInput => None,
        }
    }

    /// Text of the offending token or input fragment, when there is one
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::UnrecognizedInput { fragment, .. } => Some(fragment),
            Self::TokenMismatch { token, .. }
            | Self::UnexpectedToken { token, .. }
            | Self::InvalidValuePath { token, .. }
            | Self::ExpectedPath { token, .. } => Some(token),
            Self::UnexpectedEnd | Self::EmptyInput => None,
        }
    }

    /// Kind of the offending token, when the error refers to one
    pub fn token_kind(&self) -> Option<TokenKind> {
        match self {
            Self::TokenMismatch { kind, .. }
            | Self::UnexpectedToken { kind, .. }
            | Self::ExpectedPath { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the error was raised by the scanner rather than the grammar
    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::UnrecognizedInput { .. })
    }
}
