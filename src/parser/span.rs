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

//! Source location tracking for parser

use std::fmt;

/// A position in the source text expressed as line, column and byte offset
///
/// Lines and columns are 1-based. Columns count characters, not bytes, so
/// multi-byte input reports the column a reader would see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Byte offset from start of input
    pub position: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub const fn new(line: usize, column: usize, position: usize) -> Self {
        Self {
            line,
            column,
            position,
        }
    }

    /// Locate a byte offset within `source`
    ///
    /// Offsets past the end of the input clamp to the end, and offsets that
    /// fall inside a multi-byte character are rounded down to its start.
    pub fn locate(source: &str, position: usize) -> Self {
        let mut position = position.min(source.len());
        while !source.is_char_boundary(position) {
            position -= 1;
        }

        let consumed = &source[..position];
        let line_start = consumed.rfind('\n').map_or(0, |index| index + 1);

        Self {
            line: consumed.matches('\n').count() + 1,
            column: consumed[line_start..].chars().count() + 1,
            position,
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_single_line() {
        let location = SourceLocation::locate(r#"userName eq "bjensen""#, 8);
        assert_eq!(location, SourceLocation::new(1, 9, 8));
        assert_eq!(location.to_string(), "line 1, column 9");
    }

    #[test]
    fn test_locate_after_newline() {
        let source = "title pr\nand userType eq \"Employee\"";
        let location = SourceLocation::locate(source, 13);
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 5);
    }

    #[test]
    fn test_locate_counts_characters() {
        let source = "displayName eq \"Zoë\" and";
        let location = SourceLocation::locate(source, source.len());
        assert_eq!(location.column, source.chars().count() + 1);
    }

    #[test]
    fn test_locate_clamps_offset() {
        let location = SourceLocation::locate("abc", 42);
        assert_eq!(location, SourceLocation::new(1, 4, 3));
        assert_eq!(SourceLocation::locate("", 0), SourceLocation::default());
    }
}
