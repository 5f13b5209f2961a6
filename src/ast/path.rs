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

//! Attribute paths

use smallvec::SmallVec;
use std::fmt;
use std::ops::Index;
use thiserror::Error;

/// Error returned when building an attribute path without any names
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Attribute path should contain at least one attribute name.")]
pub struct EmptyAttributePath;

/// Reference to an attribute, optionally qualified by a schema URN
///
/// `urn:ietf:params:scim:schemas:core:2.0:User:name.givenName` has the
/// schema `urn:ietf:params:scim:schemas:core:2.0:User` and the names
/// `name` and `givenName`. A path always holds at least one name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "repr::AttributePathRepr")
)]
pub struct AttributePath {
    schema: Option<String>,
    names: SmallVec<[String; 2]>,
}

impl AttributePath {
    /// Create a path from an optional schema and a non-empty list of names
    pub fn new<I, S>(schema: Option<String>, names: I) -> Result<Self, EmptyAttributePath>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: SmallVec<[String; 2]> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(EmptyAttributePath);
        }
        Ok(Self { schema, names })
    }

    /// Split the text of a name token into schema and names
    ///
    /// Everything before the last colon is the schema. Name tokens always
    /// end in at least one name character, so the result is never empty.
    pub(crate) fn from_name(text: &str) -> Self {
        let (schema, dotted) = match text.rfind(':') {
            Some(index) => (Some(text[..index].to_owned()), &text[index + 1..]),
            None => (None, text),
        };

        Self {
            schema,
            names: dotted.split('.').map(str::to_owned).collect(),
        }
    }

    /// Schema URN, if the path is qualified
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Attribute names from outermost to innermost
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Dotted names without the schema, e.g. `name.givenName`
    pub fn path(&self) -> String {
        self.names.join(".")
    }

    /// Number of names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`, a path holds at least one name
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Outermost attribute name
    pub fn first(&self) -> &str {
        &self.names[0]
    }

    /// Innermost attribute name
    pub fn last(&self) -> &str {
        &self.names[self.names.len() - 1]
    }

    /// Name at `index`, if present
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Iterate over the names
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }

    /// This path nested under `prefix`
    ///
    /// The result takes the schema of `prefix` and the names of `prefix`
    /// followed by the names of `self`.
    pub fn prefixed_by(&self, prefix: &AttributePath) -> AttributePath {
        AttributePath {
            schema: prefix.schema.clone(),
            names: prefix.names.iter().chain(&self.names).cloned().collect(),
        }
    }

    /// This path with one more name appended
    pub fn join(&self, name: impl Into<String>) -> AttributePath {
        let mut names = self.names.clone();
        names.push(name.into());
        AttributePath {
            schema: self.schema.clone(),
            names,
        }
    }

    /// The names below `prefix`, when this path is strictly nested under it
    pub fn relative_to(&self, prefix: &AttributePath) -> Option<AttributePath> {
        if self.schema != prefix.schema
            || self.names.len() <= prefix.names.len()
            || !self.names.starts_with(&prefix.names)
        {
            return None;
        }

        Some(AttributePath {
            schema: None,
            names: self.names[prefix.names.len()..].iter().cloned().collect(),
        })
    }

    /// Whether both paths name the same attribute, ignoring case
    ///
    /// Attribute names and schema URNs are case-insensitive in SCIM.
    pub fn matches(&self, other: &AttributePath) -> bool {
        let schema_matches = match (&self.schema, &other.schema) {
            (Some(left), Some(right)) => left.eq_ignore_ascii_case(right),
            (None, None) => true,
            _ => false,
        };

        schema_matches
            && self.names.len() == other.names.len()
            && self
                .names
                .iter()
                .zip(&other.names)
                .all(|(left, right)| left.eq_ignore_ascii_case(right))
    }
}

impl Index<usize> for AttributePath {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.names[index]
    }
}

impl<'a> IntoIterator for &'a AttributePath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}:")?;
        }
        f.write_str(&self.path())
    }
}

#[cfg(feature = "serde")]
mod repr {
    use super::{AttributePath, EmptyAttributePath};

    #[derive(serde::Deserialize)]
    pub(super) struct AttributePathRepr {
        #[serde(default)]
        schema: Option<String>,
        names: Vec<String>,
    }

    impl TryFrom<AttributePathRepr> for AttributePath {
        type Error = EmptyAttributePath;

        fn try_from(repr: AttributePathRepr) -> Result<Self, Self::Error> {
            AttributePath::new(repr.schema, repr.names)
        }
    }
}
