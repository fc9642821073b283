//! Identifier types used throughout the launcher core.
//!
//! Applications are keyed by their platform package name, which is stable
//! across catalog reloads and is the only key persisted in the sets.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Stable unique identifier of an installed application (a package name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Creates an identifier without validation.
    ///
    /// Persisted payloads are trusted as-is; use [`AppId::parse`] for user input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses an identifier, rejecting empty or whitespace-only input.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(Error::InvalidAppId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AppId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Borrow<str> for AppId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
