//! Identifier type for registered backends.

use super::ManagerDomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique, immutable identifier of a registered backend.
///
/// Identifiers are chosen by whoever registers the backend (for example
/// `builtin` or an extension id) and are used verbatim as routing keys, so
/// unlike labels they are not normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackendId(String);

impl BackendId {
    /// Creates a validated backend identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerDomainError::EmptyId`] when the value is empty, or
    /// [`ManagerDomainError::IdContainsWhitespace`] when it contains any
    /// whitespace character.
    pub fn new(value: impl Into<String>) -> Result<Self, ManagerDomainError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(ManagerDomainError::EmptyId);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(ManagerDomainError::IdContainsWhitespace(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BackendId {
    type Error = ManagerDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BackendId> for String {
    fn from(id: BackendId) -> Self {
        id.0
    }
}

impl AsRef<str> for BackendId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for BackendId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
