//! Validated display label type.

use super::ManagerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable backend label, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendLabel(String);

impl BackendLabel {
    /// Creates a validated label.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerDomainError::EmptyLabel`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ManagerDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ManagerDomainError::EmptyLabel(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BackendLabel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BackendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
