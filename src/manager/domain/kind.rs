//! Backend origin kind.

use super::ManagerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a backend implementation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Shipped with the application core.
    Native,
    /// Provided by a third party, such as an extension.
    External,
}

impl BackendKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::External => "external",
        }
    }
}

impl TryFrom<&str> for BackendKind {
    type Error = ManagerDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "native" => Ok(Self::Native),
            "external" => Ok(Self::External),
            _ => Err(ManagerDomainError::UnknownKind(value.to_owned())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
