//! Error types for manager registration input.

use thiserror::Error;

/// Errors returned while validating manager registration fields.
///
/// Every variant names the offending field and carries its value as given.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManagerDomainError {
    /// The backend identifier is empty.
    #[error("invalid id '': backend id must not be empty")]
    EmptyId,

    /// The backend identifier contains whitespace.
    #[error("invalid id '{0}': backend id must not contain whitespace")]
    IdContainsWhitespace(String),

    /// The label is empty after trimming.
    #[error("invalid label '{0}': label must not be empty")]
    EmptyLabel(String),

    /// The kind is neither `native` nor `external`.
    #[error("invalid kind '{0}': expected 'native' or 'external'")]
    UnknownKind(String),
}

impl ManagerDomainError {
    /// Returns the name of the field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::IdContainsWhitespace(_) => "id",
            Self::EmptyLabel(_) => "label",
            Self::UnknownKind(_) => "kind",
        }
    }

    /// Returns the rejected value as given.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::EmptyId => "",
            Self::IdContainsWhitespace(value)
            | Self::EmptyLabel(value)
            | Self::UnknownKind(value) => value,
        }
    }
}
