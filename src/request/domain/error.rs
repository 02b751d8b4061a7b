//! Error contract shared by the request pipeline and the boundary adapter.
//!
//! [`NormalizedError`] is the only error shape allowed to cross the trust
//! boundary. In-process callers receive a [`RequestFailure`], which may also
//! carry an opaque backend error that the boundary adapter later replaces.

use super::RequestId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

const SEQUENCING_VIOLATION_MESSAGE: &str = "an existing request is still pending";
const UNEXPECTED_EXCEPTION_MESSAGE: &str = "the backend raised an unexpected exception";
const ABANDONED_MESSAGE: &str =
    "unexpected exception: the backend released the request without responding";
const TRANSPORT_FAILURE_MESSAGE: &str = "the outcome could not be transported across the boundary";

/// Closed set of failure categories visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// A value or error could not cross the boundary.
    TransportFailure,
    /// A second request arrived while another was still in flight.
    SequencingViolation,
    /// The backend failed without completing the request itself.
    UnexpectedException,
    /// Arguments, results, or errors did not match the declared schema.
    ValidationFailure,
    /// Any other failure reported by a backend.
    Unknown,
}

impl ErrorCode {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TransportFailure => "transport-failure",
            Self::SequencingViolation => "sequencing-violation",
            Self::UnexpectedException => "unexpected-exception",
            Self::ValidationFailure => "validation-failure",
            Self::Unknown => "unknown",
        }
    }

    /// Returns whether the caller may re-issue the request later.
    ///
    /// Only sequencing violations are retryable, once the prior request on
    /// the same backend has completed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::SequencingViolation)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform, boundary-safe error shape.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct NormalizedError {
    code: ErrorCode,
    message: String,
}

impl NormalizedError {
    /// Creates an error with an explicit code and message.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The fixed error reported to a caller whose backend is busy.
    #[must_use]
    pub fn sequencing_violation() -> Self {
        Self::new(ErrorCode::SequencingViolation, SEQUENCING_VIOLATION_MESSAGE)
    }

    /// The generic, non-leaking error reported when a backend fails.
    #[must_use]
    pub fn unexpected_exception() -> Self {
        Self::new(ErrorCode::UnexpectedException, UNEXPECTED_EXCEPTION_MESSAGE)
    }

    /// Reported when every handle to an open request was dropped.
    #[must_use]
    pub fn abandoned() -> Self {
        Self::new(ErrorCode::UnexpectedException, ABANDONED_MESSAGE)
    }

    /// The fixed fallback used when an outcome cannot be transported.
    #[must_use]
    pub fn transport_failure() -> Self {
        Self::new(ErrorCode::TransportFailure, TRANSPORT_FAILURE_MESSAGE)
    }

    /// Creates a schema mismatch error.
    #[must_use]
    pub fn validation_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailure, message)
    }

    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure observed by an in-process caller of the public façade.
#[derive(Debug, Clone, Error)]
pub enum RequestFailure {
    /// A failure already in boundary-safe form.
    #[error(transparent)]
    Normalized(#[from] NormalizedError),

    /// An arbitrary error a backend rejected with.
    ///
    /// This variant has no transport representation; the boundary adapter
    /// replaces it with a `transport-failure` error.
    #[error("backend rejected the request: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl RequestFailure {
    /// Wraps an opaque backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }

    /// Returns the caller-visible error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Normalized(error) => error.code(),
            Self::Backend(_) => ErrorCode::Unknown,
        }
    }

    /// Returns the normalised error when this failure has one.
    #[must_use]
    pub const fn as_normalized(&self) -> Option<&NormalizedError> {
        match self {
            Self::Normalized(error) => Some(error),
            Self::Backend(_) => None,
        }
    }
}

/// Error returned when a response contract is completed more than once.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ContractError {
    /// The request was already resolved or rejected.
    #[error("request {0} has already been completed")]
    AlreadyCompleted(RequestId),
}

/// Error returned while parsing a request group name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown request group: {0}")]
pub struct ParseRequestGroupError(pub String);

/// Error returned while parsing a method name within a group.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{method}' is not a method of the '{group}' group")]
pub struct ParseRequestMethodError {
    /// Group the lookup was performed in.
    pub group: String,
    /// Method name that was not found.
    pub method: String,
}
