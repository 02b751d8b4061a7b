//! Validator port for the pipeline's validation layer.
//!
//! Defines the hook points consulted before a call reaches a backend and
//! before its outcome leaves the backend.

use crate::request::domain::{NormalizedError, RequestFailure, RequestMethod};
use serde_json::Value;

/// Result type for validation hooks.
pub type ValidationResult = Result<(), NormalizedError>;

/// Port for schema validation of inbound arguments and outbound outcomes.
///
/// Every hook returns a `validation-failure` error on mismatch. The
/// validation layer then short-circuits: the backend is not invoked for a
/// failed pre-call check, and the caller never sees a value or error that
/// failed an outbound check.
///
/// # Implementation Notes
///
/// Implementations should be stateless and thread-safe; one validator is
/// shared by every backend pipeline of a registry.
#[cfg_attr(test, mockall::automock)]
pub trait RequestValidator: Send + Sync {
    /// Pre-call hook: checks the positional arguments of `method`.
    ///
    /// # Errors
    ///
    /// Returns a `validation-failure` error when the arguments do not match
    /// the declared parameters.
    fn validate_arguments(&self, method: RequestMethod, args: &[Value]) -> ValidationResult;

    /// Pre-resolve hook: checks a value a backend resolved with.
    ///
    /// # Errors
    ///
    /// Returns a `validation-failure` error when the value does not match the
    /// declared result shape.
    fn validate_result(&self, method: RequestMethod, value: &Value) -> ValidationResult;

    /// Pre-reject hook: checks an error a backend rejected with.
    ///
    /// # Errors
    ///
    /// Returns a `validation-failure` error when the rejection does not match
    /// the declared error shape.
    fn validate_rejection(&self, method: RequestMethod, failure: &RequestFailure)
    -> ValidationResult;
}

/// Configuration for schema validation rules.
///
/// # Examples
///
/// ```
/// use credential_liaison::request::ports::ValidationConfig;
///
/// let config = ValidationConfig::default();
/// assert!(!config.allow_trailing_arguments);
///
/// let lenient = ValidationConfig::lenient();
/// assert!(lenient.allow_trailing_arguments);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Maximum serialised size of a call's arguments in bytes.
    pub max_argument_bytes: usize,
    /// Whether arguments beyond the declared parameters are ignored.
    pub allow_trailing_arguments: bool,
    /// Whether resolved values are checked against the result shape.
    pub validate_results: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_argument_bytes: 64 * 1024, // 64 KiB
            allow_trailing_arguments: false,
            validate_results: true,
        }
    }
}

impl ValidationConfig {
    /// Creates a lenient configuration that tolerates trailing arguments.
    ///
    /// Useful when callers are built against a newer schema revision.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            allow_trailing_arguments: true,
            ..Default::default()
        }
    }

    /// Creates a strict configuration with a reduced payload limit.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_argument_bytes: 8 * 1024, // 8 KiB
            allow_trailing_arguments: false,
            validate_results: true,
        }
    }
}
