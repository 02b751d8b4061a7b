//! Schema validator implementation.
//!
//! Provides the default implementation of the [`RequestValidator`] port,
//! checking calls and outcomes against the static method table.

use crate::request::{
    domain::{ErrorCode, NormalizedError, RequestFailure, RequestMethod, ValueShape},
    ports::{RequestValidator, ValidationConfig, ValidationResult},
};
use serde_json::Value;

/// Default implementation of the request validator.
///
/// # Examples
///
/// ```
/// use credential_liaison::request::domain::{ManagerMethod, RequestMethod};
/// use credential_liaison::request::ports::RequestValidator;
/// use credential_liaison::request::validation::SchemaValidator;
/// use serde_json::json;
///
/// let validator = SchemaValidator::new();
/// let method = RequestMethod::Manager(ManagerMethod::GetSigningKey);
/// assert!(validator.validate_arguments(method, &[json!("https://example.com")]).is_ok());
/// assert!(validator.validate_arguments(method, &[json!(42)]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    config: ValidationConfig,
}

impl SchemaValidator {
    /// Creates a new validator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new validator with custom configuration.
    #[must_use]
    pub const fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Returns the current validation configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    fn check_arity(&self, method: RequestMethod, args: &[Value]) -> ValidationResult {
        let signature = method.signature();
        let required = signature.required_params();
        if args.len() < required {
            return Err(NormalizedError::validation_failure(format!(
                "{method} expects at least {required} argument(s), got {}",
                args.len()
            )));
        }
        if args.len() > signature.params.len() && !self.config.allow_trailing_arguments {
            return Err(NormalizedError::validation_failure(format!(
                "{method} expects at most {} argument(s), got {}",
                signature.params.len(),
                args.len()
            )));
        }
        Ok(())
    }

    fn check_payload_size(&self, method: RequestMethod, args: &[Value]) -> ValidationResult {
        let size = serde_json::to_vec(args)
            .map_err(|err| {
                NormalizedError::validation_failure(format!(
                    "arguments of {method} are not serialisable: {err}"
                ))
            })?
            .len();
        if size > self.config.max_argument_bytes {
            return Err(NormalizedError::validation_failure(format!(
                "arguments of {method} are {size} bytes, exceeding the limit of {} bytes",
                self.config.max_argument_bytes
            )));
        }
        Ok(())
    }
}

impl RequestValidator for SchemaValidator {
    fn validate_arguments(&self, method: RequestMethod, args: &[Value]) -> ValidationResult {
        self.check_arity(method, args)?;
        for (param, value) in method.signature().params.iter().zip(args) {
            if !param.accepts(value) {
                return Err(NormalizedError::validation_failure(format!(
                    "argument '{}' of {method} must be {}, got {}",
                    param.name,
                    param.shape,
                    ValueShape::of(value)
                )));
            }
        }
        self.check_payload_size(method, args)
    }

    fn validate_result(&self, method: RequestMethod, value: &Value) -> ValidationResult {
        if !self.config.validate_results {
            return Ok(());
        }
        let expected = method.signature().result;
        if expected.accepts(value) {
            Ok(())
        } else {
            Err(NormalizedError::validation_failure(format!(
                "result of {method} must be {expected}, got {}",
                ValueShape::of(value)
            )))
        }
    }

    fn validate_rejection(
        &self,
        method: RequestMethod,
        failure: &RequestFailure,
    ) -> ValidationResult {
        let Some(error) = failure.as_normalized() else {
            return Ok(());
        };
        if error.code() == ErrorCode::SequencingViolation {
            return Err(NormalizedError::validation_failure(format!(
                "backend rejected {method} with the reserved code {}",
                error.code()
            )));
        }
        if error.message().trim().is_empty() {
            return Err(NormalizedError::validation_failure(format!(
                "backend rejected {method} without an error message"
            )));
        }
        Ok(())
    }
}
