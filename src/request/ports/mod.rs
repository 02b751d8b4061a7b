//! Port contracts for request validation.

pub mod validator;

#[cfg(test)]
pub use validator::MockRequestValidator;
pub use validator::{RequestValidator, ValidationConfig, ValidationResult};
