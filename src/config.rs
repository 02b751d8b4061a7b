//! Registry configuration.

use crate::request::ports::ValidationConfig;

/// Identifier under which the built-in backend is registered by default.
pub const DEFAULT_BUILTIN_ID: &str = "builtin";

/// Label of the built-in backend by default.
pub const DEFAULT_BUILTIN_LABEL: &str = "Built-in credential manager";

/// Construction-time settings of a [`Liaison`](crate::manager::services::Liaison).
///
/// # Examples
///
/// ```
/// use credential_liaison::config::LiaisonConfig;
/// use credential_liaison::request::ports::ValidationConfig;
///
/// let config = LiaisonConfig::default()
///     .with_builtin("local", "Local vault")
///     .with_validation(ValidationConfig::strict());
/// assert_eq!(config.builtin_id, "local");
/// assert_eq!(config.validation.max_argument_bytes, 8 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiaisonConfig {
    /// Identifier of the built-in backend.
    pub builtin_id: String,
    /// Display label of the built-in backend.
    pub builtin_label: String,
    /// Rules applied by the default schema validator.
    pub validation: ValidationConfig,
}

impl Default for LiaisonConfig {
    fn default() -> Self {
        Self {
            builtin_id: DEFAULT_BUILTIN_ID.to_owned(),
            builtin_label: DEFAULT_BUILTIN_LABEL.to_owned(),
            validation: ValidationConfig::default(),
        }
    }
}

impl LiaisonConfig {
    /// Overrides the identity of the built-in backend.
    #[must_use]
    pub fn with_builtin(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.builtin_id = id.into();
        self.builtin_label = label.into();
        self
    }

    /// Overrides the validation rules.
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }
}
