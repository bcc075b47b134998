//! Error types for the shaker CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for shaker operations.
///
/// Each variant maps to a specific exit code. Recoverable conditions
/// (profile parse failures, catalog misses for an explicit distro) never
/// surface here: they are logged and resolution continues with a defined
/// fallback. Only terminal conditions become a `ShakerError`.
#[derive(Error, Debug)]
pub enum ShakerError {
    /// User provided invalid arguments or the config directory is unusable.
    #[error("{0}")]
    UserError(String),

    /// The resolved configuration failed a launch-gating check.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// A user-data document could not be rendered.
    #[error("Template rendering failed: {0}")]
    TemplateError(String),

    /// A cloud provider call failed or the instance never became ready.
    #[error("Provider operation failed: {0}")]
    ProviderError(String),
}

impl ShakerError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShakerError::UserError(_) => exit_codes::USER_ERROR,
            ShakerError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            ShakerError::TemplateError(_) => exit_codes::TEMPLATE_FAILURE,
            ShakerError::ProviderError(_) => exit_codes::PROVIDER_FAILURE,
        }
    }
}

/// Result type alias for shaker operations.
pub type Result<T> = std::result::Result<T, ShakerError>;
