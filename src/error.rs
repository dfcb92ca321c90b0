//! Custom error types for depmend with improved type safety and error handling.

use thiserror::Error;

/// Main error type for depmend operations.
#[derive(Error, Debug)]
pub enum DepmendError {
    // Configuration errors
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    // Manifest errors
    #[error("Manifest file not found: {0}")]
    ManifestNotFound(String),

    #[error("{0} parsing not yet implemented")]
    NotImplemented(String),

    #[error("Updated content for {0} failed validation")]
    ValidationFailed(String),

    // Subprocess errors
    #[error("Command `{command}` failed ({status}): {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    // Remediation API errors
    #[error("API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },
}

impl DepmendError {
    /// Create a missing environment variable error
    pub fn missing_env(name: impl Into<String>) -> Self {
        Self::MissingEnv(name.into())
    }

    /// Create a manifest not found error
    pub fn manifest_not_found(path: impl Into<String>) -> Self {
        Self::ManifestNotFound(path.into())
    }

    /// Create a not implemented error for an unsupported lockfile format
    pub fn not_implemented(name: impl Into<String>) -> Self {
        Self::NotImplemented(name.into())
    }

    /// Create a validation failure error
    pub fn validation_failed(path: impl Into<String>) -> Self {
        Self::ValidationFailed(path.into())
    }

    /// Create a command failure error from a finished process
    pub fn command_failed(
        command: impl Into<String>,
        status: std::process::ExitStatus,
        output: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status: status.to_string(),
            output: output.into(),
        }
    }
}
