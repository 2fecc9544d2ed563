use thiserror::Error;

/// Errors raised by config variables and environment lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ConfigVar '{name}' unexpected type: '{found}' - Expected: '{expected}'")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },
    #[error("ConfigVar '{name}' failed validation for reason: '{reason}'")]
    Validation { name: String, reason: String },
    #[error("ConfigVar '{name}' is immutable")]
    Immutable { name: String },
    #[error("Error retrieving env var with key: '{key}' - {message}")]
    EnvVar { key: String, message: String },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
