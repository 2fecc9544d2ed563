use std::path::Path;

use thiserror::Error;

/// Errors that can occur during datastore operations.
///
/// A missing key is never an error: reads resolve it to `None` or to the
/// caller-supplied default.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{operation} is not supported by the {destination} destination")]
    Unsupported {
        destination: &'static str,
        operation: &'static str,
    },
    #[error("I/O failure at '{path}': {message}")]
    Io { path: String, message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Remote operation failed: {0}")]
    Remote(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Builds an `Io` error for the given path.
    pub fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Returns true if this error is a programming-contract violation
    /// rather than a runtime failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result type for datastore operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_unsupported_display() {
        let error = StoreError::Unsupported {
            destination: "toml file",
            operation: "write_datum",
        };
        assert_eq!(
            error.to_string(),
            "write_datum is not supported by the toml file destination"
        );
        assert!(error.is_unsupported());
    }

    #[test]
    fn test_io_display() {
        let path = PathBuf::from("/tmp/kvsync/store.toml");
        let error = StoreError::io(&path, "permission denied");
        assert_eq!(
            error.to_string(),
            "I/O failure at '/tmp/kvsync/store.toml': permission denied"
        );
        assert!(!error.is_unsupported());
    }

    #[test]
    fn test_serialization_display() {
        let error = StoreError::Serialization("unexpected end of input".to_string());
        assert_eq!(
            error.to_string(),
            "Serialization error: unexpected end of input"
        );
    }

    #[test]
    fn test_connection_failed_display() {
        let error = StoreError::ConnectionFailed("connection refused".to_string());
        assert_eq!(error.to_string(), "Connection failed: connection refused");
    }

    #[test]
    fn test_remote_display() {
        let error = StoreError::Remote("WRONGTYPE".to_string());
        assert_eq!(error.to_string(), "Remote operation failed: WRONGTYPE");
    }

    #[test]
    fn test_invalid_data_display() {
        let error = StoreError::InvalidData("document is not a mapping".to_string());
        assert_eq!(error.to_string(), "Invalid data: document is not a mapping");
    }
}
