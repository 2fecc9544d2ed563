use kvsync_core::config::ConfigError;
use kvsync_core::store::StoreError;
use thiserror::Error;

/// Errors raised while configuring or building a datastore.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Unknown backend '{0}', expected one of: toml, yaml, redis")]
    UnknownBackend(String),
    #[error("Backend '{0}' is not enabled in this build")]
    BackendDisabled(&'static str),
}

/// Result type for kvsync operations.
pub type Result<T> = std::result::Result<T, Error>;
