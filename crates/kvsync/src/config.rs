use std::fmt;
use std::str::FromStr;

use kvsync_core::config::{validators, ConfigError, ConfigVar, VarType};
use kvsync_core::env;
use kvsync_core::kv::DEFAULT_BATCH_SIZE;

use crate::error::{Error, Result};

/// Which backend a datastore mirrors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    Toml,
    Yaml,
    Redis,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Redis => "redis",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "redis" => Ok(Self::Redis),
            other => Err(Error::UnknownBackend(other.to_string())),
        }
    }
}

/// Datastore configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend to use (default: toml)
    pub backend: BackendKind,
    /// Directory holding the datastore file (default: "~/.config/kvsync")
    pub storage_dir: String,
    /// Datastore file name; the extension follows the format (default: "datastore")
    pub filename: String,
    /// Version tag carried by the datastore (default: 1)
    pub config_version: u32,
    /// Whether `set` writes externally by default (default: true)
    pub write_on_update: bool,
    /// Keys fetched per batch when reading a whole Redis store (default: 1,000)
    pub batch_size: usize,
    /// Redis connection URL (default: "redis://localhost:6379")
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `KVSYNC_BACKEND` - `toml`, `yaml` or `redis` (default: toml)
    /// - `KVSYNC_STORAGE_DIR` - File backend directory (default: "~/.config/kvsync")
    /// - `KVSYNC_FILENAME` - File backend file name (default: "datastore")
    /// - `KVSYNC_CONFIG_VERSION` - Datastore version tag (default: 1)
    /// - `KVSYNC_WRITE_ON_UPDATE` - Write through on `set` (default: true)
    /// - `KVSYNC_BATCH_SIZE` - Redis read batch size (default: 1,000)
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let config_version = env::get_int("KVSYNC_CONFIG_VERSION", 1)?;
        let config_version = u32::try_from(config_version)
            .map_err(|err| env_error("KVSYNC_CONFIG_VERSION", err))?;
        let batch_size = env::get_int("KVSYNC_BATCH_SIZE", DEFAULT_BATCH_SIZE as i64)?;
        let batch_size =
            usize::try_from(batch_size).map_err(|err| env_error("KVSYNC_BATCH_SIZE", err))?;

        Ok(Self {
            backend: env::get_str("KVSYNC_BACKEND", "toml")?.parse()?,
            storage_dir: env::get_str("KVSYNC_STORAGE_DIR", "~/.config/kvsync")?,
            filename: env::get_str("KVSYNC_FILENAME", "datastore")?,
            config_version,
            write_on_update: env::get_bool("KVSYNC_WRITE_ON_UPDATE", true)?,
            batch_size,
            redis_url: env::get_str("REDIS_URL", "redis://localhost:6379")?,
        })
    }

    /// Checks the values against their validators.
    pub fn validate(&self) -> Result<()> {
        let vars = [
            ConfigVar::new("KVSYNC_BATCH_SIZE", self.batch_size as i64, VarType::Int)?
                .with_validator(validators::number_natural()),
            ConfigVar::new("KVSYNC_FILENAME", self.filename.as_str(), VarType::Str)?
                .with_validator(validators::string_non_empty()),
            ConfigVar::new("KVSYNC_STORAGE_DIR", self.storage_dir.as_str(), VarType::Str)?
                .with_validator(validators::string_non_empty()),
            ConfigVar::new("REDIS_URL", self.redis_url.as_str(), VarType::Str)?
                .with_validator(validators::string_non_empty()),
        ];
        for var in &vars {
            var.validate()?;
        }
        Ok(())
    }
}

fn env_error(key: &str, err: impl fmt::Display) -> Error {
    Error::Config(ConfigError::EnvVar {
        key: key.to_string(),
        message: err.to_string(),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Toml,
            storage_dir: "~/.config/kvsync".to_string(),
            filename: "datastore".to_string(),
            config_version: 1,
            write_on_update: true,
            batch_size: DEFAULT_BATCH_SIZE,
            redis_url: "redis://localhost:6379".to_string(),
        }
    }
}
