//! Datastore constructors.
//!
//! The typed constructors return concrete stores so callers keep access to
//! destination-specific operations (file permissions, Redis ping).
//! [`create_datastore`] picks the backend from a [`Config`] and erases the
//! type.

#[cfg(any(feature = "toml", feature = "yaml"))]
use std::path::Path;

use kvsync_core::store::{Backend, SyncedStore};
use kvsync_core::Datastore;

use crate::config::{BackendKind, Config};
use crate::error::Result;
#[cfg(any(feature = "toml", feature = "yaml"))]
use crate::file::{FileDestination, Format};

#[cfg(not(all(feature = "toml", feature = "yaml", feature = "redis")))]
use crate::error::Error;

#[cfg(feature = "toml")]
use crate::file::TomlFormat;
#[cfg(feature = "yaml")]
use crate::file::YamlFormat;
#[cfg(feature = "redis")]
use crate::redis_impl::{RedisAsyncClient, RedisClient, RedisDestination};

/// A file-backed store in format `F`.
#[cfg(any(feature = "toml", feature = "yaml"))]
pub type FileStore<F> = SyncedStore<FileDestination<F>>;

#[cfg(feature = "toml")]
pub type TomlStore = FileStore<TomlFormat>;

#[cfg(feature = "yaml")]
pub type YamlStore = FileStore<YamlFormat>;

#[cfg(feature = "redis")]
pub type RedisStore = SyncedStore<RedisDestination>;

/// Creates a datastore mirrored to `storage_dir/filename` in format `F`.
///
/// Nothing is read from disk; call `read_data` on the backend to load an
/// existing file.
#[cfg(any(feature = "toml", feature = "yaml"))]
pub fn create_file_datastore<F: Format>(
    config_version: u32,
    storage_dir: impl AsRef<Path>,
    filename: impl AsRef<Path>,
    write_on_update: bool,
) -> Datastore<FileStore<F>> {
    let destination = FileDestination::<F>::new(storage_dir, filename);
    let span = tracing::info_span!(
        "datastore",
        destination = F::NAME,
        path = %destination.path().display()
    );
    let store = SyncedStore::new(destination, write_on_update).with_span(span);
    Datastore::new(config_version, store)
}

#[cfg(feature = "toml")]
pub fn create_toml_datastore(
    config_version: u32,
    storage_dir: impl AsRef<Path>,
    filename: impl AsRef<Path>,
    write_on_update: bool,
) -> Datastore<TomlStore> {
    create_file_datastore::<TomlFormat>(config_version, storage_dir, filename, write_on_update)
}

#[cfg(feature = "yaml")]
pub fn create_yaml_datastore(
    config_version: u32,
    storage_dir: impl AsRef<Path>,
    filename: impl AsRef<Path>,
    write_on_update: bool,
) -> Datastore<YamlStore> {
    create_file_datastore::<YamlFormat>(config_version, storage_dir, filename, write_on_update)
}

/// Connects to Redis and creates a datastore mirrored to it.
///
/// Opens one blocking and one async connection.
///
/// # Errors
///
/// Returns `StoreError::ConnectionFailed` if either connection cannot be
/// established, or `StoreError::InvalidData` if `batch_size` is zero.
#[cfg(feature = "redis")]
pub async fn create_redis_datastore(
    config_version: u32,
    url: &str,
    batch_size: usize,
    write_on_update: bool,
) -> Result<Datastore<RedisStore>> {
    let client = RedisClient::connect(url)?;
    let async_client = RedisAsyncClient::connect(url).await?;
    let destination = RedisDestination::new(client, async_client, batch_size)?;
    tracing::debug!(batch_size, "Connected to Redis");

    let span = tracing::info_span!("datastore", destination = "redis");
    let store = SyncedStore::new(destination, write_on_update).with_span(span);
    Ok(Datastore::new(config_version, store))
}

/// Creates the datastore selected by `config`.
///
/// File backends are loaded from disk before the type is erased, so an
/// existing file is never replaced by an empty map on the first write.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the backend is not
/// compiled in, or the Redis connection fails.
pub async fn create_datastore(config: &Config) -> Result<Datastore<Box<dyn Backend>>> {
    config.validate()?;
    let backend = match config.backend {
        BackendKind::Toml => toml_backend(config).await?,
        BackendKind::Yaml => yaml_backend(config).await?,
        BackendKind::Redis => redis_backend(config).await?,
    };
    tracing::info!(backend = %config.backend, version = config.config_version, "Created datastore");
    Ok(Datastore::new(config.config_version, backend))
}

#[cfg(feature = "toml")]
async fn toml_backend(config: &Config) -> Result<Box<dyn Backend>> {
    let mut store = create_toml_datastore(
        config.config_version,
        &config.storage_dir,
        &config.filename,
        config.write_on_update,
    )
    .into_backend();
    store.read_data_async().await?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "toml"))]
async fn toml_backend(_config: &Config) -> Result<Box<dyn Backend>> {
    Err(Error::BackendDisabled("toml"))
}

#[cfg(feature = "yaml")]
async fn yaml_backend(config: &Config) -> Result<Box<dyn Backend>> {
    let mut store = create_yaml_datastore(
        config.config_version,
        &config.storage_dir,
        &config.filename,
        config.write_on_update,
    )
    .into_backend();
    store.read_data_async().await?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "yaml"))]
async fn yaml_backend(_config: &Config) -> Result<Box<dyn Backend>> {
    Err(Error::BackendDisabled("yaml"))
}

#[cfg(feature = "redis")]
async fn redis_backend(config: &Config) -> Result<Box<dyn Backend>> {
    let datastore = create_redis_datastore(
        config.config_version,
        &config.redis_url,
        config.batch_size,
        config.write_on_update,
    )
    .await?;
    Ok(Box::new(datastore.into_backend()))
}

#[cfg(not(feature = "redis"))]
async fn redis_backend(_config: &Config) -> Result<Box<dyn Backend>> {
    Err(Error::BackendDisabled("redis"))
}
