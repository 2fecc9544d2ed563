//! External sync policy decorator.
//!
//! Wraps a [`MemoryStore`] cache with an external [`Destination`]:
//!
//! - **Writes**: `set` updates the cache, then writes the key (per-key
//!   destinations) or the whole map (bulk-only destinations) when the
//!   resolved [`Write`] policy says so. `overwrite_data` and `update_data`
//!   always rewrite the whole destination.
//! - **Reads**: on per-key destinations `get` reads through to the
//!   destination and caches the result; a failed read can fall back to the
//!   cache with [`Fallback::Cached`]. Bulk-only destinations serve `get`
//!   from the cache and are refreshed with `read_data`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::Span;

use super::{
    AsyncDestination, Backend, DataMap, Destination, Fallback, MemoryStore, Result, StoreError,
    Write,
};

/// A backend that mirrors its in-memory map to an external destination.
///
/// # Type Parameters
///
/// * `D` - The external destination (file, remote key-value service)
pub struct SyncedStore<D> {
    cache: MemoryStore,
    destination: D,
    write_on_update_default: bool,
    full_sync_only: bool,
    span: Span,
}

impl<D: Destination> SyncedStore<D> {
    /// Creates a new synced store with an empty cache.
    ///
    /// # Arguments
    ///
    /// * `destination` - Where the data is mirrored to
    /// * `write_on_update` - Whether `set` writes externally by default
    pub fn new(destination: D, write_on_update: bool) -> Self {
        let full_sync_only = !destination.capabilities().supports_per_key_io;
        let span = tracing::info_span!("datastore", destination = destination.name());
        Self {
            cache: MemoryStore::new(),
            destination,
            write_on_update_default: write_on_update,
            full_sync_only,
            span,
        }
    }

    /// Replaces the span every log event of this store is attached to.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Restricts the store to whole-map external reads and writes, even if
    /// the destination supports per-key operations.
    pub fn bulk_only(mut self) -> Self {
        self.full_sync_only = true;
        self
    }

    pub fn full_sync_only(&self) -> bool {
        self.full_sync_only
    }

    pub fn write_on_update_default(&self) -> bool {
        self.write_on_update_default
    }

    pub fn set_write_on_update_default(&mut self, write_on_update: bool) {
        self.write_on_update_default = write_on_update;
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    pub fn destination_mut(&mut self) -> &mut D {
        &mut self.destination
    }

    /// The in-memory cache, as last written or read.
    pub fn cache(&self) -> &MemoryStore {
        &self.cache
    }

    /// Writes the whole cached map to the destination.
    pub fn write_data(&mut self) -> Result<()> {
        self.destination
            .write_all(self.cache.as_map())
            .map_err(|err| self.failed("write_data", None, err))?;
        tracing::debug!(parent: &self.span, keys = self.cache.len(), "Wrote data to destination");
        Ok(())
    }

    /// Writes a single key-value pair to the destination.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unsupported` if the store is full-sync-only.
    pub fn write_datum(&mut self, key: &str, value: &Value) -> Result<()> {
        self.ensure_per_key("write_datum")?;
        self.destination
            .write_one(key, value)
            .map_err(|err| self.failed("write_datum", Some(key), err))?;
        tracing::trace!(parent: &self.span, key, "Wrote datum to destination");
        Ok(())
    }

    /// Reads the whole map from the destination and commits it to the cache
    /// without writing it back.
    pub fn read_data(&mut self) -> Result<DataMap> {
        let data = self
            .destination
            .read_all()
            .map_err(|err| self.failed("read_data", None, err))?;
        self.cache.replace(data.clone());
        tracing::debug!(parent: &self.span, keys = data.len(), "Read data from destination");
        Ok(data)
    }

    /// Reads a single key from the destination.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unsupported` if the store is full-sync-only.
    pub fn read_datum(&mut self, key: &str) -> Result<Option<Value>> {
        self.ensure_per_key("read_datum")?;
        self.destination
            .read_one(key)
            .map_err(|err| self.failed("read_datum", Some(key), err))
    }

    fn sync_change(&mut self, key: &str, value: &Value) -> Result<()> {
        if self.full_sync_only {
            self.write_data()
        } else {
            self.write_datum(key, value)
        }
    }

    fn ensure_per_key(&self, operation: &'static str) -> Result<()> {
        if self.full_sync_only {
            return Err(StoreError::Unsupported {
                destination: self.destination.name(),
                operation,
            });
        }
        Ok(())
    }

    fn failed(&self, operation: &'static str, key: Option<&str>, err: StoreError) -> StoreError {
        tracing::error!(
            parent: &self.span,
            operation,
            key,
            error = %err,
            "External destination operation failed"
        );
        err
    }

    fn cached_fallback(
        &self,
        key: &str,
        fallback: Fallback,
        err: StoreError,
    ) -> Result<Option<Value>> {
        match fallback {
            Fallback::Propagate => Err(err),
            Fallback::Cached => {
                tracing::error!(
                    parent: &self.span,
                    key,
                    error = %err,
                    "Returning cached value after failed external read"
                );
                Ok(self.cache.get_ref(key).cloned())
            }
        }
    }
}

impl<D: AsyncDestination> SyncedStore<D> {
    pub async fn write_data_async(&mut self) -> Result<()> {
        let result = self
            .destination
            .write_all_async(self.cache.as_map())
            .await;
        result.map_err(|err| self.failed("write_data", None, err))?;
        tracing::debug!(parent: &self.span, keys = self.cache.len(), "Wrote data to destination");
        Ok(())
    }

    pub async fn write_datum_async(&mut self, key: &str, value: &Value) -> Result<()> {
        self.ensure_per_key("write_datum")?;
        let result = self.destination.write_one_async(key, value).await;
        result.map_err(|err| self.failed("write_datum", Some(key), err))?;
        tracing::trace!(parent: &self.span, key, "Wrote datum to destination");
        Ok(())
    }

    pub async fn read_data_async(&mut self) -> Result<DataMap> {
        let result = self.destination.read_all_async().await;
        let data = result.map_err(|err| self.failed("read_data", None, err))?;
        self.cache.replace(data.clone());
        tracing::debug!(parent: &self.span, keys = data.len(), "Read data from destination");
        Ok(data)
    }

    pub async fn read_datum_async(&mut self, key: &str) -> Result<Option<Value>> {
        self.ensure_per_key("read_datum")?;
        let result = self.destination.read_one_async(key).await;
        result.map_err(|err| self.failed("read_datum", Some(key), err))
    }

    async fn sync_change_async(&mut self, key: &str, value: &Value) -> Result<()> {
        if self.full_sync_only {
            self.write_data_async().await
        } else {
            self.write_datum_async(key, value).await
        }
    }
}

#[async_trait]
impl<D: AsyncDestination> Backend for SyncedStore<D> {
    fn data(&self) -> DataMap {
        self.cache.data()
    }

    fn get(&mut self, key: &str, fallback: Fallback) -> Result<Option<Value>> {
        if self.full_sync_only {
            return self.cache.get(key, fallback);
        }

        match self.read_datum(key) {
            Ok(Some(value)) => {
                self.cache.insert(key, value.clone());
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(err) => self.cached_fallback(key, fallback, err),
        }
    }

    fn set(&mut self, key: &str, value: Value, write: Write) -> Result<()> {
        self.cache.insert(key, value.clone());
        if write.resolve(self.write_on_update_default) {
            self.sync_change(key, &value)?;
        }
        Ok(())
    }

    fn overwrite_data(&mut self, data: &DataMap) -> Result<()> {
        self.cache.replace(data.clone());
        self.write_data()
    }

    fn update_data(&mut self, overrides: DataMap) -> Result<()> {
        self.cache.merge(overrides);
        self.write_data()
    }

    fn read_data(&mut self) -> Result<DataMap> {
        SyncedStore::read_data(self)
    }

    async fn get_async(&mut self, key: &str, fallback: Fallback) -> Result<Option<Value>> {
        if self.full_sync_only {
            return self.cache.get(key, fallback);
        }

        match self.read_datum_async(key).await {
            Ok(Some(value)) => {
                self.cache.insert(key, value.clone());
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(err) => self.cached_fallback(key, fallback, err),
        }
    }

    async fn set_async(&mut self, key: &str, value: Value, write: Write) -> Result<()> {
        self.cache.insert(key, value.clone());
        if write.resolve(self.write_on_update_default) {
            self.sync_change_async(key, &value).await?;
        }
        Ok(())
    }

    async fn overwrite_data_async(&mut self, data: &DataMap) -> Result<()> {
        self.cache.replace(data.clone());
        self.write_data_async().await
    }

    async fn update_data_async(&mut self, overrides: DataMap) -> Result<()> {
        self.cache.merge(overrides);
        self.write_data_async().await
    }

    async fn read_data_async(&mut self) -> Result<DataMap> {
        SyncedStore::read_data_async(self).await
    }
}
