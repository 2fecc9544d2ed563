use async_trait::async_trait;
use serde_json::Value;

use super::{Capabilities, DataMap, Fallback, Result, Write};

/// An in-memory key-value container, optionally mirrored to an external
/// destination.
///
/// Mutation takes `&mut self`: a backend has a single logical owner and
/// offers no internal locking. Callers sharing one across tasks must wrap it
/// in their own lock. The `*_async` forms produce the same observable result
/// as their synchronous twins but suspend on external I/O instead of
/// blocking the calling thread.
#[async_trait]
pub trait Backend: Send {
    /// Returns an independent copy of the whole map.
    fn data(&self) -> DataMap;

    /// Gets the value for `key`, or `None` if absent.
    fn get(&mut self, key: &str, fallback: Fallback) -> Result<Option<Value>>;

    /// Inserts or replaces the value at `key`.
    fn set(&mut self, key: &str, value: Value, write: Write) -> Result<()>;

    /// Replaces the entire map with a copy of `data`.
    fn overwrite_data(&mut self, data: &DataMap) -> Result<()>;

    /// Merges `overrides` into the map, last write wins per key.
    fn update_data(&mut self, overrides: DataMap) -> Result<()>;

    /// Reloads the whole map from the external destination, replacing the
    /// in-memory copy, and returns it. Backends without a destination
    /// return a copy of what they hold.
    fn read_data(&mut self) -> Result<DataMap>;

    async fn get_async(&mut self, key: &str, fallback: Fallback) -> Result<Option<Value>>;

    async fn set_async(&mut self, key: &str, value: Value, write: Write) -> Result<()>;

    async fn overwrite_data_async(&mut self, data: &DataMap) -> Result<()>;

    async fn update_data_async(&mut self, overrides: DataMap) -> Result<()>;

    async fn read_data_async(&mut self) -> Result<DataMap>;

    /// Gets the value for `key`, or `default` if absent.
    fn get_or(&mut self, key: &str, default: Value, fallback: Fallback) -> Result<Value> {
        Ok(self.get(key, fallback)?.unwrap_or(default))
    }

    async fn get_or_async(
        &mut self,
        key: &str,
        default: Value,
        fallback: Fallback,
    ) -> Result<Value> {
        Ok(self.get_async(key, fallback).await?.unwrap_or(default))
    }
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Box<B> {
    fn data(&self) -> DataMap {
        (**self).data()
    }

    fn get(&mut self, key: &str, fallback: Fallback) -> Result<Option<Value>> {
        (**self).get(key, fallback)
    }

    fn set(&mut self, key: &str, value: Value, write: Write) -> Result<()> {
        (**self).set(key, value, write)
    }

    fn overwrite_data(&mut self, data: &DataMap) -> Result<()> {
        (**self).overwrite_data(data)
    }

    fn update_data(&mut self, overrides: DataMap) -> Result<()> {
        (**self).update_data(overrides)
    }

    fn read_data(&mut self) -> Result<DataMap> {
        (**self).read_data()
    }

    async fn get_async(&mut self, key: &str, fallback: Fallback) -> Result<Option<Value>> {
        (**self).get_async(key, fallback).await
    }

    async fn set_async(&mut self, key: &str, value: Value, write: Write) -> Result<()> {
        (**self).set_async(key, value, write).await
    }

    async fn overwrite_data_async(&mut self, data: &DataMap) -> Result<()> {
        (**self).overwrite_data_async(data).await
    }

    async fn update_data_async(&mut self, overrides: DataMap) -> Result<()> {
        (**self).update_data_async(overrides).await
    }

    async fn read_data_async(&mut self) -> Result<DataMap> {
        (**self).read_data_async().await
    }
}

/// An external destination a backend mirrors its data to and from.
///
/// Destinations that cannot address individual keys report
/// [`Capabilities::bulk_only`] and return `StoreError::Unsupported` from
/// `read_one` / `write_one`.
pub trait Destination: Send {
    /// Short human-readable name used in logs and errors.
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    /// Reads every key-value pair.
    fn read_all(&mut self) -> Result<DataMap>;

    /// Writes every key-value pair, fully replacing the destination's
    /// previous contents where the destination allows it.
    fn write_all(&mut self, data: &DataMap) -> Result<()>;

    /// Reads a single key.
    fn read_one(&mut self, key: &str) -> Result<Option<Value>>;

    /// Writes a single key-value pair.
    fn write_one(&mut self, key: &str, value: &Value) -> Result<()>;
}

/// Async twin of [`Destination`].
#[async_trait]
pub trait AsyncDestination: Destination {
    async fn read_all_async(&mut self) -> Result<DataMap>;

    async fn write_all_async(&mut self, data: &DataMap) -> Result<()>;

    async fn read_one_async(&mut self, key: &str) -> Result<Option<Value>>;

    async fn write_one_async(&mut self, key: &str, value: &Value) -> Result<()>;
}
