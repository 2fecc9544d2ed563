//! The datastore façade.

use serde_json::Value;

use crate::store::{Backend, DataMap, Fallback, Result, Write};

/// Owns exactly one backend and records the configuration version it was
/// created for.
///
/// All data operations delegate to the backend unchanged.
#[derive(Debug)]
pub struct Datastore<B> {
    config_version: u32,
    backend: B,
}

impl<B: Backend> Datastore<B> {
    pub fn new(config_version: u32, backend: B) -> Self {
        Self {
            config_version,
            backend,
        }
    }

    pub fn config_version(&self) -> u32 {
        self.config_version
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn data(&self) -> DataMap {
        self.backend.data()
    }

    pub fn get(&mut self, key: &str, fallback: Fallback) -> Result<Option<Value>> {
        self.backend.get(key, fallback)
    }

    pub fn get_or(&mut self, key: &str, default: Value, fallback: Fallback) -> Result<Value> {
        self.backend.get_or(key, default, fallback)
    }

    pub fn set(&mut self, key: &str, value: Value, write: Write) -> Result<()> {
        self.backend.set(key, value, write)
    }

    pub fn overwrite_data(&mut self, data: &DataMap) -> Result<()> {
        self.backend.overwrite_data(data)
    }

    pub fn update_data(&mut self, overrides: DataMap) -> Result<()> {
        self.backend.update_data(overrides)
    }

    /// Reloads the data from the backend's external destination.
    pub fn read_data(&mut self) -> Result<DataMap> {
        self.backend.read_data()
    }

    pub async fn get_async(&mut self, key: &str, fallback: Fallback) -> Result<Option<Value>> {
        self.backend.get_async(key, fallback).await
    }

    pub async fn get_or_async(
        &mut self,
        key: &str,
        default: Value,
        fallback: Fallback,
    ) -> Result<Value> {
        self.backend.get_or_async(key, default, fallback).await
    }

    pub async fn set_async(&mut self, key: &str, value: Value, write: Write) -> Result<()> {
        self.backend.set_async(key, value, write).await
    }

    pub async fn overwrite_data_async(&mut self, data: &DataMap) -> Result<()> {
        self.backend.overwrite_data_async(data).await
    }

    pub async fn update_data_async(&mut self, overrides: DataMap) -> Result<()> {
        self.backend.update_data_async(overrides).await
    }

    pub async fn read_data_async(&mut self) -> Result<DataMap> {
        self.backend.read_data_async().await
    }

    /// Moves the current data into `new_backend` and returns a datastore
    /// for `new_version`.
    ///
    /// The new backend's contents are replaced, not merged. The old backend
    /// is dropped after the copy succeeds.
    pub fn migrate<N: Backend>(self, new_version: u32, mut new_backend: N) -> Result<Datastore<N>> {
        let data = self.backend.data();
        new_backend.overwrite_data(&data)?;
        tracing::info!(
            from = self.config_version,
            to = new_version,
            keys = data.len(),
            "Migrated datastore"
        );
        Ok(Datastore::new(new_version, new_backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use serde_json::json;

    fn map(value: Value) -> DataMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    /// A backend that refuses every write.
    struct ReadOnlyBackend;

    #[async_trait]
    impl Backend for ReadOnlyBackend {
        fn data(&self) -> DataMap {
            DataMap::new()
        }

        fn get(&mut self, _key: &str, _fallback: Fallback) -> Result<Option<Value>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: Value, _write: Write) -> Result<()> {
            Err(StoreError::Io {
                path: "/read-only".to_string(),
                message: "read-only".to_string(),
            })
        }

        fn overwrite_data(&mut self, _data: &DataMap) -> Result<()> {
            self.set("", Value::Null, Write::Default)
        }

        fn update_data(&mut self, _overrides: DataMap) -> Result<()> {
            self.set("", Value::Null, Write::Default)
        }

        fn read_data(&mut self) -> Result<DataMap> {
            Ok(DataMap::new())
        }

        async fn get_async(&mut self, key: &str, fallback: Fallback) -> Result<Option<Value>> {
            self.get(key, fallback)
        }

        async fn set_async(&mut self, key: &str, value: Value, write: Write) -> Result<()> {
            self.set(key, value, write)
        }

        async fn overwrite_data_async(&mut self, data: &DataMap) -> Result<()> {
            self.overwrite_data(data)
        }

        async fn update_data_async(&mut self, overrides: DataMap) -> Result<()> {
            self.update_data(overrides)
        }

        async fn read_data_async(&mut self) -> Result<DataMap> {
            self.read_data()
        }
    }

    #[test]
    fn test_config_version_is_recorded() {
        let store = Datastore::new(3, MemoryStore::new());
        assert_eq!(store.config_version(), 3);
    }

    #[test]
    fn test_delegates_to_backend() {
        let mut store = Datastore::new(1, MemoryStore::new());

        store.set("key", json!("value"), Write::Default).unwrap();
        store.update_data(map(json!({"other": 2}))).unwrap();

        assert_eq!(
            store.get("key", Fallback::Propagate).unwrap(),
            Some(json!("value"))
        );
        assert_eq!(
            store.get_or("missing", json!(0), Fallback::Propagate).unwrap(),
            json!(0)
        );
        assert_eq!(store.data(), map(json!({"key": "value", "other": 2})));
        assert_eq!(store.backend().len(), 2);
    }

    #[tokio::test]
    async fn test_async_delegation() {
        let mut store = Datastore::new(1, MemoryStore::new());
        let initial = map(json!({"a": 1}));

        store.overwrite_data_async(&initial).await.unwrap();
        store.set_async("b", json!(2), Write::Never).await.unwrap();

        assert_eq!(
            store.get_async("a", Fallback::Propagate).await.unwrap(),
            Some(json!(1))
        );
        assert_eq!(
            store
                .get_or_async("c", json!("d"), Fallback::Propagate)
                .await
                .unwrap(),
            json!("d")
        );
        assert_eq!(
            store.read_data_async().await.unwrap(),
            map(json!({"a": 1, "b": 2}))
        );
        assert_eq!(store.into_backend().len(), 2);
    }

    #[test]
    fn test_read_data_through_boxed_backend() {
        let backend: Box<dyn Backend> = Box::new(MemoryStore::with_data(map(json!({"a": 1}))));
        let mut store = Datastore::new(1, backend);

        assert_eq!(store.read_data().unwrap(), map(json!({"a": 1})));
        assert_eq!(store.get("a", Fallback::Propagate).unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_migrate_moves_data_and_version() {
        let mut old = Datastore::new(1, MemoryStore::new());
        old.set("key", json!([1, 2]), Write::Default).unwrap();
        let target = MemoryStore::with_data(map(json!({"stale": true})));

        let migrated = old.migrate(2, target).unwrap();

        assert_eq!(migrated.config_version(), 2);
        assert_eq!(migrated.data(), map(json!({"key": [1, 2]})));
    }

    #[test]
    fn test_migrate_propagates_backend_errors() {
        let old = Datastore::new(1, MemoryStore::with_data(map(json!({"a": 1}))));

        let result = old.migrate(2, ReadOnlyBackend);

        assert!(matches!(result, Err(StoreError::Io { .. })));
    }
}
