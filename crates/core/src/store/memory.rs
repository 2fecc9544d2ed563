//! Plain in-memory backend.

use async_trait::async_trait;
use serde_json::Value;

use super::{Backend, DataMap, Fallback, Result, Write};

/// In-memory key-value container.
///
/// Reads hand out clones, so callers can never mutate the store through an
/// aliasing reference. Data is lost when the store is dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    data: DataMap,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `data`.
    pub fn with_data(data: DataMap) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub(crate) fn as_map(&self) -> &DataMap {
        &self.data
    }

    pub(crate) fn get_ref(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    pub(crate) fn replace(&mut self, data: DataMap) {
        self.data = data;
    }

    pub(crate) fn merge(&mut self, overrides: DataMap) {
        self.data.extend(overrides);
    }
}

#[async_trait]
impl Backend for MemoryStore {
    fn data(&self) -> DataMap {
        self.data.clone()
    }

    fn get(&mut self, key: &str, _fallback: Fallback) -> Result<Option<Value>> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value, _write: Write) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }

    fn overwrite_data(&mut self, data: &DataMap) -> Result<()> {
        self.replace(data.clone());
        Ok(())
    }

    fn update_data(&mut self, overrides: DataMap) -> Result<()> {
        self.merge(overrides);
        Ok(())
    }

    fn read_data(&mut self) -> Result<DataMap> {
        Ok(self.data())
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> DataMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_get_after_set() {
        let mut store = MemoryStore::new();
        store.set("key", json!("value"), Write::Default).unwrap();

        let result = store.get("key", Fallback::Propagate).unwrap();
        assert_eq!(result, Some(json!("value")));
    }

    #[tokio::test]
    async fn test_get_async_after_set() {
        let mut store = MemoryStore::new();
        store.set("key", json!("value"), Write::Default).unwrap();

        let result = store.get_async("key", Fallback::Propagate).await.unwrap();
        assert_eq!(result, Some(json!("value")));
    }

    #[test]
    fn test_get_missing_key_returns_default() {
        let mut store = MemoryStore::new();

        assert_eq!(store.get("nonexistent", Fallback::Propagate).unwrap(), None);
        let result = store
            .get_or("nonexistent", json!("default_value"), Fallback::Propagate)
            .unwrap();
        assert_eq!(result, json!("default_value"));
    }

    #[tokio::test]
    async fn test_get_or_async_missing_key_returns_default() {
        let mut store = MemoryStore::new();

        let result = store
            .get_or_async("nonexistent", json!("default_value"), Fallback::Propagate)
            .await
            .unwrap();
        assert_eq!(result, json!("default_value"));
    }

    #[tokio::test]
    async fn test_set_async() {
        let mut store = MemoryStore::new();
        store
            .set_async("key", json!({"nested": [1, 2]}), Write::Default)
            .await
            .unwrap();

        assert_eq!(store.data(), map(json!({"key": {"nested": [1, 2]}})));
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let mut store = MemoryStore::new();
        store.set("key", json!("value"), Write::Default).unwrap();
        store.set("key", json!("new_value"), Write::Default).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.data()["key"], json!("new_value"));
    }

    #[test]
    fn test_set_with_special_characters() {
        let mut store = MemoryStore::new();
        store.set("!@#$%^&*()", json!("special_value"), Write::Default).unwrap();

        assert!(store.contains_key("!@#$%^&*()"));
    }

    #[test]
    fn test_update_data_merges_without_discarding() {
        let mut store = MemoryStore::new();
        store.set("a", json!(1), Write::Default).unwrap();
        store.update_data(map(json!({"b": 2}))).unwrap();

        assert_eq!(store.data(), map(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_update_data_last_write_wins() {
        let mut store = MemoryStore::with_data(map(json!({"key1": "value1", "key2": "old"})));
        store
            .update_data(map(json!({"key2": "value2", "key3": "value3"})))
            .unwrap();

        assert_eq!(
            store.data(),
            map(json!({"key1": "value1", "key2": "value2", "key3": "value3"}))
        );
    }

    #[tokio::test]
    async fn test_update_data_async_with_empty_map() {
        let mut store = MemoryStore::with_data(map(json!({"key1": "value1"})));
        store.update_data_async(DataMap::new()).await.unwrap();

        assert_eq!(store.data(), map(json!({"key1": "value1"})));
    }

    #[test]
    fn test_overwrite_data_discards_prior_contents() {
        let mut store = MemoryStore::with_data(map(json!({"key1": "value1"})));
        let replacement = map(json!({"key2": "value2", "key3": "value3"}));
        store.overwrite_data(&replacement).unwrap();

        assert_eq!(store.data(), replacement);
    }

    #[tokio::test]
    async fn test_overwrite_data_async() {
        let mut store = MemoryStore::with_data(map(json!({"key1": "value1"})));
        store
            .overwrite_data_async(&map(json!({"key2": "value2"})))
            .await
            .unwrap();

        assert_eq!(store.data(), map(json!({"key2": "value2"})));
    }

    #[test]
    fn test_overwrite_data_does_not_alias_caller_map() {
        let mut store = MemoryStore::new();
        let mut source = map(json!({"list": [1, 2]}));
        store.overwrite_data(&source).unwrap();

        source.insert("extra".to_string(), json!(true));
        source["list"] = json!([]);

        assert_eq!(store.data(), map(json!({"list": [1, 2]})));
    }

    #[test]
    fn test_data_copy_immutability() {
        let mut store = MemoryStore::new();
        store.set("key", json!({"inner": "value"}), Write::Default).unwrap();

        let mut copy = store.data();
        copy["key"]["inner"] = json!("mutated");
        store.set("other", json!(1), Write::Default).unwrap();

        assert_eq!(copy["key"]["inner"], json!("mutated"));
        assert_eq!(
            store.get("key", Fallback::Propagate).unwrap(),
            Some(json!({"inner": "value"}))
        );
    }

    #[test]
    fn test_empty_store() {
        let mut store = MemoryStore::new();

        assert!(store.is_empty());
        assert_eq!(store.get("nonexistent", Fallback::Cached).unwrap(), None);
    }
}
