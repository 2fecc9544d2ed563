//! YAML format.

use serde_json::Value;

use kvsync_core::store::{DataMap, Result, StoreError};

use super::Format;

/// YAML files (`.yaml`). Block style, keys in insertion order.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl Format for YamlFormat {
    const NAME: &'static str = "yaml file";
    const EXTENSION: &'static str = "yaml";

    fn serialize(data: &DataMap) -> Result<String> {
        serde_yml::to_string(data).map_err(|err| StoreError::Serialization(err.to_string()))
    }

    fn deserialize(raw: &str) -> Result<DataMap> {
        if raw.trim().is_empty() {
            return Ok(DataMap::new());
        }
        let value: Value =
            serde_yml::from_str(raw).map_err(|err| StoreError::Serialization(err.to_string()))?;
        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(DataMap::new()),
            other => Err(StoreError::InvalidData(format!(
                "expected a mapping at the document root, found {other}"
            ))),
        }
    }
}
