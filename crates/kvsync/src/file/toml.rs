//! TOML format.
//!
//! Conversion rules between the JSON value model and TOML:
//!
//! - Objects become `[table]` sections; objects inside arrays become inline
//!   tables.
//! - Non-empty arrays whose items are all objects become `[[array-of-tables]]`.
//! - TOML has no null: nulls inside tables are dropped, nulls inside arrays
//!   are an error.
//! - TOML datetimes read back as strings.

use serde_json::{Map, Number, Value as Json};
use toml_edit::{Array, ArrayOfTables, DocumentMut, InlineTable, Item, Table, Value};

use kvsync_core::store::{DataMap, Result, StoreError};

use super::Format;

/// TOML files (`.toml`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormat;

impl Format for TomlFormat {
    const NAME: &'static str = "toml file";
    const EXTENSION: &'static str = "toml";

    fn serialize(data: &DataMap) -> Result<String> {
        let mut doc = DocumentMut::new();
        fill_table(doc.as_table_mut(), data)?;
        Ok(doc.to_string())
    }

    fn deserialize(raw: &str) -> Result<DataMap> {
        let doc: DocumentMut = raw
            .parse()
            .map_err(|err: toml_edit::TomlError| StoreError::Serialization(err.to_string()))?;
        table_to_map(doc.as_table())
    }
}

fn fill_table(table: &mut Table, data: &DataMap) -> Result<()> {
    for (key, value) in data {
        if let Some(item) = to_item(value)? {
            table.insert(key, item);
        }
    }
    Ok(())
}

fn to_item(value: &Json) -> Result<Option<Item>> {
    let item = match value {
        Json::Null => return Ok(None),
        Json::Object(map) => {
            let mut table = Table::new();
            fill_table(&mut table, map)?;
            Item::Table(table)
        }
        Json::Array(items) if is_array_of_tables(items) => {
            let mut tables = ArrayOfTables::new();
            for item in items {
                if let Json::Object(map) = item {
                    let mut table = Table::new();
                    fill_table(&mut table, map)?;
                    tables.push(table);
                }
            }
            Item::ArrayOfTables(tables)
        }
        other => Item::Value(to_value(other)?),
    };
    Ok(Some(item))
}

fn is_array_of_tables(items: &[Json]) -> bool {
    !items.is_empty() && items.iter().all(Json::is_object)
}

fn to_value(value: &Json) -> Result<Value> {
    match value {
        Json::Null => Err(StoreError::Serialization(
            "TOML cannot represent null inside an array".to_string(),
        )),
        Json::Bool(b) => Ok(Value::from(*b)),
        Json::Number(n) => number_to_value(n),
        Json::String(s) => Ok(Value::from(s.as_str())),
        Json::Array(items) => {
            let mut array = Array::new();
            for item in items {
                array.push(to_value(item)?);
            }
            Ok(Value::Array(array))
        }
        Json::Object(map) => {
            let mut inline = InlineTable::new();
            for (key, value) in map {
                if value.is_null() {
                    continue;
                }
                inline.insert(key.as_str(), to_value(value)?);
            }
            Ok(Value::InlineTable(inline))
        }
    }
}

fn number_to_value(n: &Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if n.is_u64() {
        return Err(StoreError::Serialization(format!(
            "integer {n} is out of range for TOML"
        )));
    }
    match n.as_f64() {
        Some(f) => Ok(Value::from(f)),
        None => Err(StoreError::Serialization(format!(
            "number {n} cannot be represented in TOML"
        ))),
    }
}

fn table_to_map(table: &Table) -> Result<DataMap> {
    let mut map = Map::new();
    for (key, item) in table.iter() {
        if let Some(value) = item_to_json(item)? {
            map.insert(key.to_string(), value);
        }
    }
    Ok(map)
}

fn item_to_json(item: &Item) -> Result<Option<Json>> {
    let value = match item {
        Item::None => return Ok(None),
        Item::Value(value) => value_to_json(value)?,
        Item::Table(table) => Json::Object(table_to_map(table)?),
        Item::ArrayOfTables(tables) => Json::Array(
            tables
                .iter()
                .map(|table| table_to_map(table).map(Json::Object))
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    Ok(Some(value))
}

fn value_to_json(value: &Value) -> Result<Json> {
    match value {
        Value::String(s) => Ok(Json::String(s.value().clone())),
        Value::Integer(i) => Ok(Json::from(*i.value())),
        Value::Float(f) => Number::from_f64(*f.value())
            .map(Json::Number)
            .ok_or_else(|| StoreError::InvalidData(format!("non-finite float {}", f.value()))),
        Value::Boolean(b) => Ok(Json::Bool(*b.value())),
        Value::Datetime(dt) => Ok(Json::String(dt.value().to_string())),
        Value::Array(array) => Ok(Json::Array(
            array.iter().map(value_to_json).collect::<Result<Vec<_>>>()?,
        )),
        Value::InlineTable(inline) => {
            let mut map = Map::new();
            for (key, value) in inline.iter() {
                map.insert(key.to_string(), value_to_json(value)?);
            }
            Ok(Json::Object(map))
        }
    }
}
