//! Environment variable helpers.
//!
//! Unset variables resolve to the supplied default. Set variables that
//! cannot be parsed are errors rather than silently ignored.

use std::env;

use serde_json::{Map, Value};

use crate::config::{ConfigError, Result};

/// Coerces a string to a boolean.
///
/// Accepts `true/yes/y/1` and `false/no/n/0` in any case, surrounding
/// whitespace ignored. An empty or blank string is `false`.
pub fn to_bool(raw: &str) -> std::result::Result<bool, String> {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "" | "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(format!("Unable to coerce value to boolean: {raw}")),
    }
}

fn lookup(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(env_error(key, err)),
    }
}

fn env_error(key: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::EnvVar {
        key: key.to_string(),
        message: err.to_string(),
    }
}

pub fn get_str(key: &str, default: &str) -> Result<String> {
    Ok(lookup(key)?.unwrap_or_else(|| default.to_string()))
}

pub fn get_bool(key: &str, default: bool) -> Result<bool> {
    match lookup(key)? {
        Some(raw) => to_bool(&raw).map_err(|message| env_error(key, message)),
        None => Ok(default),
    }
}

pub fn get_int(key: &str, default: i64) -> Result<i64> {
    match lookup(key)? {
        Some(raw) => raw.trim().parse().map_err(|err| env_error(key, err)),
        None => Ok(default),
    }
}

/// Splits the variable on `delimiter`. An unset variable splits `default`.
pub fn get_list_str(key: &str, delimiter: &str, default: &str) -> Result<Vec<String>> {
    let raw = get_str(key, default)?;
    Ok(raw.split(delimiter).map(str::to_string).collect())
}

/// Parses the variable as a JSON object. Unset yields an empty object.
pub fn get_dict_json(key: &str) -> Result<Map<String, Value>> {
    let Some(raw) = lookup(key)? else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(env_error(
            key,
            format!("expected a JSON object, found {other}"),
        )),
        Err(err) => {
            tracing::error!(key, error = %err, "Error loading JSON for env var");
            Err(env_error(key, err))
        }
    }
}
