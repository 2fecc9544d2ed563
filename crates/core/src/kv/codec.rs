//! Value encoding for remote key-value services.
//!
//! Values are stored as their compact JSON text. On the way back, text that
//! parses as JSON is decoded and anything else is kept as a plain string, so
//! keys written by other clients remain readable.

use serde_json::Value;

/// Encodes a value for storage.
pub fn encode_value(value: &Value) -> String {
    value.to_string()
}

/// Decodes a stored value.
pub fn decode_value(raw: String) -> Value {
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(_) => Value::String(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_string_is_quoted() {
        assert_eq!(encode_value(&json!("hello")), "\"hello\"");
    }

    #[test]
    fn test_encode_nested() {
        assert_eq!(encode_value(&json!({"a": [1, true]})), r#"{"a":[1,true]}"#);
    }

    #[test]
    fn test_decode_preserves_types() {
        assert_eq!(decode_value("\"5\"".to_string()), json!("5"));
        assert_eq!(decode_value("5".to_string()), json!(5));
        assert_eq!(decode_value("null".to_string()), Value::Null);
    }

    #[test]
    fn test_decode_foreign_text_as_string() {
        assert_eq!(decode_value("plain text".to_string()), json!("plain text"));
        assert_eq!(decode_value(String::new()), json!(""));
    }
}
