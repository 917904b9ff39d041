//! # JSON Bodies
//!
//! Request bodies are parsed with simd-json; responses are serialized with
//! `serde_json` (simd-json is primarily a parser).

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parse a JSON string into a typed value
///
/// # Errors
///
/// Returns `Error::InvalidJson` if parsing fails
pub fn parse_json<T: DeserializeOwned>(json_str: &str) -> Result<T> {
    let mut bytes = json_str.as_bytes().to_vec();
    parse_json_bytes(&mut bytes)
}

/// Parse JSON bytes in place
///
/// simd-json mutates the buffer while parsing, hence `&mut`.
///
/// # Errors
///
/// Returns `Error::InvalidJson` if parsing fails
pub fn parse_json_bytes<T: DeserializeOwned>(bytes: &mut [u8]) -> Result<T> {
    simd_json::from_slice(bytes).map_err(|e| Error::InvalidJson {
        reason: e.to_string(),
    })
}

/// Serialize a value to a JSON string
///
/// # Errors
///
/// Returns `Error::Json` if the value cannot be serialized
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Serialize a value to a pretty-printed JSON string
///
/// # Errors
///
/// Returns `Error::Json` if the value cannot be serialized
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        age: i32,
    }

    #[test]
    fn test_parse_json_object() {
        let data: TestData = parse_json(r#"{"name": "John", "age": 30}"#).unwrap();
        assert_eq!(data.name, "John");
        assert_eq!(data.age, 30);
    }

    #[test]
    fn test_parse_json_map() {
        let map: HashMap<String, String> =
            parse_json(r#"{"key": "value", "count": "42"}"#).unwrap();
        assert_eq!(map.get("key"), Some(&"value".to_string()));
    }

    #[test]
    fn test_to_json_pretty() {
        let data = TestData {
            name: "Bob".to_string(),
            age: 40,
        };
        let json = to_json_pretty(&data).unwrap();
        assert!(json.contains('\n'));
        assert_eq!(parse_json::<TestData>(&json).unwrap(), data);
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_json::<TestData>("not valid json").unwrap_err();
        assert!(matches!(err, Error::InvalidJson { .. }));
    }
}
