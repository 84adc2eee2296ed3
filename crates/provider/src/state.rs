//! Resource State Values
//!
//! The flat attribute map exchanged between the caller and the provider.
//! Maps are ordered so that two reads of the same remote state encode to the
//! same bytes.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Dynamic value holding configuration or state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum DynamicValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<DynamicValue>),
    Map(BTreeMap<String, DynamicValue>),
}

impl DynamicValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, DynamicValue>> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map()?.get(key)
    }

    /// Set an attribute, turning a null value into an empty map first.
    pub fn set(&mut self, key: impl Into<String>, value: DynamicValue) {
        if self.is_null() {
            *self = DynamicValue::Map(BTreeMap::new());
        }
        if let DynamicValue::Map(m) = self {
            m.insert(key.into(), value);
        }
    }

    /// Attribute present and not null
    pub fn has(&self, key: &str) -> bool {
        self.get(key).map(|v| !v.is_null()).unwrap_or(false)
    }

    /// Human-readable name of the value's type
    pub fn type_name(&self) -> &'static str {
        match self {
            DynamicValue::Null => "null",
            DynamicValue::Bool(_) => "bool",
            DynamicValue::Number(_) => "number",
            DynamicValue::String(_) => "string",
            DynamicValue::List(_) => "list",
            DynamicValue::Map(_) => "map",
        }
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Bool(b) => DynamicValue::Bool(b),
            serde_json::Value::Number(n) => DynamicValue::Number(n),
            serde_json::Value::String(s) => DynamicValue::String(s),
            serde_json::Value::Array(a) => {
                DynamicValue::List(a.into_iter().map(DynamicValue::from).collect())
            }
            serde_json::Value::Object(o) => DynamicValue::Map(
                o.into_iter()
                    .map(|(k, v)| (k, DynamicValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Decode a state value from JSON bytes
pub fn decode_dynamic_value(data: &[u8]) -> Result<DynamicValue> {
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(DynamicValue::Null);
    }
    let value: DynamicValue = serde_json::from_slice(data)?;
    Ok(value)
}

/// Encode a state value to JSON bytes
pub fn encode_dynamic_value(value: &DynamicValue) -> Result<Vec<u8>> {
    let bytes = serde_json::to_vec_pretty(value)?;
    Ok(bytes)
}

/// Helper to extract a string attribute from a DynamicValue
pub fn get_string_attr(value: &DynamicValue, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_string())
        .unwrap_or("")
        .to_string()
}

/// Helper to extract an optional string attribute from a DynamicValue
pub fn get_optional_string_attr(value: &DynamicValue, key: &str) -> Option<String> {
    value.get(key).and_then(|v| match v {
        DynamicValue::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// Helper to extract an integer attribute from a DynamicValue
pub fn get_int_attr(value: &DynamicValue, key: &str, default: i64) -> i64 {
    value.get(key).and_then(|v| v.as_i64()).unwrap_or(default)
}

/// Helper to extract a bool attribute from a DynamicValue
pub fn get_bool_attr(value: &DynamicValue, key: &str, default: bool) -> bool {
    value.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

/// Helper to extract a list attribute; absent or null yields an empty slice
pub fn get_list_attr<'a>(value: &'a DynamicValue, key: &str) -> &'a [DynamicValue] {
    value.get(key).and_then(|v| v.as_list()).unwrap_or(&[])
}

/// Helper to extract the single element of a `max_items = 1` block
pub fn get_block_attr<'a>(value: &'a DynamicValue, key: &str) -> Option<&'a DynamicValue> {
    get_list_attr(value, key).first().filter(|v| !v.is_null())
}

/// Helper to extract a map of strings (tags)
pub fn get_string_map_attr(value: &DynamicValue, key: &str) -> BTreeMap<String, String> {
    value
        .get(key)
        .and_then(|v| v.as_map())
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_string().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Create a DynamicValue map with the given attributes
pub fn make_state(attrs: Vec<(&str, DynamicValue)>) -> DynamicValue {
    let mut map = BTreeMap::new();
    for (key, value) in attrs {
        map.insert(key.to_string(), value);
    }
    DynamicValue::Map(map)
}

/// Create a string DynamicValue
pub fn string_value(s: impl Into<String>) -> DynamicValue {
    DynamicValue::String(s.into())
}

/// Create a string DynamicValue, or null when absent
pub fn optional_string_value(s: Option<impl Into<String>>) -> DynamicValue {
    s.map(string_value).unwrap_or(DynamicValue::Null)
}

/// Create a number DynamicValue from i64
pub fn int_value(n: i64) -> DynamicValue {
    DynamicValue::Number(serde_json::Number::from(n))
}

/// Create a bool DynamicValue
pub fn bool_value(b: bool) -> DynamicValue {
    DynamicValue::Bool(b)
}

/// Create a list DynamicValue
pub fn list_value(items: Vec<DynamicValue>) -> DynamicValue {
    DynamicValue::List(items)
}

/// Create a map of strings DynamicValue
pub fn string_map_value(map: &BTreeMap<String, String>) -> DynamicValue {
    DynamicValue::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), string_value(v)))
            .collect(),
    )
}

/// Create a null DynamicValue
pub fn null_value() -> DynamicValue {
    DynamicValue::Null
}
