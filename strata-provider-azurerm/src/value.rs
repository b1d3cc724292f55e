//! Conversions between configuration values and JSON
//!
//! Also provides the small accessors resource adapters use to pull typed
//! fields out of attribute maps.

use std::collections::HashMap;

use serde_json::json;
use strata_core::resource::Value;
use thiserror::Error;

use crate::error::{AzureError, AzureResult};

/// A JSON number that is not an integer
#[derive(Debug, Error, PartialEq)]
#[error("{0} is not an integer")]
pub struct NotAnInteger(pub serde_json::Number);

/// Convert a JSON value into a configuration value
///
/// Strings of the form `${address.attribute}` become references, e.g.
/// `${azurerm_resource_group.test.name}`. Nulls are dropped. Configuration
/// values have no floats, so fractional numbers are rejected.
pub fn json_to_value(value: &serde_json::Value) -> Result<Option<Value>, NotAnInteger> {
    let converted = match value {
        serde_json::Value::String(s) => parse_reference(s).unwrap_or_else(|| Value::String(s.clone())),
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => return Err(NotAnInteger(n.clone())),
        },
        serde_json::Value::Array(arr) => {
            let mut items = Vec::with_capacity(arr.len());
            for item in arr {
                if let Some(item) = json_to_value(item)? {
                    items.push(item);
                }
            }
            Value::List(items)
        }
        serde_json::Value::Object(obj) => {
            let mut map = HashMap::with_capacity(obj.len());
            for (k, v) in obj {
                if let Some(v) = json_to_value(v)? {
                    map.insert(k.clone(), v);
                }
            }
            Value::Map(map)
        }
        serde_json::Value::Null => return Ok(None),
    };
    Ok(Some(converted))
}

/// Convert a configuration value into JSON
///
/// Unresolved references are rendered back into `${...}` form.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => json!(s),
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let obj: serde_json::Map<String, serde_json::Value> = keys
                .into_iter()
                .map(|k| (k.clone(), value_to_json(&map[k])))
                .collect();
            serde_json::Value::Object(obj)
        }
        Value::ResourceRef(address, attr) => json!(format!("${{{}.{}}}", address, attr)),
    }
}

/// Parse `${type.label.attribute}` into a reference
fn parse_reference(s: &str) -> Option<Value> {
    let inner = s.strip_prefix("${")?.strip_suffix('}')?;
    let (address, attribute) = inner.rsplit_once('.')?;
    if !address.contains('.') || attribute.is_empty() {
        return None;
    }
    Some(Value::ResourceRef(address.to_string(), attribute.to_string()))
}

/// Required string attribute
pub fn require_str<'a>(attrs: &'a HashMap<String, Value>, name: &str) -> AzureResult<&'a str> {
    match attrs.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::ResourceRef(address, attr)) => Err(AzureError::invalid_attribute(
            name,
            format!("reference to {}.{} was not resolved", address, attr),
        )),
        Some(_) => Err(AzureError::invalid_attribute(name, "expected a string")),
        None => Err(AzureError::invalid_attribute(name, "is required")),
    }
}

/// Optional string attribute, empty when absent
pub fn str_or_empty(attrs: &HashMap<String, Value>, name: &str) -> String {
    attrs
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Nested block list as maps; absent or malformed items are skipped
pub fn blocks<'a>(attrs: &'a HashMap<String, Value>, name: &str) -> Vec<&'a HashMap<String, Value>> {
    attrs
        .get(name)
        .and_then(Value::as_list)
        .map(|items| items.iter().filter_map(Value::as_map).collect())
        .unwrap_or_default()
}

/// String map attribute (e.g., tags)
pub fn string_map(attrs: &HashMap<String, Value>, name: &str) -> HashMap<String, String> {
    attrs
        .get(name)
        .and_then(Value::as_map)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// String list attribute
pub fn string_list(attrs: &HashMap<String, Value>, name: &str) -> Vec<String> {
    attrs
        .get(name)
        .and_then(Value::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Build a string map value (e.g., for tags)
pub fn string_map_value(map: &HashMap<String, String>) -> Value {
    Value::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}
