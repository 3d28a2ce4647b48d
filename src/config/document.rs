//! Remote configuration document
//!
//! The backend owns the schema. The console keeps the document as a raw JSON
//! object so unknown keys survive a read-modify-write cycle untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration as returned by `GET /config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(Map<String, Value>);

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for partial updates
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow merge: every key of `partial` replaces the key here wholesale.
    /// Nested objects such as `GROUP_MAPPING` are not merged key by key.
    pub fn merged(&self, partial: &ConfigDocument) -> ConfigDocument {
        let mut merged = self.0.clone();
        for (key, value) in &partial.0 {
            merged.insert(key.clone(), value.clone());
        }
        ConfigDocument(merged)
    }
}

impl FromIterator<(String, Value)> for ConfigDocument {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        ConfigDocument(iter.into_iter().collect())
    }
}

/// Convert operator input into a JSON value
///
/// `true`/`false` become booleans, text starting with `{` must be a JSON
/// object, anything else is kept as a string.
pub fn parse_value(raw: &str) -> Result<Value, serde_json::Error> {
    let trimmed = raw.trim();
    match trimmed {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ if trimmed.starts_with('{') => {
            let object: Map<String, Value> = serde_json::from_str(trimmed)?;
            Ok(Value::Object(object))
        }
        _ => Ok(Value::String(raw.to_string())),
    }
}
