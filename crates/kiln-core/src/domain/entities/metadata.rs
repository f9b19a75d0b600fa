//! Open metadata maps and the license entry decoded from them.
//!
//! Metadata values are `serde_json::Value`, i.e. the tagged union
//! {null, string, number, bool, mapping, sequence}. Well-known keys are
//! decoded on demand into strict types with `serde_json::from_value`, a
//! structural conversion that never goes through bytes.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::error::DomainError;

/// Key of the license entry in project and node metadata.
pub const LICENSE_KEY: &str = "license";

/// String-keyed, loosely typed attributes attached to a project or node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Insert only when `key` is absent. Returns `true` if a value was added.
    pub fn insert_default(&mut self, key: &str, value: impl Into<Value>) -> bool {
        match self.0.entry(key.to_string()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Decode the `license` entry.
    ///
    /// Returns `Ok(None)` when the key is absent. `scope` names the owner
    /// ("project" or "node 'api'") in the error message.
    pub fn license(&self, scope: &str) -> Result<Option<License>, DomainError> {
        let Some(raw) = self.0.get(LICENSE_KEY) else {
            return Ok(None);
        };
        License::from_value(raw.clone())
            .map(Some)
            .map_err(|reason| DomainError::MetadataDecode {
                scope: scope.to_string(),
                reason,
            })
    }

    /// Overwrite `license.path` in place. Every other member of the entry
    /// stays exactly as supplied.
    pub fn set_license_path(&mut self, path: String, scope: &str) -> Result<(), DomainError> {
        match self.0.get_mut(LICENSE_KEY) {
            Some(Value::Object(license)) => {
                license.insert("path".to_string(), Value::String(path));
                Ok(())
            }
            other => Err(DomainError::MetadataDecode {
                scope: scope.to_string(),
                reason: format!(
                    "expected an object, found {}",
                    other.map_or("nothing", |v| kind_of(v))
                ),
            }),
        }
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for Metadata {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// License attribution for a project or node.
///
/// A decoded view of the `license` entry; the entry itself is never
/// re-encoded from this struct.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct License {
    /// Path of a license file to copy into the generated output. `null`
    /// reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub path: String,

    /// Where the license text can be found online.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl License {
    /// Decode from a generic metadata value.
    pub fn from_value(value: Value) -> Result<Self, String> {
        if !value.is_object() {
            return Err(format!("expected an object, found {}", kind_of(&value)));
        }
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: Value) -> Metadata {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn absent_license_is_none() {
        assert_eq!(Metadata::new().license("project").unwrap(), None);
    }

    #[test]
    fn license_decodes_and_keeps_unknown_fields() {
        let md = metadata(json!({
            "license": {"path": "LICENSE", "url": "https://x", "spdx": "MIT"}
        }));
        let license = md.license("project").unwrap().unwrap();

        assert_eq!(license.path, "LICENSE");
        assert_eq!(license.url.as_deref(), Some("https://x"));
        assert_eq!(license.extra.get("spdx"), Some(&json!("MIT")));
    }

    #[test]
    fn license_with_wrong_shape_fails() {
        let md = metadata(json!({"license": "MIT"}));
        let err = md.license("project").unwrap_err();
        assert!(matches!(err, DomainError::MetadataDecode { .. }));

        let md = metadata(json!({"license": {"path": 42}}));
        assert!(md.license("node 'api'").is_err());
    }

    #[test]
    fn set_license_path_touches_only_the_path() {
        let mut md = metadata(json!({"license": {"path": "L", "url": null, "spdx": "MIT"}}));
        md.set_license_path("/abs/L".into(), "project").unwrap();

        assert_eq!(
            md.get(LICENSE_KEY),
            Some(&json!({"path": "/abs/L", "url": null, "spdx": "MIT"}))
        );
    }

    #[test]
    fn null_path_decodes_as_empty() {
        let md = metadata(json!({"license": {"path": null, "url": null}}));
        let license = md.license("project").unwrap().unwrap();

        assert!(!license.has_path());
        assert_eq!(license.url, None);
    }

    #[test]
    fn set_license_path_requires_an_object() {
        let mut md = Metadata::new();
        assert!(md.set_license_path("/x".into(), "project").is_err());
    }

    #[test]
    fn insert_default_keeps_existing() {
        let mut md = Metadata::new();
        assert!(md.insert_default("groupId", "com.example"));
        assert!(!md.insert_default("groupId", "org.other"));
        assert_eq!(md.get_str("groupId"), Some("com.example"));
    }
}
