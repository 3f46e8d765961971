//! The parameter tree handed to templates, with deep merge support

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Result;

/// Generic parameter tree: string-keyed mappings, sequences, and scalars
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Parse values from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Ok(Self(value))
    }

    /// Parse values from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Ok(Self(value))
    }

    /// Deep merge another Values into this one
    ///
    /// Rules:
    /// - Scalars: overlay replaces base
    /// - Objects: recursive merge
    /// - Arrays: overlay replaces base (not appended)
    pub fn merge(&mut self, overlay: &Values) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// Merge with pack defaults applied first
    ///
    /// Defaults are the lowest priority; anything set in `overlay` wins.
    pub fn with_defaults(defaults: Values, overlay: &Values) -> Self {
        let mut result = defaults;
        result.merge(overlay);
        result
    }

    /// Get a value by dotted path (e.g. `"global.baseDomain"`)
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let parts: Vec<&str> = path.split('.').collect();
        get_nested(&self.0, &parts)
    }

    /// Get the inner JSON value
    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    /// Convert to JSON value
    pub fn into_inner(self) -> JsonValue {
        self.0
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Object(map) => map.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }
}

/// Deep merge two JSON values
fn deep_merge(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Get a nested value by path
fn get_nested<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    if path.is_empty() {
        return Some(value);
    }

    let key = path[0];
    let remaining = &path[1..];

    match value {
        JsonValue::Object(map) => map.get(key).and_then(|v| get_nested(v, remaining)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_merge() {
        let mut base = Values::from_yaml(
            r#"
global:
  baseDomain: old.test
  tlsCert: cert
replicas: 1
"#,
        )
        .unwrap();

        let overlay = Values::from_yaml(
            r#"
global:
  baseDomain: new.test
replicas: 3
"#,
        )
        .unwrap();

        base.merge(&overlay);

        assert_eq!(base.get("global.baseDomain").unwrap(), "new.test");
        assert_eq!(base.get("global.tlsCert").unwrap(), "cert");
        assert_eq!(base.get("replicas").unwrap(), 3);
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let mut base = Values::from_json(r#"{"containers":[{"image":"a"},{"image":"b"}]}"#).unwrap();
        let overlay = Values::from_json(r#"{"containers":[{"image":"c"}]}"#).unwrap();

        base.merge(&overlay);

        let containers = base.get("containers").unwrap().as_array().unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0]["image"], "c");
    }

    #[test]
    fn test_with_defaults() {
        let defaults = Values::from_yaml("ingressClass: traefik\nreplicas: 1").unwrap();
        let overlay = Values::from_yaml("replicas: 2").unwrap();

        let merged = Values::with_defaults(defaults, &overlay);

        assert_eq!(merged.get("ingressClass").unwrap(), "traefik");
        assert_eq!(merged.get("replicas").unwrap(), 2);
    }

    #[test]
    fn test_get_missing_path() {
        let values = Values::from_yaml("global:\n  baseDomain: x.test").unwrap();

        assert!(values.get("global.tlsCert").is_none());
        assert!(values.get("nothing.here").is_none());
    }

    #[test]
    fn test_is_empty() {
        assert!(Values::new().is_empty());
        assert!(!Values::from_yaml("a: 1").unwrap().is_empty());
    }
}
