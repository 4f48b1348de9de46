//! Structured key/value data loaded from YAML (or TOML) bytes.
//!
//! `ConfigTree` is the merge-and-unmarshal layer: trees merge
//! recursively with the later tree winning, and a named top-level
//! section can be deserialized into any `serde` type.
//!
//! String keys are lowercased at every level on load, so `Develop:` in one
//! source and `develop:` in another name the same section.

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::errors::{CredentialsError, Result};

/// A parsed configuration document whose root is a mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    root: Mapping,
}

impl ConfigTree {
    /// Parse YAML bytes.  An empty document yields an empty tree.
    pub fn from_yaml(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_yaml::from_slice(bytes)
            .map_err(|e| CredentialsError::Parse(format!("While parsing config: {e}")))?;
        Self::from_value(value)
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let table: toml::Value = toml::from_str(text)
            .map_err(|e| CredentialsError::Parse(format!("While parsing config: {e}")))?;
        let value = serde_yaml::to_value(table)
            .map_err(|e| CredentialsError::Parse(format!("While converting config: {e}")))?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(root) => Ok(Self {
                root: lowercase_keys(root),
            }),
            other => Err(CredentialsError::Parse(format!(
                "top level must be a mapping, found {}",
                kind_name(&other)
            ))),
        }
    }

    /// Merge `overlay` into this tree.  Nested mappings merge key by key;
    /// any other value in `overlay` replaces the existing one.
    pub fn merge(&mut self, overlay: ConfigTree) {
        for (key, value) in overlay.root {
            match self.root.get_mut(&key) {
                Some(existing) => merge_value(existing, value),
                None => {
                    self.root.insert(key, value);
                }
            }
        }
    }

    /// Look up a top-level section, ignoring ASCII case in the key.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.root.iter().find_map(|(key, value)| match key {
            Value::String(k) if k.eq_ignore_ascii_case(name) => Some(value),
            _ => None,
        })
    }

    /// Deserialize the section `name` into `T`.
    pub fn unmarshal_section<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .section(name)
            .ok_or_else(|| CredentialsError::Unmarshal(format!("section '{name}' not found")))?;
        serde_yaml::from_value(value.clone()).map_err(|e| CredentialsError::Unmarshal(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn merge_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn lowercase_keys(mapping: Mapping) -> Mapping {
    let mut out = Mapping::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            Value::String(k) => Value::String(k.to_lowercase()),
            other => other,
        };
        let value = match value {
            Value::Mapping(inner) => Value::Mapping(lowercase_keys(inner)),
            other => other,
        };
        match out.get_mut(&key) {
            Some(existing) => merge_value(existing, value),
            None => {
                out.insert(key, value);
            }
        }
    }
    out
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
