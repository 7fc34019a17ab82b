use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys owned by the entity itself; never writable through attributes
pub const PROTECTED_KEYS: [&str; 4] = ["id", "created_at", "updated_at", "__class__"];

/// Check whether a key is reserved for identity, timestamps or the type tag
pub fn is_protected(key: &str) -> bool {
    PROTECTED_KEYS.contains(&key)
}

/// Schemaless key/value bag holding type-specific entity fields
///
/// Values are JSON values (strings, integers, floats, lists). Keys iterate in
/// sorted order so rendering and serialization are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Attributes {
    data: BTreeMap<String, Value>,
}

impl Attributes {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Set a value by key
    ///
    /// Returns `false` (and leaves the bag untouched) for protected keys.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if key.is_empty() || is_protected(&key) {
            return false;
        }
        self.data.insert(key, value);
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl FromIterator<(String, Value)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

impl IntoIterator for Attributes {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}
