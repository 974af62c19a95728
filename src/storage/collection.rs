//! Collection model
//!
//! An ordered list of elements with unique keys. Lookups are linear scans;
//! collections are expected to be small.

use serde::{Deserialize, Deserializer, Serialize};

/// A single key-value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub key: String,
    pub value: String,
}

impl Element {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A named collection of elements in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name
    #[serde(rename = "collection", default)]
    pub name: String,

    /// Elements, no two sharing a key
    #[serde(rename = "element", default, deserialize_with = "nullable_elements")]
    pub elements: Vec<Element>,
}

// Older snapshots may store an empty element list as `null`
fn nullable_elements<'de, D>(deserializer: D) -> std::result::Result<Vec<Element>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Element>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Collection {
    /// Create an empty collection with the given name
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Find the value stored under `key`
    pub fn find(&self, key: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Insert or overwrite `key`
    ///
    /// An existing element keeps its position; a new one is appended.
    pub fn upsert(&mut self, key: &str, value: &str) {
        match self.elements.iter_mut().find(|e| e.key == key) {
            Some(element) => element.value = value.to_string(),
            None => self.elements.push(Element::new(key, value)),
        }
    }

    /// Remove the first element with `key`, keeping the order of the rest
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.elements.iter().position(|e| e.key == key) {
            Some(idx) => {
                self.elements.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Keys in stored order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
