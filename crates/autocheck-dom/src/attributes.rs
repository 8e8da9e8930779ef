//! Element Attributes
//!
//! Attribute storage with change records for observed attributes.

use std::collections::HashMap;

/// A change to an attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Attribute collection keyed by lowercase name
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    values: HashMap<String, String>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get attribute by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_ascii_lowercase())
    }

    /// Set an attribute. Returns the change, or `None` when the value is
    /// unchanged.
    pub fn set(&mut self, name: &str, value: &str) -> Option<AttributeChange> {
        let name = name.to_ascii_lowercase();
        let old_value = self.values.insert(name.clone(), value.to_string());
        if old_value.as_deref() == Some(value) {
            return None;
        }
        Some(AttributeChange {
            name,
            old_value,
            new_value: Some(value.to_string()),
        })
    }

    /// Remove an attribute. Returns the change, or `None` if it was absent.
    pub fn remove(&mut self, name: &str) -> Option<AttributeChange> {
        let name = name.to_ascii_lowercase();
        let old_value = self.values.remove(&name)?;
        Some(AttributeChange {
            name,
            old_value: Some(old_value),
            new_value: None,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
