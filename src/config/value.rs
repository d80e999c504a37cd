// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! The merged configuration store.

use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};

/// A configuration value: either a scalar or a nested section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    Section(Section),
}

impl Value {
    /// The scalar text, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Section(_) => None,
        }
    }

    /// The nested section, if this is a section.
    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Value::Scalar(_) => None,
            Value::Section(section) => Some(section),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Section> for Value {
    fn from(section: Section) -> Self {
        Value::Section(section)
    }
}

/// A mapping of keys to values, kept in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Section {
    entries: BTreeMap<String, Value>,
}

impl Section {
    /// Create an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a scalar value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get a nested section by key.
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.get(key).and_then(Value::as_section)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Scalar entries, in key order.
    pub fn scalars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }

    /// Nested sections, in key order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_section().map(|s| (k.as_str(), s)))
    }

    /// Merge `other` into this section.
    ///
    /// Keys present on both sides take the value from `other`, except when
    /// both values are sections, in which case they are merged recursively.
    pub fn merge(&mut self, other: Section) {
        for (key, incoming) in other.entries {
            match incoming {
                Value::Section(incoming) => match self.entries.get_mut(&key) {
                    Some(Value::Section(existing)) => existing.merge(incoming),
                    _ => {
                        self.entries.insert(key, Value::Section(incoming));
                    }
                },
                scalar => {
                    self.entries.insert(key, scalar);
                }
            }
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Section {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
