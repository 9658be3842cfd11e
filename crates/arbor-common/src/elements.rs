//! Element trees.
//!
//! The rendering engine yields a mapping from named slots to renderable
//! nodes. Nodes are opaque to this layer; they only become meaningful once
//! the encoder serializes them. Top-level keys starting with `_` are
//! reserved: the dispatcher injects the action return value under
//! [`ACTION_VALUE_KEY`] and nothing else may occupy that namespace.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix reserved for slots injected by the protocol itself.
pub const RESERVED_PREFIX: &str = "_";

/// Slot under which a POST render carries the action's return value.
pub const ACTION_VALUE_KEY: &str = "_value";

/// A renderable node, opaque at this layer.
pub type Element = Value;

/// A mapping of named slots to renderable nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Elements {
    slots: Map<String, Element>,
}

impl Elements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, element: Element) {
        self.slots.insert(key.into(), element);
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.slots.get(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.slots.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Element)> {
        self.slots.iter()
    }

    /// Folds `newer` into this tree, newer entries overwriting existing keys
    /// on conflict.
    pub fn merge(&mut self, newer: Elements) {
        for (key, element) in newer.slots {
            self.slots.insert(key, element);
        }
    }

    /// Whether any top-level key violates the reserved `_` prefix.
    pub fn has_reserved_key(&self) -> bool {
        self.slots.keys().any(|key| key.starts_with(RESERVED_PREFIX))
    }
}

impl From<Map<String, Element>> for Elements {
    fn from(slots: Map<String, Element>) -> Self {
        Self { slots }
    }
}

impl FromIterator<(String, Element)> for Elements {
    fn from_iter<I: IntoIterator<Item = (String, Element)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Elements {
    type Item = (String, Element);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}
