//! Identifier and label value objects
//!
//! Value objects are immutable types compared by value rather than identity.
//! The destination store accepts heterogeneous element ids, so [`ElementId`]
//! mirrors that surface instead of forcing everything through a UUID.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Property bag attached to vertices and edges
pub type PropertyMap = HashMap<String, serde_json::Value>;

/// Identifier of a vertex or edge in the destination store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementId {
    /// A UUID identifier
    Uuid(uuid::Uuid),
    /// A string identifier
    String(String),
    /// A numeric identifier
    Long(i64),
}

impl ElementId {
    /// Create a fresh random (v4 UUID) identifier
    pub fn random() -> Self {
        ElementId::Uuid(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Uuid(id) => write!(f, "{id}"),
            ElementId::String(id) => write!(f, "{id}"),
            ElementId::Long(id) => write!(f, "{id}"),
        }
    }
}

impl From<uuid::Uuid> for ElementId {
    fn from(id: uuid::Uuid) -> Self {
        ElementId::Uuid(id)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        ElementId::String(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        ElementId::String(id)
    }
}

impl From<i64> for ElementId {
    fn from(id: i64) -> Self {
        ElementId::Long(id)
    }
}

/// A non-empty vertex or edge label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Create a label, rejecting empty or whitespace-only input
    pub fn new(label: impl Into<String>) -> Result<Self, InvalidLabel> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(InvalidLabel);
        }
        Ok(Label(label))
    }

    /// Get the string representation of the label
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned for an empty label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("label cannot be empty")]
pub struct InvalidLabel;
