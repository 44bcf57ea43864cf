//! Per-record payloads delivered by the processing framework
//!
//! A [`VertexValue`] or [`EdgeValue`] is a transient, deserialized record,
//! not a persisted structure. An edge owns its two endpoint vertices as
//! distinct instances; the source vertex value delivered alongside an edge
//! record is yet another instance describing the same vertex.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ElementId, InvalidLabel, Label, PropertyMap};

/// A vertex record arriving from the upstream framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexValue {
    id: ElementId,
    label: Label,
    #[serde(default)]
    properties: PropertyMap,
}

impl VertexValue {
    /// Create a vertex value with the given id and label
    pub fn new(id: ElementId, label: impl Into<String>) -> Result<Self, InvalidLabel> {
        Ok(Self {
            id,
            label: Label::new(label)?,
            properties: PropertyMap::new(),
        })
    }

    /// Attach a property
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// The vertex id
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// The vertex label
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// The vertex properties
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

/// An edge record arriving from the upstream framework
///
/// The endpoints are owned copies; resolving them through a context-bound
/// edge (see [`Contextual`](crate::context::Contextual)) yields endpoint
/// views bound to the same graph context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeValue {
    id: ElementId,
    label: Label,
    out_vertex: VertexValue,
    in_vertex: VertexValue,
    #[serde(default)]
    properties: PropertyMap,
}

impl EdgeValue {
    /// Create an edge value from its endpoints
    pub fn new(
        id: ElementId,
        label: impl Into<String>,
        out_vertex: VertexValue,
        in_vertex: VertexValue,
    ) -> Result<Self, InvalidLabel> {
        Ok(Self {
            id,
            label: Label::new(label)?,
            out_vertex,
            in_vertex,
            properties: PropertyMap::new(),
        })
    }

    /// Attach a property
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// The edge id
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// The edge label
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// The source vertex of the edge
    pub fn out_vertex(&self) -> &VertexValue {
        &self.out_vertex
    }

    /// The destination vertex of the edge
    pub fn in_vertex(&self) -> &VertexValue {
        &self.in_vertex
    }

    /// The edge properties
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}
