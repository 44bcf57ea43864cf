//! Graph context and context binding
//!
//! A [`GraphContext`] identifies which backing store a vertex or edge object
//! belongs to. Every object processed within one task attempt shares a single
//! context, created by the bulk-load client at construction time.
//!
//! Rather than mutating a graph reference on each value object before use,
//! which leaves "context must be set" as an implicit precondition,
//! [`Contextual`] wraps the value together with its context: the write path
//! only ever hands out context-bound values, so the precondition holds by
//! construction.

use chrono::{DateTime, Utc};
use std::ops::Deref;
use std::sync::Arc;

use crate::config::OutputConfig;
use crate::records::{EdgeValue, VertexValue};

/// Handle identifying the destination graph store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphContext {
    graph_name: String,
    endpoint: String,
    created_at: DateTime<Utc>,
}

impl GraphContext {
    /// Create a context from the job configuration
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            graph_name: config.graph_name.clone(),
            endpoint: config.endpoint.clone(),
            created_at: Utc::now(),
        }
    }

    /// Name of the destination graph
    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    /// Connection endpoint of the destination store
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// When this context was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A value bound to the graph context it belongs to
#[derive(Debug, Clone)]
pub struct Contextual<T> {
    value: T,
    context: Arc<GraphContext>,
}

impl<T> Contextual<T> {
    /// Bind a value to a graph context
    pub fn new(value: T, context: Arc<GraphContext>) -> Self {
        Self { value, context }
    }

    /// The graph context this value belongs to
    pub fn context(&self) -> &Arc<GraphContext> {
        &self.context
    }

    /// The wrapped value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Unwrap the value, discarding the binding
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Contextual<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl Contextual<EdgeValue> {
    /// The edge's source vertex, bound to the same context
    ///
    /// The endpoint is a distinct instance from any vertex value delivered
    /// alongside the edge, so it carries its own binding.
    pub fn out_vertex(&self) -> Contextual<&VertexValue> {
        Contextual::new(self.value.out_vertex(), Arc::clone(&self.context))
    }

    /// The edge's destination vertex, bound to the same context
    pub fn in_vertex(&self) -> Contextual<&VertexValue> {
        Contextual::new(self.value.in_vertex(), Arc::clone(&self.context))
    }
}
