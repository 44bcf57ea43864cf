//! Edge-writer adapter
//!
//! Bridges the processing framework's per-edge output callbacks into calls
//! against a bulk-load client. The adapter owns no batching, retry, or
//! concurrency logic; it binds each record to the task's graph context and
//! delegates the actual store operation to an [`EdgeWriteHandler`].
//!
//! Lifecycle is an explicit state machine: constructed, initialized, zero or
//! more writes, closed. Out-of-order calls are rejected with
//! [`EdgeWriterError::InvalidTransition`] instead of being left undefined.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::context::{Contextual, GraphContext};
use crate::loader::{BulkLoadError, BulkLoadResult, BulkLoader};
use crate::output::TaskAttemptContext;
use crate::records::{EdgeValue, VertexValue};
use crate::value_objects::ElementId;

/// Capability to write one edge to the destination store
///
/// Implementations decide the concrete write semantics: which store
/// operations to issue, what the source vertex contributes, how properties
/// map. The adapter guarantees both arguments are bound to the task's graph
/// context before this is called.
#[async_trait]
pub trait EdgeWriteHandler: Send + Sync {
    /// Write one edge via the given loader
    async fn write_edge(
        &self,
        loader: &dyn BulkLoader,
        out_vertex: &Contextual<VertexValue>,
        edge: &Contextual<EdgeValue>,
    ) -> BulkLoadResult<()>;
}

/// Handler that upserts both endpoint vertices before the edge
///
/// The delivered source vertex value (which may carry more properties than
/// the edge's own endpoint copy) is written for the source side; the edge's
/// destination endpoint is written as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertEdgeHandler;

#[async_trait]
impl EdgeWriteHandler for UpsertEdgeHandler {
    async fn write_edge(
        &self,
        loader: &dyn BulkLoader,
        out_vertex: &Contextual<VertexValue>,
        edge: &Contextual<EdgeValue>,
    ) -> BulkLoadResult<()> {
        loader.add_vertex(out_vertex.value()).await?;
        loader.add_vertex(edge.in_vertex().value()).await?;
        loader.add_edge(edge.value()).await
    }
}

/// Handler that writes only the edge, assuming endpoints already exist
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendEdgeHandler;

#[async_trait]
impl EdgeWriteHandler for AppendEdgeHandler {
    async fn write_edge(
        &self,
        loader: &dyn BulkLoader,
        _out_vertex: &Contextual<VertexValue>,
        edge: &Contextual<EdgeValue>,
    ) -> BulkLoadResult<()> {
        loader.add_edge(edge.value()).await
    }
}

/// Lifecycle states of an [`EdgeWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Created, not yet initialized by the framework
    Constructed,
    /// Initialized with a task attempt context
    Initialized,
    /// At least one write has been delivered
    Writing,
    /// Closed; the loader has been released
    Closed,
}

impl WriterState {
    /// Get the string representation of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            WriterState::Constructed => "constructed",
            WriterState::Initialized => "initialized",
            WriterState::Writing => "writing",
            WriterState::Closed => "closed",
        }
    }
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by the edge writer
#[derive(Debug, thiserror::Error)]
pub enum EdgeWriterError {
    /// A lifecycle operation arrived out of order
    #[error("cannot {operation} while writer is {state}")]
    InvalidTransition {
        /// State the writer was in
        state: WriterState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// A failure surfaced from the handler or the loader, unchanged
    #[error(transparent)]
    Load(#[from] BulkLoadError),
}

/// Result type for edge-writer operations
pub type EdgeWriterResult<T> = Result<T, EdgeWriterError>;

/// Adapter translating per-edge output callbacks into bulk-load calls
///
/// One writer runs single-threaded within one task attempt and owns its
/// loader exclusively for that attempt. Writes are delegated in the exact
/// order they are delivered.
pub struct EdgeWriter {
    loader: Arc<dyn BulkLoader>,
    graph: Arc<GraphContext>,
    handler: Arc<dyn EdgeWriteHandler>,
    task_context: Option<TaskAttemptContext>,
    state: WriterState,
}

impl std::fmt::Debug for EdgeWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeWriter")
            .field("graph", &self.graph)
            .field("task_context", &self.task_context)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl EdgeWriter {
    /// Create a writer over an already-constructed loader
    ///
    /// The graph context is derived from the loader; client construction
    /// itself happens in the [`BulkLoaderFactory`](crate::loader::BulkLoaderFactory)
    /// and its failure aborts the task attempt before a writer exists.
    pub fn new(loader: Arc<dyn BulkLoader>, handler: Arc<dyn EdgeWriteHandler>) -> Self {
        let graph = loader.graph();
        Self {
            loader,
            graph,
            handler,
            task_context: None,
            state: WriterState::Constructed,
        }
    }

    /// Store the task attempt context for later diagnostic use
    ///
    /// Performs no I/O. Valid only once, before any write.
    pub fn initialize(&mut self, context: TaskAttemptContext) -> EdgeWriterResult<()> {
        if self.state != WriterState::Constructed {
            return Err(EdgeWriterError::InvalidTransition {
                state: self.state,
                operation: "initialize",
            });
        }
        self.task_context = Some(context);
        self.state = WriterState::Initialized;
        Ok(())
    }

    /// Write one (source vertex, edge) record
    ///
    /// Binds the source vertex value and the edge value to the task's graph
    /// context, then invokes the handler exactly once with the loader and
    /// the two bound objects. Performs no validation of its own; handler and
    /// loader failures propagate unchanged.
    pub async fn write(
        &mut self,
        source_id: &ElementId,
        source_vertex: VertexValue,
        edge: EdgeValue,
    ) -> EdgeWriterResult<()> {
        match self.state {
            WriterState::Initialized | WriterState::Writing => {}
            state => {
                return Err(EdgeWriterError::InvalidTransition {
                    state,
                    operation: "write",
                })
            }
        }
        self.state = WriterState::Writing;
        tracing::trace!(source = %source_id, edge = %edge.id(), "writing edge");
        let out_vertex = Contextual::new(source_vertex, Arc::clone(&self.graph));
        let edge = Contextual::new(edge, Arc::clone(&self.graph));
        self.handler
            .write_edge(self.loader.as_ref(), &out_vertex, &edge)
            .await?;
        Ok(())
    }

    /// Flush and release the loader
    ///
    /// Valid from any state; closing an already-closed writer is a no-op.
    /// Failures from the loader's flush propagate unchanged.
    pub async fn close(&mut self) -> EdgeWriterResult<()> {
        if self.state == WriterState::Closed {
            return Ok(());
        }
        self.loader.close().await?;
        self.state = WriterState::Closed;
        tracing::debug!(graph = %self.graph.graph_name(), "edge writer closed");
        Ok(())
    }

    /// The bulk-load client held by this writer
    pub fn loader(&self) -> &Arc<dyn BulkLoader> {
        &self.loader
    }

    /// The graph context shared by every record this writer processes
    pub fn graph(&self) -> &Arc<GraphContext> {
        &self.graph
    }

    /// The task attempt context stored by `initialize`, if any
    pub fn task_context(&self) -> Option<&TaskAttemptContext> {
        self.task_context.as_ref()
    }

    /// Current lifecycle state
    pub fn state(&self) -> WriterState {
        self.state
    }
}
