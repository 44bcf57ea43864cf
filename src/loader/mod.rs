//! Bulk-load client seam
//!
//! A bulk loader owns the durable write path into the destination graph
//! store, including its own buffering and flush discipline. The edge writer
//! holds one exclusive client per task attempt and never makes batching
//! decisions of its own.

mod memory;

pub use memory::{InMemoryBulkLoader, MemoryLoaderFactory};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::OutputConfig;
use crate::context::GraphContext;
use crate::records::{EdgeValue, VertexValue};

/// Errors raised by a bulk-load client
#[derive(Debug, thiserror::Error)]
pub enum BulkLoadError {
    /// The client could not be constructed against the destination store
    #[error("failed to connect to destination store: {0}")]
    ConnectionFailed(String),

    /// The client has already been closed
    #[error("bulk loader is closed")]
    Closed,

    /// The store refused a vertex mutation
    #[error("vertex {id} rejected: {reason}")]
    VertexRejected {
        /// Id of the rejected vertex
        id: String,
        /// Store-side reason for the rejection
        reason: String,
    },

    /// The store refused an edge mutation
    #[error("edge {id} rejected: {reason}")]
    EdgeRejected {
        /// Id of the rejected edge
        id: String,
        /// Store-side reason for the rejection
        reason: String,
    },

    /// Setup or teardown was interrupted
    #[error("interrupted: {0}")]
    Interrupted(String),

    /// An I/O error from the underlying transport
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for bulk-load operations
pub type BulkLoadResult<T> = Result<T, BulkLoadError>;

/// Counters describing a loader's progress
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoaderStats {
    /// Mutations currently buffered and not yet applied
    pub pending: usize,
    /// Vertices applied to the store
    pub vertices_written: u64,
    /// Edges applied to the store
    pub edges_written: u64,
    /// Number of flushes performed
    pub flushes: u64,
    /// When the most recent flush completed
    pub last_flush: Option<DateTime<Utc>>,
}

/// A client that durably applies vertex and edge mutations to a graph store
#[async_trait]
pub trait BulkLoader: Send + Sync {
    /// The graph context this loader writes into
    fn graph(&self) -> Arc<GraphContext>;

    /// Queue a vertex mutation
    async fn add_vertex(&self, vertex: &VertexValue) -> BulkLoadResult<()>;

    /// Queue an edge mutation
    async fn add_edge(&self, edge: &EdgeValue) -> BulkLoadResult<()>;

    /// Apply all buffered mutations to the store
    async fn flush(&self) -> BulkLoadResult<()>;

    /// Flush remaining mutations and release the client
    ///
    /// Closing twice is a no-op; mutations submitted after close fail with
    /// [`BulkLoadError::Closed`].
    async fn close(&self) -> BulkLoadResult<()>;

    /// Current progress counters
    fn stats(&self) -> LoaderStats;
}

/// Builds a bulk-load client from job configuration
///
/// Construction failure is fatal for the task attempt and propagates to the
/// hosting framework unchanged.
#[async_trait]
pub trait BulkLoaderFactory: Send + Sync {
    /// Construct a client bound to the given configuration
    async fn create(&self, config: &OutputConfig) -> BulkLoadResult<Arc<dyn BulkLoader>>;
}
