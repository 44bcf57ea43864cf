//! Edge output adapter for bulk-loading graph stores
//!
//! This crate bridges a distributed graph-processing job's per-edge output
//! callbacks to a graph store's bulk-loading API. The processing framework
//! delivers (source vertex, edge) records one at a time; the adapter binds
//! each record to the task's graph context and delegates the actual store
//! operation to a pluggable edge-write capability backed by a bulk-load
//! client. Batching, durability, and commit semantics belong to the client
//! and the store, not to this layer.

pub mod config;
pub mod context;
pub mod loader;
pub mod output;
pub mod records;
pub mod value_objects;
pub mod writer;

// Re-export configuration
pub use config::OutputConfig;

// Re-export context binding
pub use context::{Contextual, GraphContext};

// Re-export the bulk-load seam
pub use loader::{
    BulkLoadError, BulkLoadResult, BulkLoader, BulkLoaderFactory, InMemoryBulkLoader,
    LoaderStats, MemoryLoaderFactory,
};

// Re-export the framework-facing surface
pub use output::{
    EdgeOutputFormat, JobContext, OutputCommitter, StoreOutputCommitter, TaskAttemptContext,
};

// Re-export record payloads
pub use records::{EdgeValue, VertexValue};

// Re-export identifiers
pub use value_objects::{ElementId, InvalidLabel, Label, PropertyMap};

// Re-export the writer and its extension seam
pub use writer::{
    AppendEdgeHandler, EdgeWriteHandler, EdgeWriter, EdgeWriterError, EdgeWriterResult,
    UpsertEdgeHandler, WriterState,
};
