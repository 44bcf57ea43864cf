//! In-memory bulk loader
//!
//! Reference implementation of [`BulkLoader`] used by tests and local runs.
//! Mutations are buffered in submission order and applied to a petgraph
//! stable graph on flush. The buffer flushes automatically once it reaches
//! the configured threshold; `close` flushes whatever remains.

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{BulkLoadError, BulkLoadResult, BulkLoader, BulkLoaderFactory, LoaderStats};
use crate::config::OutputConfig;
use crate::context::GraphContext;
use crate::records::{EdgeValue, VertexValue};
use crate::value_objects::ElementId;

/// Endpoint scheme accepted by the in-memory loader
const MEMORY_SCHEME: &str = "memory://";

/// A buffered mutation, applied in submission order
#[derive(Debug, Clone)]
enum Mutation {
    Vertex(VertexValue),
    Edge(EdgeValue),
}

#[derive(Debug, Default)]
struct Inner {
    buffer: Vec<Mutation>,
    graph: StableDiGraph<VertexValue, EdgeValue>,
    vertex_index: IndexMap<ElementId, NodeIndex>,
    edge_index: IndexMap<ElementId, EdgeIndex>,
    closed: bool,
}

impl Inner {
    /// Apply a single mutation. Vertices upsert by id; an edge requires both
    /// endpoints to exist, counting vertices applied earlier in the same
    /// batch.
    fn apply(&mut self, mutation: Mutation, stats: &mut LoaderStats) -> BulkLoadResult<()> {
        match mutation {
            Mutation::Vertex(vertex) => {
                match self.vertex_index.get(vertex.id()) {
                    Some(&index) => self.graph[index] = vertex,
                    None => {
                        let id = vertex.id().clone();
                        let index = self.graph.add_node(vertex);
                        self.vertex_index.insert(id, index);
                    }
                }
                stats.vertices_written += 1;
            }
            Mutation::Edge(edge) => {
                let out = self.require_vertex(edge.out_vertex().id(), edge.id())?;
                let inn = self.require_vertex(edge.in_vertex().id(), edge.id())?;
                match self.edge_index.get(edge.id()) {
                    Some(&index) => self.graph[index] = edge,
                    None => {
                        let id = edge.id().clone();
                        let index = self.graph.add_edge(out, inn, edge);
                        self.edge_index.insert(id, index);
                    }
                }
                stats.edges_written += 1;
            }
        }
        Ok(())
    }

    fn require_vertex(
        &self,
        vertex_id: &ElementId,
        edge_id: &ElementId,
    ) -> BulkLoadResult<NodeIndex> {
        self.vertex_index
            .get(vertex_id)
            .copied()
            .ok_or_else(|| BulkLoadError::EdgeRejected {
                id: edge_id.to_string(),
                reason: format!("endpoint vertex {vertex_id} does not exist"),
            })
    }
}

/// Bulk loader backed by an in-memory petgraph graph
#[derive(Debug)]
pub struct InMemoryBulkLoader {
    context: Arc<GraphContext>,
    flush_threshold: usize,
    inner: Mutex<Inner>,
    stats: parking_lot::RwLock<LoaderStats>,
}

impl InMemoryBulkLoader {
    /// Connect a loader to the configured destination
    ///
    /// Fails with [`BulkLoadError::ConnectionFailed`] unless the endpoint
    /// uses the `memory://` scheme.
    pub fn connect(config: &OutputConfig) -> BulkLoadResult<Self> {
        if !config.endpoint.starts_with(MEMORY_SCHEME) {
            return Err(BulkLoadError::ConnectionFailed(format!(
                "in-memory loader requires a {MEMORY_SCHEME} endpoint, got {}",
                config.endpoint
            )));
        }
        Ok(Self {
            context: Arc::new(GraphContext::from_config(config)),
            flush_threshold: config.flush_threshold.max(1),
            inner: Mutex::new(Inner::default()),
            stats: parking_lot::RwLock::new(LoaderStats::default()),
        })
    }

    /// Number of vertices applied to the destination graph
    pub async fn vertex_count(&self) -> usize {
        self.inner.lock().await.graph.node_count()
    }

    /// Number of edges applied to the destination graph
    pub async fn edge_count(&self) -> usize {
        self.inner.lock().await.graph.edge_count()
    }

    /// Look up an applied vertex by id
    pub async fn applied_vertex(&self, id: &ElementId) -> Option<VertexValue> {
        let inner = self.inner.lock().await;
        inner
            .vertex_index
            .get(id)
            .map(|&index| inner.graph[index].clone())
    }

    /// Look up an applied edge by id, returning it with its endpoint ids
    pub async fn applied_edge(&self, id: &ElementId) -> Option<(EdgeValue, ElementId, ElementId)> {
        let inner = self.inner.lock().await;
        let &index = inner.edge_index.get(id)?;
        let edge = inner.graph[index].clone();
        let out = edge.out_vertex().id().clone();
        let inn = edge.in_vertex().id().clone();
        Some((edge, out, inn))
    }

    async fn push(&self, mutation: Mutation) -> BulkLoadResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(BulkLoadError::Closed);
        }
        inner.buffer.push(mutation);
        self.stats.write().pending = inner.buffer.len();
        if inner.buffer.len() >= self.flush_threshold {
            self.flush_locked(&mut inner)?;
        }
        Ok(())
    }

    fn flush_locked(&self, inner: &mut Inner) -> BulkLoadResult<()> {
        if inner.buffer.is_empty() {
            return Ok(());
        }
        let batch: Vec<Mutation> = inner.buffer.drain(..).collect();
        let count = batch.len();
        let mut stats = *self.stats.read();
        for mutation in batch {
            inner.apply(mutation, &mut stats)?;
        }
        stats.flushes += 1;
        stats.last_flush = Some(Utc::now());
        stats.pending = 0;
        *self.stats.write() = stats;
        tracing::debug!(
            graph = %self.context.graph_name(),
            mutations = count,
            "flushed mutation batch"
        );
        Ok(())
    }
}

#[async_trait]
impl BulkLoader for InMemoryBulkLoader {
    fn graph(&self) -> Arc<GraphContext> {
        Arc::clone(&self.context)
    }

    async fn add_vertex(&self, vertex: &VertexValue) -> BulkLoadResult<()> {
        self.push(Mutation::Vertex(vertex.clone())).await
    }

    async fn add_edge(&self, edge: &EdgeValue) -> BulkLoadResult<()> {
        self.push(Mutation::Edge(edge.clone())).await
    }

    async fn flush(&self) -> BulkLoadResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(BulkLoadError::Closed);
        }
        self.flush_locked(&mut inner)
    }

    async fn close(&self) -> BulkLoadResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Ok(());
        }
        self.flush_locked(&mut inner)?;
        inner.closed = true;
        tracing::info!(
            graph = %self.context.graph_name(),
            vertices = self.stats.read().vertices_written,
            edges = self.stats.read().edges_written,
            "bulk loader closed"
        );
        Ok(())
    }

    fn stats(&self) -> LoaderStats {
        *self.stats.read()
    }
}

/// Factory producing [`InMemoryBulkLoader`] clients
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryLoaderFactory;

#[async_trait]
impl BulkLoaderFactory for MemoryLoaderFactory {
    async fn create(&self, config: &OutputConfig) -> BulkLoadResult<Arc<dyn BulkLoader>> {
        Ok(Arc::new(InMemoryBulkLoader::connect(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OutputConfig {
        OutputConfig::new("test", "memory://local")
    }

    fn vertex(id: &str) -> VertexValue {
        VertexValue::new(ElementId::from(id), "node").unwrap()
    }

    fn edge(id: &str, out: &str, inn: &str) -> EdgeValue {
        EdgeValue::new(ElementId::from(id), "link", vertex(out), vertex(inn)).unwrap()
    }

    #[tokio::test]
    async fn buffers_until_flush() {
        let loader = InMemoryBulkLoader::connect(&config()).unwrap();
        loader.add_vertex(&vertex("v1")).await.unwrap();
        assert_eq!(loader.vertex_count().await, 0);
        assert_eq!(loader.stats().pending, 1);

        loader.flush().await.unwrap();
        assert_eq!(loader.vertex_count().await, 1);
        let stats = loader.stats();
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.vertices_written, 1);
        assert_eq!(stats.flushes, 1);
        assert!(stats.last_flush.is_some());
    }

    #[tokio::test]
    async fn auto_flushes_at_threshold() {
        let loader =
            InMemoryBulkLoader::connect(&config().with_flush_threshold(2)).unwrap();
        loader.add_vertex(&vertex("v1")).await.unwrap();
        assert_eq!(loader.vertex_count().await, 0);
        loader.add_vertex(&vertex("v2")).await.unwrap();
        assert_eq!(loader.vertex_count().await, 2);
        assert_eq!(loader.stats().flushes, 1);
    }

    #[tokio::test]
    async fn edge_endpoints_may_arrive_in_the_same_batch() {
        let loader = InMemoryBulkLoader::connect(&config()).unwrap();
        loader.add_vertex(&vertex("v1")).await.unwrap();
        loader.add_vertex(&vertex("v2")).await.unwrap();
        loader.add_edge(&edge("e1", "v1", "v2")).await.unwrap();
        loader.close().await.unwrap();

        assert_eq!(loader.edge_count().await, 1);
        let (_, out, inn) = loader
            .applied_edge(&ElementId::from("e1"))
            .await
            .unwrap();
        assert_eq!(out, ElementId::from("v1"));
        assert_eq!(inn, ElementId::from("v2"));
    }

    #[tokio::test]
    async fn edge_with_missing_endpoint_is_rejected() {
        let loader = InMemoryBulkLoader::connect(&config()).unwrap();
        loader.add_edge(&edge("e1", "ghost", "v2")).await.unwrap();
        let err = loader.flush().await.unwrap_err();
        assert!(matches!(err, BulkLoadError::EdgeRejected { .. }));
    }

    #[tokio::test]
    async fn vertices_upsert_by_id() {
        let loader = InMemoryBulkLoader::connect(&config()).unwrap();
        loader.add_vertex(&vertex("v1")).await.unwrap();
        let updated = vertex("v1").with_property("name", serde_json::json!("alice"));
        loader.add_vertex(&updated).await.unwrap();
        loader.flush().await.unwrap();

        assert_eq!(loader.vertex_count().await, 1);
        let applied = loader.applied_vertex(&ElementId::from("v1")).await.unwrap();
        assert_eq!(applied.properties()["name"], serde_json::json!("alice"));
        // Both mutations were applied, in order
        assert_eq!(loader.stats().vertices_written, 2);
    }

    #[tokio::test]
    async fn close_flushes_and_is_idempotent() {
        let loader = InMemoryBulkLoader::connect(&config()).unwrap();
        loader.add_vertex(&vertex("v1")).await.unwrap();
        loader.close().await.unwrap();
        assert_eq!(loader.vertex_count().await, 1);

        // Second close is a no-op
        loader.close().await.unwrap();
        assert_eq!(loader.stats().flushes, 1);

        let err = loader.add_vertex(&vertex("v2")).await.unwrap_err();
        assert!(matches!(err, BulkLoadError::Closed));
    }

    #[tokio::test]
    async fn rejects_unsupported_endpoint_scheme() {
        let bad = OutputConfig::new("test", "store://remote");
        let err = InMemoryBulkLoader::connect(&bad).unwrap_err();
        assert!(matches!(err, BulkLoadError::ConnectionFailed(_)));
    }
}
