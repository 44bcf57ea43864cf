//! End-to-end edge output integration tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use graph_bulk_output::{
    AppendEdgeHandler, BulkLoadResult, BulkLoader, Contextual, EdgeOutputFormat, EdgeValue,
    EdgeWriteHandler, EdgeWriter, ElementId, InMemoryBulkLoader, JobContext, MemoryLoaderFactory,
    OutputCommitter, OutputConfig, TaskAttemptContext, UpsertEdgeHandler, VertexValue,
};

fn person(id: &str, name: &str) -> VertexValue {
    VertexValue::new(ElementId::from(id), "person")
        .unwrap()
        .with_property("name", serde_json::json!(name))
}

fn knows(id: &str, out: VertexValue, inn: VertexValue) -> EdgeValue {
    EdgeValue::new(ElementId::from(id), "knows", out, inn)
        .unwrap()
        .with_property("since", serde_json::json!(2020))
}

fn job(graph: &str) -> JobContext {
    JobContext::new("load-edges", OutputConfig::new(graph, "memory://local"))
}

#[tokio::test]
async fn edges_flow_from_records_into_the_store() {
    let format = EdgeOutputFormat::new(
        Arc::new(MemoryLoaderFactory),
        Arc::new(UpsertEdgeHandler),
    );
    let job = job("social");
    format.check_output_specs(&job).unwrap();

    let task = TaskAttemptContext::new(&job, 0, 1);
    let mut writer = format.create_writer(&task).await.unwrap();
    writer.initialize(task.clone()).unwrap();

    let alice = person("alice", "Alice");
    let bob = person("bob", "Bob");
    let carol = person("carol", "Carol");

    writer
        .write(
            &ElementId::from("alice"),
            alice.clone(),
            knows("e1", alice.clone(), bob.clone()),
        )
        .await
        .unwrap();
    writer
        .write(
            &ElementId::from("bob"),
            bob.clone(),
            knows("e2", bob, carol),
        )
        .await
        .unwrap();
    writer.close().await.unwrap();

    let stats = writer.loader().stats();
    assert_eq!(stats.edges_written, 2);
    // alice and bob are upserted twice each across the two records
    assert_eq!(stats.vertices_written, 4);
    assert_eq!(stats.pending, 0);
    assert!(stats.flushes >= 1);
}

/// Handler recording its invocations for the one-record scenario
#[derive(Default)]
struct RecordingHandler {
    calls: Mutex<Vec<(ElementId, ElementId, bool)>>,
}

#[async_trait]
impl EdgeWriteHandler for RecordingHandler {
    async fn write_edge(
        &self,
        loader: &dyn BulkLoader,
        out_vertex: &Contextual<VertexValue>,
        edge: &Contextual<EdgeValue>,
    ) -> BulkLoadResult<()> {
        let graph = loader.graph();
        let all_bound = Arc::ptr_eq(out_vertex.context(), &graph)
            && Arc::ptr_eq(edge.context(), &graph)
            && Arc::ptr_eq(edge.out_vertex().context(), &graph)
            && Arc::ptr_eq(edge.in_vertex().context(), &graph);
        self.calls
            .lock()
            .push((out_vertex.id().clone(), edge.id().clone(), all_bound));
        Ok(())
    }
}

#[tokio::test]
async fn one_record_reaches_the_handler_once_with_context_bound() {
    let handler = Arc::new(RecordingHandler::default());
    let loader = Arc::new(
        InMemoryBulkLoader::connect(&OutputConfig::new("social", "memory://local")).unwrap(),
    );
    let mut writer = EdgeWriter::new(loader, Arc::clone(&handler) as Arc<dyn EdgeWriteHandler>);

    let job = job("social");
    writer
        .initialize(TaskAttemptContext::new(&job, 0, 1))
        .unwrap();

    let v = person("v", "Val");
    let w = person("w", "Wes");
    writer
        .write(&ElementId::from("v"), v.clone(), knows("e", v, w))
        .await
        .unwrap();
    writer.close().await.unwrap();

    let calls = handler.calls.lock();
    assert_eq!(calls.len(), 1);
    let (source, edge, all_bound) = calls[0].clone();
    assert_eq!(source, ElementId::from("v"));
    assert_eq!(edge, ElementId::from("e"));
    assert!(all_bound);
}

#[tokio::test]
async fn applied_graph_matches_the_written_records() {
    let loader = Arc::new(
        InMemoryBulkLoader::connect(
            &OutputConfig::new("social", "memory://local").with_flush_threshold(2),
        )
        .unwrap(),
    );
    let mut writer = EdgeWriter::new(
        Arc::clone(&loader) as Arc<dyn BulkLoader>,
        Arc::new(UpsertEdgeHandler),
    );

    let job = job("social");
    writer
        .initialize(TaskAttemptContext::new(&job, 2, 1))
        .unwrap();

    let alice = person("alice", "Alice");
    let bob = person("bob", "Bob");
    writer
        .write(
            &ElementId::from("alice"),
            alice.clone(),
            knows("e1", alice, bob),
        )
        .await
        .unwrap();
    writer.close().await.unwrap();

    assert_eq!(loader.vertex_count().await, 2);
    assert_eq!(loader.edge_count().await, 1);

    let (edge, out, inn) = loader.applied_edge(&ElementId::from("e1")).await.unwrap();
    assert_eq!(out, ElementId::from("alice"));
    assert_eq!(inn, ElementId::from("bob"));
    assert_eq!(edge.properties()["since"], serde_json::json!(2020));

    let applied = loader
        .applied_vertex(&ElementId::from("alice"))
        .await
        .unwrap();
    assert_eq!(applied.properties()["name"], serde_json::json!("Alice"));
}

#[tokio::test]
async fn job_level_commit_protocol_is_a_pass_through() {
    let format = EdgeOutputFormat::new(
        Arc::new(MemoryLoaderFactory),
        Arc::new(AppendEdgeHandler),
    );
    let job = job("social");
    let task = TaskAttemptContext::new(&job, 0, 1);

    let committer = format.output_committer(&task);
    committer.setup_job(&job).await.unwrap();
    assert!(!committer.needs_task_commit(&task));

    let mut writer = format.create_writer(&task).await.unwrap();
    writer.initialize(task.clone()).unwrap();
    writer.close().await.unwrap();

    committer.commit_task(&task).await.unwrap();
    committer.commit_job(&job).await.unwrap();
}
