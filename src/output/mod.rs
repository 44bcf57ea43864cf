//! Edge output format and commit protocol
//!
//! The framework-facing surface: job and task attempt contexts, the format
//! that manufactures one [`EdgeWriter`](crate::writer::EdgeWriter) per task
//! attempt, and the output-commit strategy. Writes go straight to the
//! destination store through the bulk loader, so the committer is the
//! store's own protocol with no custom two-phase logic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::OutputConfig;
use crate::loader::{BulkLoadResult, BulkLoaderFactory};
use crate::writer::{EdgeWriteHandler, EdgeWriter};

/// Execution context of one job
#[derive(Debug, Clone)]
pub struct JobContext {
    job_id: Uuid,
    job_name: String,
    config: OutputConfig,
    submitted_at: DateTime<Utc>,
}

impl JobContext {
    /// Create a job context with a fresh job id
    pub fn new(job_name: impl Into<String>, config: OutputConfig) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            job_name: job_name.into(),
            config,
            submitted_at: Utc::now(),
        }
    }

    /// The job id
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// The job name
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// The job's output configuration
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// When the job was submitted
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// Execution context of one task attempt within a job
#[derive(Debug, Clone)]
pub struct TaskAttemptContext {
    job_id: Uuid,
    task_index: u32,
    attempt: u32,
    config: OutputConfig,
    started_at: DateTime<Utc>,
}

impl TaskAttemptContext {
    /// Create an attempt context for a task of the given job
    pub fn new(job: &JobContext, task_index: u32, attempt: u32) -> Self {
        Self {
            job_id: job.job_id(),
            task_index,
            attempt,
            config: job.config().clone(),
            started_at: Utc::now(),
        }
    }

    /// The owning job's id
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Index of the task within the job
    pub fn task_index(&self) -> u32 {
        self.task_index
    }

    /// Attempt number, starting at 1
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The configuration forwarded to the bulk-load client
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// When this attempt started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Stable diagnostic identifier for this attempt
    pub fn attempt_id(&self) -> String {
        format!(
            "attempt_{}_{:05}_{}",
            self.job_id.simple(),
            self.task_index,
            self.attempt
        )
    }
}

/// Protocol deciding whether a task or job's writes are finalized
#[async_trait]
pub trait OutputCommitter: Send + Sync {
    /// Prepare the destination for the job
    async fn setup_job(&self, job: &JobContext) -> BulkLoadResult<()>;

    /// Whether task output needs an explicit commit step
    fn needs_task_commit(&self, task: &TaskAttemptContext) -> bool;

    /// Finalize one task attempt's output
    async fn commit_task(&self, task: &TaskAttemptContext) -> BulkLoadResult<()>;

    /// Discard one task attempt's output
    async fn abort_task(&self, task: &TaskAttemptContext) -> BulkLoadResult<()>;

    /// Finalize the job's output
    async fn commit_job(&self, job: &JobContext) -> BulkLoadResult<()>;

    /// Discard the job's output
    async fn abort_job(&self, job: &JobContext) -> BulkLoadResult<()>;
}

/// The destination store's standard commit protocol
///
/// Mutations reach the store as the loader flushes them; there is nothing to
/// move or rename at commit time. Every hook is a no-op and no task commit
/// step is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOutputCommitter;

#[async_trait]
impl OutputCommitter for StoreOutputCommitter {
    async fn setup_job(&self, job: &JobContext) -> BulkLoadResult<()> {
        tracing::debug!(job = %job.job_name(), "output setup (direct store writes)");
        Ok(())
    }

    fn needs_task_commit(&self, _task: &TaskAttemptContext) -> bool {
        false
    }

    async fn commit_task(&self, _task: &TaskAttemptContext) -> BulkLoadResult<()> {
        Ok(())
    }

    async fn abort_task(&self, task: &TaskAttemptContext) -> BulkLoadResult<()> {
        tracing::debug!(attempt = %task.attempt_id(), "task attempt aborted");
        Ok(())
    }

    async fn commit_job(&self, _job: &JobContext) -> BulkLoadResult<()> {
        Ok(())
    }

    async fn abort_job(&self, job: &JobContext) -> BulkLoadResult<()> {
        tracing::debug!(job = %job.job_name(), "job aborted");
        Ok(())
    }
}

/// Format that wires edge output into a bulk-loaded graph store
///
/// Holds the loader factory and the edge-write capability; manufactures one
/// writer (with its own exclusive loader) per task attempt.
pub struct EdgeOutputFormat {
    factory: Arc<dyn BulkLoaderFactory>,
    handler: Arc<dyn EdgeWriteHandler>,
}

impl EdgeOutputFormat {
    /// Create a format from a loader factory and a write handler
    pub fn new(factory: Arc<dyn BulkLoaderFactory>, handler: Arc<dyn EdgeWriteHandler>) -> Self {
        Self { factory, handler }
    }

    /// Validate the job's output specification
    ///
    /// The destination store accepts any job configuration; this always
    /// succeeds.
    pub fn check_output_specs(&self, _job: &JobContext) -> BulkLoadResult<()> {
        Ok(())
    }

    /// The commit strategy for this output
    pub fn output_committer(&self, _task: &TaskAttemptContext) -> StoreOutputCommitter {
        StoreOutputCommitter
    }

    /// Construct a writer for one task attempt
    ///
    /// Builds a bulk-load client from the attempt's configuration; a failed
    /// construction aborts the attempt and the error propagates unchanged.
    pub async fn create_writer(&self, task: &TaskAttemptContext) -> BulkLoadResult<EdgeWriter> {
        let loader = self.factory.create(task.config()).await?;
        Ok(EdgeWriter::new(loader, Arc::clone(&self.handler)))
    }
}
