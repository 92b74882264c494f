//! Result store boundary.
//!
//! Projects terminal task outcomes for asynchronous submitters, caches
//! per-task content identifiers so retries skip redundant re-pins, and
//! mirrors pinned record JSON for operator inspection.

mod redis;

pub use redis::RedisResultStore;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::TaskOutcome;

#[derive(Debug, Error)]
pub enum ResultStoreError {
    #[error("result store error: {0}")]
    Backend(String),
}

pub type ResultStoreResult<T> = Result<T, ResultStoreError>;

/// Key-value projection of task outcomes and retry bookkeeping.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Record the terminal outcome for a task, bounded by `ttl`.
    async fn set_result(&self, outcome: &TaskOutcome, ttl: Duration) -> ResultStoreResult<()>;

    /// Fetch the outcome for a task id, if still retained.
    async fn get_result(&self, task_id: &str) -> ResultStoreResult<Option<TaskOutcome>>;

    /// Cache the content identifier produced for a task, so a retry that
    /// already pinned does not re-upload.
    async fn cache_content_id(&self, task_id: &str, content_id: &str) -> ResultStoreResult<()>;

    async fn cached_content_id(&self, task_id: &str) -> ResultStoreResult<Option<String>>;

    /// Cache the complaint id the worker generated for a task, keeping
    /// the id stable across retries.
    async fn cache_assigned_id(&self, task_id: &str, assigned_id: &str) -> ResultStoreResult<()>;

    async fn cached_assigned_id(&self, task_id: &str) -> ResultStoreResult<Option<String>>;

    /// Mirror the pinned record JSON and its content id under the
    /// record's own id (`<kind>:json:<id>` / `<kind>:cid:<id>`).
    async fn store_record(
        &self,
        kind: &str,
        record_id: &str,
        json: &str,
        content_id: &str,
    ) -> ResultStoreResult<()>;
}
