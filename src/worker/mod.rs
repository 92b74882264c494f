//! Worker loop: pops tasks, dispatches to handlers, applies retry
//! policy, and projects terminal outcomes into the result store.
//!
//! One logical consumer per process. All I/O is an await point; no task
//! is processed concurrently with another within one worker. Horizontal
//! scale-out runs more processes against the same queue and relies on
//! the queue's atomic pop for mutual exclusion.

mod complaint;
mod lifecycle;
mod user;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{Config, RETRY_LIMIT};
use crate::ledger::{LedgerClient, LedgerError, LedgerResult, RejectionReason};
use crate::models::{Task, TaskOutcome, TaskPayload};
use crate::pinner::ContentPinner;
use crate::queue::{queue_for, PoppedTask, QueueError, TaskQueue, DEAD_LETTER_QUEUE, POLL_ORDER};
use crate::results::ResultStore;

/// How a single handler attempt failed.
///
/// Every handler error is converted to one of these before reaching the
/// loop; the loop's retry counter is reserved for `Transient`.
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// Malformed or incomplete payload, or a deterministic ledger
    /// rejection. Recorded FAILED immediately, never retried.
    #[error("{0}")]
    Validation(String),

    /// Infrastructure failure (queue, pinner, ledger node). Retried up
    /// to the ceiling with tail re-enqueue.
    #[error("{0}")]
    Transient(String),
}

/// Result of one handler attempt: the off-ledger content id, when the
/// task produced one.
pub type HandlerResult = Result<Option<String>, TaskFailure>;

/// Loop-level worker settings, derived from [`Config`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    pub result_ttl: Duration,
    pub default_state: String,
}

impl From<&Config> for WorkerConfig {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval,
            result_ttl: config.result_ttl,
            default_state: config.default_state.clone(),
        }
    }
}

/// Owned worker context: queue, collaborators, and the running flag.
pub struct Worker {
    queue: Arc<dyn TaskQueue>,
    pinner: Arc<dyn ContentPinner>,
    ledger: Arc<dyn LedgerClient>,
    results: Arc<dyn ResultStore>,
    config: WorkerConfig,
    running: AtomicBool,
}

impl Worker {
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        pinner: Arc<dyn ContentPinner>,
        ledger: Arc<dyn LedgerClient>,
        results: Arc<dyn ResultStore>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            queue,
            pinner,
            ledger,
            results,
            config,
            running: AtomicBool::new(true),
        }
    }

    /// Request shutdown. The loop finishes the task currently in flight
    /// and then exits; nothing is dropped mid-attempt.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run until [`shutdown`](Self::shutdown) is called.
    ///
    /// Bookkeeping errors (queue connectivity) never terminate the loop;
    /// they are logged and the loop backs off one poll interval.
    pub async fn run(&self) {
        tracing::info!("worker started");
        while self.is_running() {
            match self.poll_once().await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::trace!("no task within poll window");
                }
                Err(e) => {
                    tracing::error!(error = %e, "worker loop error, backing off");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
        tracing::info!("worker stopped");
    }

    /// Poll the category queues once in priority order and process at
    /// most one task. Returns whether a task was processed.
    pub async fn poll_once(&self) -> Result<bool, QueueError> {
        let popped = self
            .queue
            .pop_any(&POLL_ORDER, self.config.poll_interval)
            .await?;

        match popped {
            Some(task) => {
                self.process(task).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drive one popped task through its handler and record the outcome.
    /// Never lets an error escape; a failure here resolves the task, not
    /// the loop.
    async fn process(&self, popped: PoppedTask) {
        let task: Task = match serde_json::from_str(&popped.raw) {
            Ok(task) => task,
            Err(e) => {
                self.reject_malformed(&popped.raw, &e.to_string()).await;
                return;
            }
        };

        let category = task.payload.category();
        tracing::info!(
            task_id = %task.id,
            category = category.as_str(),
            retry_count = task.retry_count,
            "processing task"
        );

        let result = match &task.payload {
            TaskPayload::UserRegistration(record) => {
                self.handle_user_registration(&task.id, record).await
            }
            TaskPayload::ComplaintRegistration(record) => {
                self.handle_complaint_registration(&task.id, record).await
            }
            TaskPayload::StatusUpdate(payload) => {
                self.handle_status_update(&task.id, payload).await
            }
            TaskPayload::Assignment(payload) => self.handle_assignment(&task.id, payload).await,
            TaskPayload::Resolution(payload) => self.handle_resolution(&task.id, payload).await,
        };

        match result {
            Ok(content_id) => {
                tracing::info!(task_id = %task.id, "task succeeded");
                self.record_outcome(TaskOutcome::success(&task.id, content_id))
                    .await;
            }
            Err(TaskFailure::Validation(message)) => {
                tracing::warn!(task_id = %task.id, error = %message, "task failed validation");
                self.record_outcome(TaskOutcome::failed(&task.id, &message))
                    .await;
            }
            Err(TaskFailure::Transient(message)) => {
                self.retry_or_fail(task, &message).await;
            }
        }
    }

    /// Tail re-enqueue below the retry ceiling; terminal FAILED at it.
    async fn retry_or_fail(&self, mut task: Task, message: &str) {
        if task.retry_count < RETRY_LIMIT {
            task.retry_count += 1;
            let queue = queue_for(task.payload.category());
            tracing::warn!(
                task_id = %task.id,
                retry_count = task.retry_count,
                error = %message,
                "transient failure, re-enqueueing"
            );

            let raw = match serde_json::to_string(&task) {
                Ok(raw) => raw,
                Err(e) => {
                    self.record_outcome(TaskOutcome::failed(
                        &task.id,
                        &format!("failed to re-enqueue: {}", e),
                    ))
                    .await;
                    return;
                }
            };

            if let Err(e) = self.queue.push(queue, &raw).await {
                // Re-enqueue failed; record the loss rather than drop silently.
                self.record_outcome(TaskOutcome::failed(
                    &task.id,
                    &format!("failed to re-enqueue after transient error ({}): {}", message, e),
                ))
                .await;
            }
        } else {
            tracing::error!(
                task_id = %task.id,
                retry_count = task.retry_count,
                error = %message,
                "retry ceiling reached, recording failure"
            );
            self.record_outcome(TaskOutcome::failed(&task.id, message))
                .await;
        }
    }

    /// A task envelope that does not parse (unknown category, malformed
    /// fields) cannot be fixed by retrying.
    async fn reject_malformed(&self, raw: &str, error: &str) {
        let task_id = serde_json::from_str::<serde_json::Value>(raw)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str().map(String::from)));

        match task_id {
            Some(id) => {
                tracing::warn!(task_id = %id, error = %error, "rejecting malformed task");
                self.record_outcome(TaskOutcome::failed(
                    &id,
                    &format!("malformed task envelope: {}", error),
                ))
                .await;
            }
            None => {
                // No id means no result-store entry will ever exist for
                // this task; park the raw envelope where an operator can
                // still find it.
                tracing::error!(error = %error, raw, "malformed task without an id, dead-lettering");
                if let Err(e) = self.queue.push(DEAD_LETTER_QUEUE, raw).await {
                    tracing::error!(error = %e, raw, "failed to dead-letter malformed task");
                }
            }
        }
    }

    async fn record_outcome(&self, outcome: TaskOutcome) {
        if let Err(e) = self
            .results
            .set_result(&outcome, self.config.result_ttl)
            .await
        {
            tracing::error!(task_id = %outcome.task_id, error = %e, "failed to record outcome");
        }
    }

    /// Pin record JSON, reusing the cached content id from an earlier
    /// attempt of the same task when present.
    pub(crate) async fn pin_with_cache(
        &self,
        task_id: &str,
        json: &str,
    ) -> Result<String, TaskFailure> {
        match self.results.cached_content_id(task_id).await {
            Ok(Some(content_id)) => {
                tracing::debug!(task_id, content_id = %content_id, "reusing cached content id");
                return Ok(content_id);
            }
            Ok(None) => {}
            Err(e) => {
                // Cache miss on error: re-pinning identical content is safe.
                tracing::warn!(task_id, error = %e, "content id cache lookup failed");
            }
        }

        let content_id = self
            .pinner
            .pin(json.as_bytes().to_vec(), "data.json")
            .await
            .map_err(|e| TaskFailure::Transient(e.to_string()))?;

        if let Err(e) = self.results.cache_content_id(task_id, &content_id).await {
            tracing::warn!(task_id, error = %e, "failed to cache content id");
        }

        Ok(content_id)
    }

    pub(crate) fn results(&self) -> &dyn ResultStore {
        self.results.as_ref()
    }

    pub(crate) fn ledger(&self) -> &dyn LedgerClient {
        self.ledger.as_ref()
    }

    pub(crate) fn default_state(&self) -> &str {
        &self.config.default_state
    }
}

/// Map a ledger submission result to the handler taxonomy. An
/// `AlreadyExists` rejection means the desired end state already holds
/// and resolves as success.
pub(crate) fn settle_ledger_write(
    result: LedgerResult,
    entity: &str,
    id: &str,
) -> Result<(), TaskFailure> {
    match result {
        Ok(receipt) => {
            tracing::info!(
                entity,
                id,
                block = receipt.block_number,
                tx = %receipt.tx_hash,
                "ledger write included"
            );
            Ok(())
        }
        Err(LedgerError::Rejected(RejectionReason::AlreadyExists)) => {
            tracing::info!(entity, id, "already on ledger, treating as success");
            Ok(())
        }
        Err(LedgerError::Rejected(reason)) => Err(TaskFailure::Validation(format!(
            "ledger rejected {} {}: {}",
            entity, id, reason
        ))),
        Err(LedgerError::Transient(message)) => Err(TaskFailure::Transient(message)),
    }
}
