//! Task queue boundary.
//!
//! The queue is the at-least-once delivery substrate: atomic push,
//! blocking pop with a bounded wait, tail re-push for retries. Mutual
//! exclusion across worker processes relies on the pop being atomic.

mod redis;

pub use redis::RedisTaskQueue;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::TaskCategory;

/// Queue for producer-assigned user registrations.
pub const USER_QUEUE: &str = "user:registration:queue";
/// Queue for new grievance complaints.
pub const COMPLAINT_QUEUE: &str = "complaint:registration:queue";
/// Queue for complaint status transitions.
pub const STATUS_QUEUE: &str = "complaint:status:queue";
/// Queue for complaint assignments.
pub const ASSIGNMENT_QUEUE: &str = "complaint:assignment:queue";
/// Queue for complaint resolutions.
pub const RESOLUTION_QUEUE: &str = "complaint:resolution:queue";

/// Dead-letter list for envelopes that cannot be parsed and carry no
/// recoverable task id. Never polled; operators inspect it directly.
pub const DEAD_LETTER_QUEUE: &str = "task:deadletter:queue";

/// Fixed polling priority. User registrations come first so identity
/// setup is never starved by a complaint backlog.
pub const POLL_ORDER: [&str; 5] = [
    USER_QUEUE,
    COMPLAINT_QUEUE,
    STATUS_QUEUE,
    ASSIGNMENT_QUEUE,
    RESOLUTION_QUEUE,
];

/// Queue a task category is pushed to and retried on.
pub fn queue_for(category: TaskCategory) -> &'static str {
    match category {
        TaskCategory::UserRegistration => USER_QUEUE,
        TaskCategory::ComplaintRegistration => COMPLAINT_QUEUE,
        TaskCategory::StatusUpdate => STATUS_QUEUE,
        TaskCategory::Assignment => ASSIGNMENT_QUEUE,
        TaskCategory::Resolution => RESOLUTION_QUEUE,
    }
}

/// Errors surfaced by queue backends. All are transient from the
/// worker's perspective (connectivity, protocol).
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue backend error: {0}")]
    Backend(String),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// A task popped from one of the polled queues.
#[derive(Debug, Clone)]
pub struct PoppedTask {
    /// Queue the task was popped from.
    pub queue: String,
    /// Raw JSON task envelope.
    pub raw: String,
}

/// FIFO task queue contract.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Append a raw task envelope to the tail of `queue`.
    async fn push(&self, queue: &str, raw: &str) -> QueueResult<()>;

    /// Pop from the first non-empty queue in `queues` (priority order),
    /// blocking up to `timeout`. Returns `None` when every queue stayed
    /// empty for the full wait window.
    async fn pop_any(&self, queues: &[&str], timeout: Duration) -> QueueResult<Option<PoppedTask>>;
}
