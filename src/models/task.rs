//! Queued task envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{
    AssignmentPayload, ComplaintRecord, ResolutionPayload, StatusUpdatePayload, UserRecord,
};

/// Closed set of task categories the worker dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    UserRegistration,
    ComplaintRegistration,
    StatusUpdate,
    Assignment,
    Resolution,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegistration => "USER_REGISTRATION",
            Self::ComplaintRegistration => "COMPLAINT_REGISTRATION",
            Self::StatusUpdate => "STATUS_UPDATE",
            Self::Assignment => "ASSIGNMENT",
            Self::Resolution => "RESOLUTION",
        }
    }
}

/// Category tag plus its category-specific record.
///
/// Serialized as `{"category": "...", "payload": {...}}` on the queue.
/// An unknown category tag fails deserialization of the whole envelope,
/// which the worker records as a non-retryable failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPayload {
    UserRegistration(UserRecord),
    ComplaintRegistration(ComplaintRecord),
    StatusUpdate(StatusUpdatePayload),
    Assignment(AssignmentPayload),
    Resolution(ResolutionPayload),
}

impl TaskPayload {
    pub fn category(&self) -> TaskCategory {
        match self {
            Self::UserRegistration(_) => TaskCategory::UserRegistration,
            Self::ComplaintRegistration(_) => TaskCategory::ComplaintRegistration,
            Self::StatusUpdate(_) => TaskCategory::StatusUpdate,
            Self::Assignment(_) => TaskCategory::Assignment,
            Self::Resolution(_) => TaskCategory::Resolution,
        }
    }
}

/// One unit of queued work.
///
/// Owned by the queue until popped, then by the worker for the duration
/// of one attempt. `retry_count` is the only field mutated across
/// attempts, incremented on each tail re-enqueue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a first-attempt task with a fresh id.
    pub fn new(payload: TaskPayload) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload,
            retry_count: 0,
            created_at: Utc::now(),
        }
    }
}
