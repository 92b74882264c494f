//! Terminal task outcomes projected into the result store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Success,
    Failed,
}

/// Outcome record written once per task id at terminal resolution.
///
/// Queryable by the original submitter; storage is TTL-bounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutcome {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl TaskOutcome {
    pub fn success(task_id: &str, content_id: Option<String>) -> Self {
        Self {
            task_id: task_id.to_string(),
            status: TaskStatus::Success,
            content_id,
            error_message: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn failed(task_id: &str, error_message: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            status: TaskStatus::Failed,
            content_id: None,
            error_message: Some(error_message.to_string()),
            recorded_at: Utc::now(),
        }
    }
}
