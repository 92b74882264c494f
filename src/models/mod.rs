//! Data models for CivicLedger.

mod outcome;
mod record;
mod task;

pub use outcome::{TaskOutcome, TaskStatus};
pub use record::{
    AssignmentPayload, ComplaintRecord, ComplaintStatus, Location, ResolutionPayload,
    StatusUpdatePayload, Urgency, UserRecord, DEFAULT_URGENCY,
};
pub use task::{Task, TaskCategory, TaskPayload};
