//! Complaint lifecycle handlers: status updates, assignment, resolution.
//!
//! No new citizen content is produced here, so nothing is pinned; these
//! are pure ledger writes against an existing complaint.

use super::{settle_ledger_write, HandlerResult, TaskFailure, Worker};
use crate::ledger::{AssignComplaintCall, ResolveComplaintCall, UpdateStatusCall};
use crate::models::{AssignmentPayload, ComplaintStatus, ResolutionPayload, StatusUpdatePayload};

fn require<'a>(field: Option<&'a str>, name: &str) -> Result<&'a str, TaskFailure> {
    field
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TaskFailure::Validation(format!("missing {}", name)))
}

impl Worker {
    pub(crate) async fn handle_status_update(
        &self,
        _task_id: &str,
        payload: &StatusUpdatePayload,
    ) -> HandlerResult {
        let complaint_id = require(payload.complaint_id.as_deref(), "complaintId")?;
        let status_name = require(payload.status.as_deref(), "status")?;

        let status = ComplaintStatus::from_input(status_name).ok_or_else(|| {
            TaskFailure::Validation(format!("unknown complaint status: {}", status_name))
        })?;

        let call = UpdateStatusCall {
            complaint_id: complaint_id.to_string(),
            status: status.ordinal(),
            note: payload.note.clone().unwrap_or_default(),
        };

        settle_ledger_write(
            self.ledger().update_status(&call).await,
            "status update",
            complaint_id,
        )?;

        Ok(None)
    }

    pub(crate) async fn handle_assignment(
        &self,
        _task_id: &str,
        payload: &AssignmentPayload,
    ) -> HandlerResult {
        let complaint_id = require(payload.complaint_id.as_deref(), "complaintId")?;
        let department = require(payload.department.as_deref(), "department")?;
        let assignee = require(payload.assignee.as_deref(), "assignee")?;

        let call = AssignComplaintCall {
            complaint_id: complaint_id.to_string(),
            department: department.to_string(),
            assignee: assignee.to_string(),
        };

        settle_ledger_write(
            self.ledger().assign_complaint(&call).await,
            "assignment",
            complaint_id,
        )?;

        Ok(None)
    }

    pub(crate) async fn handle_resolution(
        &self,
        _task_id: &str,
        payload: &ResolutionPayload,
    ) -> HandlerResult {
        let complaint_id = require(payload.complaint_id.as_deref(), "complaintId")?;
        let resolution_note = require(payload.resolution_note.as_deref(), "resolutionNote")?;

        let call = ResolveComplaintCall {
            complaint_id: complaint_id.to_string(),
            resolution_note: resolution_note.to_string(),
        };

        settle_ledger_write(
            self.ledger().resolve_complaint(&call).await,
            "resolution",
            complaint_id,
        )?;

        Ok(None)
    }
}
