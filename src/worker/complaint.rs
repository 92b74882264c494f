//! Complaint registration handler.
//!
//! Validation gate first (no retry consumed by a permanently-missing
//! field), then pin, then the ledger write. The complaint id is
//! producer-assigned when present; otherwise the worker generates one
//! and caches it per task so a retried task keeps the same id.

use serde_json::json;

use super::{settle_ledger_write, HandlerResult, TaskFailure, Worker};
use crate::digest;
use crate::ledger::RegisterComplaintCall;
use crate::models::{ComplaintRecord, Urgency};

impl Worker {
    pub(crate) async fn handle_complaint_registration(
        &self,
        task_id: &str,
        record: &ComplaintRecord,
    ) -> HandlerResult {
        let description = match record.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => return Err(TaskFailure::Validation("missing description".to_string())),
        };
        let user_id = record
            .user_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TaskFailure::Validation("missing userId".to_string()))?;
        let category_id = record
            .category_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TaskFailure::Validation("missing categoryId".to_string()))?;
        let location = record
            .location
            .as_ref()
            .ok_or_else(|| TaskFailure::Validation("missing location".to_string()))?;

        let complaint_id = self.complaint_id_for(task_id, record).await;

        let mut projection = serde_json::to_value(record).map_err(|e| {
            TaskFailure::Validation(format!("unserializable complaint record: {}", e))
        })?;
        if let serde_json::Value::Object(map) = &mut projection {
            map.insert("complaintId".to_string(), json!(complaint_id));
        }
        let json_text = projection.to_string();

        let content_id = self.pin_with_cache(task_id, &json_text).await?;
        tracing::info!(complaint_id = %complaint_id, content_id = %content_id, "complaint pinned");

        if let Err(e) = self
            .results()
            .store_record("complaint", &complaint_id, &json_text, &content_id)
            .await
        {
            tracing::warn!(complaint_id = %complaint_id, error = %e, "failed to mirror complaint");
        }

        let urgency = Urgency::from_input(record.urgency.as_deref());
        let default_state = self.default_state().to_string();

        let call = RegisterComplaintCall {
            id: complaint_id.clone(),
            user_id: user_id.to_string(),
            category_id: category_id.to_string(),
            sub_category: record.sub_category.clone(),
            department: record.assigned_department.clone(),
            urgency: urgency.ordinal(),
            description_digest: digest::description_digest(description),
            attachment_digest: digest::attachment_digest(record.attachment_url.as_deref()),
            location_digest: digest::complaint_location_digest(location, &default_state),
            is_public: record.is_public,
            pin: location.pin.clone(),
            district: location.district.clone(),
            city: location.city.clone(),
            locality: location.locality.clone().unwrap_or_default(),
            state: location.state.clone().unwrap_or(default_state),
        };

        settle_ledger_write(
            self.ledger().register_complaint(&call).await,
            "complaint",
            &complaint_id,
        )?;

        Ok(Some(content_id))
    }

    /// Resolve the complaint id: producer-assigned, else the id cached
    /// by an earlier attempt of this task, else freshly generated.
    async fn complaint_id_for(&self, task_id: &str, record: &ComplaintRecord) -> String {
        if let Some(id) = record.id.as_ref().filter(|s| !s.is_empty()) {
            return id.clone();
        }

        match self.results().cached_assigned_id(task_id).await {
            Ok(Some(id)) => return id,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(task_id, error = %e, "assigned id cache lookup failed");
            }
        }

        let id = format!("COMP-{}", uuid::Uuid::new_v4());
        if let Err(e) = self.results().cache_assigned_id(task_id, &id).await {
            tracing::warn!(task_id, error = %e, "failed to cache generated complaint id");
        }
        id
    }
}
