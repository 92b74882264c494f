//! User registration handler.
//!
//! Pins the canonical record projection (tagged with the fixed citizen
//! role), then commits digests plus plaintext location to the ledger.
//! PII fields (email, national id) go on-ledger only as digests.

use serde_json::json;

use super::{settle_ledger_write, HandlerResult, TaskFailure, Worker};
use crate::digest;
use crate::ledger::RegisterUserCall;
use crate::models::UserRecord;

/// Role tag written into every citizen registration.
pub const CITIZEN_ROLE: &str = "CITIZEN";

impl Worker {
    pub(crate) async fn handle_user_registration(
        &self,
        task_id: &str,
        record: &UserRecord,
    ) -> HandlerResult {
        let mut projection = serde_json::to_value(record).map_err(|e| {
            TaskFailure::Validation(format!("unserializable user record: {}", e))
        })?;
        if let serde_json::Value::Object(map) = &mut projection {
            map.insert("role".to_string(), json!(CITIZEN_ROLE));
        }
        let json_text = projection.to_string();

        let content_id = self.pin_with_cache(task_id, &json_text).await?;
        tracing::info!(user_id = %record.id, content_id = %content_id, "user record pinned");

        if let Err(e) = self
            .results()
            .store_record("user", &record.id, &json_text, &content_id)
            .await
        {
            tracing::warn!(user_id = %record.id, error = %e, "failed to mirror user record");
        }

        let call = RegisterUserCall {
            id: record.id.clone(),
            name: record.name.clone(),
            role: CITIZEN_ROLE.to_string(),
            email_digest: digest::email_digest(&record.email),
            national_id_digest: digest::national_id_digest(record.national_id.as_deref()),
            location_digest: digest::user_location_digest(&record.location),
            pin: record.location.pin.clone(),
            district: record.location.district.clone(),
            city: record.location.city.clone(),
            state: record.location.state.clone().unwrap_or_default(),
            municipal: record.location.municipal.clone().unwrap_or_default(),
        };

        settle_ledger_write(
            self.ledger().register_user(&call).await,
            "user",
            &record.id,
        )?;

        Ok(Some(content_id))
    }
}
