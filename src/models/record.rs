//! Domain records carried by queued tasks.
//!
//! Payload shapes mirror what upstream producers enqueue as JSON. Fields
//! gated by handler validation are optional here so a missing field can be
//! reported as a task failure instead of a parse failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default urgency applied when the submitted value is absent or
/// unrecognized. Named so tests can target the fallback directly.
pub const DEFAULT_URGENCY: Urgency = Urgency::Medium;

/// Geographic location of a citizen or complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pin: String,
    pub district: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// A citizen registration record submitted by an upstream producer.
///
/// The producer assigns the id; duplicate submission of the same id is a
/// recoverable condition (the ledger rejects it and the task resolves as
/// an idempotent success).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_creation: Option<DateTime<Utc>>,
    pub location: Location,
}

/// A grievance complaint record.
///
/// The id is producer-assigned when present; the worker generates one
/// otherwise. Description, submitter, category and location are required
/// before any ledger write is attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub assigned_department: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<DateTime<Utc>>,
}

/// Payload for a complaint status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complaint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payload assigning a complaint to a department officer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complaint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

/// Payload resolving a complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complaint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_note: Option<String>,
}

/// Complaint urgency, ordered LOW < MEDIUM < HIGH < CRITICAL.
///
/// The ledger consumes the ordinal, not the name; the ordinal mapping is
/// part of the write contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    /// Ordinal sent in ledger writes.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Parse a submitted urgency value, case-insensitively.
    ///
    /// Absent or unrecognized values fall back to [`DEFAULT_URGENCY`].
    pub fn from_input(input: Option<&str>) -> Self {
        let Some(raw) = input else {
            return DEFAULT_URGENCY;
        };
        match raw.to_ascii_uppercase().as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            "CRITICAL" => Self::Critical,
            other => {
                tracing::warn!(urgency = other, "unrecognized urgency, defaulting to MEDIUM");
                DEFAULT_URGENCY
            }
        }
    }
}

/// Complaint lifecycle status on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Registered,
    UnderProcessing,
    Forwarded,
    OnHold,
    Completed,
    Rejected,
    EscalatedToMunicipalLevel,
    EscalatedToStateLevel,
    Deleted,
}

impl ComplaintStatus {
    /// Ordinal sent in ledger writes.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Registered => 1,
            Self::UnderProcessing => 2,
            Self::Forwarded => 3,
            Self::OnHold => 4,
            Self::Completed => 5,
            Self::Rejected => 6,
            Self::EscalatedToMunicipalLevel => 7,
            Self::EscalatedToStateLevel => 8,
            Self::Deleted => 9,
        }
    }

    /// Parse a submitted status name, case-insensitively.
    ///
    /// Unknown names return `None`; the caller treats that as a
    /// validation failure, not a default.
    pub fn from_input(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "REGISTERED" => Some(Self::Registered),
            "UNDER_PROCESSING" => Some(Self::UnderProcessing),
            "FORWARDED" => Some(Self::Forwarded),
            "ON_HOLD" => Some(Self::OnHold),
            "COMPLETED" => Some(Self::Completed),
            "REJECTED" => Some(Self::Rejected),
            "ESCALATED_TO_MUNICIPAL_LEVEL" => Some(Self::EscalatedToMunicipalLevel),
            "ESCALATED_TO_STATE_LEVEL" => Some(Self::EscalatedToStateLevel),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }
}
