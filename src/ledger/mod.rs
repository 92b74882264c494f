//! Ledger client boundary.
//!
//! One method per state-changing write. Every call blocks until the
//! write is included or a bounded timeout elapses. The two failure
//! classes are kept structurally distinct: an application rejection is
//! deterministic and never retried as-is; a transient failure is safe to
//! resubmit. Handlers map `AlreadyExists` rejections to idempotent
//! success; the worker's retry counter is reserved for transients.

mod rpc;

pub use rpc::JsonRpcLedgerClient;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Proof that a write was included on the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}

/// Machine-readable reason the ledger's state machine refused a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The target state already exists (duplicate id). Handlers treat
    /// this as success.
    AlreadyExists,
    /// Malformed or out-of-contract input.
    InvalidArgument,
    /// Referenced record does not exist.
    NotFound,
    /// Any other deterministic rejection.
    Other(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already exists"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::NotFound => write!(f, "not found"),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Deterministic application rejection. Never retried as-is.
    #[error("ledger rejected the write: {0}")]
    Rejected(RejectionReason),

    /// Network/timeout/node unavailability. Safe to resubmit.
    #[error("transient ledger failure: {0}")]
    Transient(String),
}

pub type LedgerResult = Result<InclusionReceipt, LedgerError>;

/// Arguments for the `registerUser` write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserCall {
    pub id: String,
    pub name: String,
    pub role: String,
    pub email_digest: String,
    pub national_id_digest: String,
    pub location_digest: String,
    pub pin: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub municipal: String,
}

/// Arguments for the `registerComplaint` write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterComplaintCall {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub sub_category: String,
    pub department: String,
    pub urgency: u8,
    pub description_digest: String,
    pub attachment_digest: String,
    pub location_digest: String,
    pub is_public: bool,
    pub pin: String,
    pub district: String,
    pub city: String,
    pub locality: String,
    pub state: String,
}

/// Arguments for the `updateComplaintStatus` write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusCall {
    pub complaint_id: String,
    pub status: u8,
    pub note: String,
}

/// Arguments for the `assignComplaint` write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignComplaintCall {
    pub complaint_id: String,
    pub department: String,
    pub assignee: String,
}

/// Arguments for the `resolveComplaint` write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveComplaintCall {
    pub complaint_id: String,
    pub resolution_note: String,
}

/// Signs and submits state-changing ledger calls, waiting for inclusion.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn register_user(&self, call: &RegisterUserCall) -> LedgerResult;
    async fn register_complaint(&self, call: &RegisterComplaintCall) -> LedgerResult;
    async fn update_status(&self, call: &UpdateStatusCall) -> LedgerResult;
    async fn assign_complaint(&self, call: &AssignComplaintCall) -> LedgerResult;
    async fn resolve_complaint(&self, call: &ResolveComplaintCall) -> LedgerResult;
}
