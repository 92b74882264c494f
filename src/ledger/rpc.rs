//! JSON-RPC ledger client.
//!
//! Submits contract calls as `ledger_submit` requests to the configured
//! node and waits for the inclusion receipt in the response. Rejections
//! arrive as structured error objects; the application error code, not
//! the message text, selects the rejection class.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{
    AssignComplaintCall, InclusionReceipt, LedgerClient, LedgerError, LedgerResult,
    RegisterComplaintCall, RegisterUserCall, RejectionReason, ResolveComplaintCall,
    UpdateStatusCall,
};

/// Bounded wait for inclusion of a submitted write.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Application error codes in the ledger's rejection contract.
const CODE_ALREADY_EXISTS: i64 = 1001;
const CODE_INVALID_ARGUMENT: i64 = 1002;
const CODE_NOT_FOUND: i64 = 1003;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: RpcParams<'a>,
}

#[derive(Serialize)]
struct RpcParams<'a> {
    contract: &'a str,
    function: &'a str,
    args: serde_json::Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<InclusionReceipt>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Ledger client speaking JSON-RPC to a signing gateway node.
pub struct JsonRpcLedgerClient {
    client: Client,
    rpc_url: String,
    contract_address: String,
    signing_key: String,
    request_id: AtomicU64,
}

impl JsonRpcLedgerClient {
    pub fn new(
        rpc_url: &str,
        contract_address: &str,
        signing_key: &str,
    ) -> Result<Self, LedgerError> {
        let client = Client::builder()
            .timeout(SUBMIT_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::Transient(e.to_string()))?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            contract_address: contract_address.to_string(),
            signing_key: signing_key.to_string(),
            request_id: AtomicU64::new(1),
        })
    }

    async fn submit(&self, function: &'static str, args: serde_json::Value) -> LedgerResult {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method: "ledger_submit",
            params: RpcParams {
                contract: &self.contract_address,
                function,
                args,
            },
        };

        let response = self
            .client
            .post(&self.rpc_url)
            .bearer_auth(&self.signing_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Transient(format!("ledger rpc request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Transient(format!(
                "ledger rpc returned HTTP {}",
                status
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Transient(format!("malformed rpc response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(map_rpc_error(error));
        }

        body.result.ok_or_else(|| {
            LedgerError::Transient("ledger rpc returned neither result nor error".to_string())
        })
    }
}

/// Positive codes are the ledger state machine's deterministic
/// rejections; everything else (JSON-RPC transport codes) is transient.
fn map_rpc_error(error: RpcError) -> LedgerError {
    match error.code {
        CODE_ALREADY_EXISTS => LedgerError::Rejected(RejectionReason::AlreadyExists),
        CODE_INVALID_ARGUMENT => LedgerError::Rejected(RejectionReason::InvalidArgument),
        CODE_NOT_FOUND => LedgerError::Rejected(RejectionReason::NotFound),
        code if code > 0 => LedgerError::Rejected(RejectionReason::Other(error.message)),
        _ => LedgerError::Transient(error.message),
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn register_user(&self, call: &RegisterUserCall) -> LedgerResult {
        self.submit("registerUser", json!(call)).await
    }

    async fn register_complaint(&self, call: &RegisterComplaintCall) -> LedgerResult {
        self.submit("registerComplaint", json!(call)).await
    }

    async fn update_status(&self, call: &UpdateStatusCall) -> LedgerResult {
        self.submit("updateComplaintStatus", json!(call)).await
    }

    async fn assign_complaint(&self, call: &AssignComplaintCall) -> LedgerResult {
        self.submit("assignComplaint", json!(call)).await
    }

    async fn resolve_complaint(&self, call: &ResolveComplaintCall) -> LedgerResult {
        self.submit("resolveComplaint", json!(call)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_mapping() {
        let rejected = map_rpc_error(RpcError {
            code: 1001,
            message: "complaint already registered".to_string(),
        });
        assert!(matches!(
            rejected,
            LedgerError::Rejected(RejectionReason::AlreadyExists)
        ));

        let invalid = map_rpc_error(RpcError {
            code: 1002,
            message: "bad digest length".to_string(),
        });
        assert!(matches!(
            invalid,
            LedgerError::Rejected(RejectionReason::InvalidArgument)
        ));

        let transient = map_rpc_error(RpcError {
            code: -32000,
            message: "node syncing".to_string(),
        });
        assert!(matches!(transient, LedgerError::Transient(_)));
    }
}
