//! Content pinner boundary.
//!
//! Uploads record bytes to a content-addressable store and returns the
//! stable content identifier. Re-pinning identical content is safe; the
//! worker caches identifiers per task to avoid the redundant upload.

mod http;

pub use http::HttpPinner;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the pinning service. All are transient from the worker's
/// perspective and retried at the worker-loop level.
#[derive(Debug, Error)]
pub enum PinError {
    #[error("pin request failed: {0}")]
    Request(String),

    #[error("pin service returned {status}: {body}")]
    Service { status: u16, body: String },
}

/// Content-addressable storage contract.
#[async_trait]
pub trait ContentPinner: Send + Sync {
    /// Upload `bytes` under `filename`, returning the content identifier.
    async fn pin(&self, bytes: Vec<u8>, filename: &str) -> Result<String, PinError>;
}
