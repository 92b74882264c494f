//! Digest engine: deterministic record digests for ledger writes.
//!
//! Ledger writes carry fixed-size digests of PII fields instead of the
//! raw values; only location fields go on-ledger in plaintext. Field
//! order and separators in the location digests are part of the write
//! contract and must not change without a contract version bump.

use sha2::{Digest, Sha256};

use crate::models::Location;

/// Sentinel hashed in place of an absent national id.
pub const NATIONAL_ID_SENTINEL: &str = "NOT_PROVIDED";

/// Digest recorded for an absent attachment.
pub const ZERO_DIGEST: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// SHA-256 of a UTF-8 string, as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn email_digest(email: &str) -> String {
    sha256_hex(email)
}

pub fn national_id_digest(national_id: Option<&str>) -> String {
    sha256_hex(national_id.unwrap_or(NATIONAL_ID_SENTINEL))
}

/// Location digest for user registrations: `pin|district|city|state|municipal`.
pub fn user_location_digest(location: &Location) -> String {
    sha256_hex(&format!(
        "{}|{}|{}|{}|{}",
        location.pin,
        location.district,
        location.city,
        location.state.as_deref().unwrap_or_default(),
        location.municipal.as_deref().unwrap_or_default(),
    ))
}

pub fn description_digest(description: &str) -> String {
    sha256_hex(description)
}

pub fn attachment_digest(attachment_url: Option<&str>) -> String {
    match attachment_url {
        Some(url) if !url.is_empty() => sha256_hex(url),
        _ => ZERO_DIGEST.to_string(),
    }
}

/// Location digest for complaints: `pin|district|city|locality|state`.
///
/// Locality is optional and hashes as empty when absent; an absent state
/// hashes as `default_state` (the configured default region).
pub fn complaint_location_digest(location: &Location, default_state: &str) -> String {
    sha256_hex(&format!(
        "{}|{}|{}|{}|{}",
        location.pin,
        location.district,
        location.city,
        location.locality.as_deref().unwrap_or_default(),
        location.state.as_deref().unwrap_or(default_state),
    ))
}
