//! Configuration for the CivicLedger worker.
//!
//! The configuration surface is environment-style: `.env` is loaded by
//! `main` before anything else, then `Config::from_env` reads the
//! variables below. Required variables are the ledger and pinner
//! credentials; everything else has a default.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Retry ceiling for transient task failures. A task is attempted at
/// most `RETRY_LIMIT + 1` times in total.
pub const RETRY_LIMIT: u32 = 3;

/// Default blocking-pop wait / loop backoff, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Default retention for task outcomes, in seconds.
pub const DEFAULT_RESULT_TTL_SECS: u64 = 86400;

/// Default region recorded when a complaint location omits its state.
pub const DEFAULT_STATE: &str = "Jharkhand";

/// Default pinning endpoint.
pub const DEFAULT_PINNER_URL: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Effective worker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub ledger_rpc_url: String,
    pub ledger_contract_address: String,
    pub ledger_signing_key: String,
    pub pinner_api_url: String,
    pub pinner_jwt: String,
    pub poll_interval: Duration,
    pub result_ttl: Duration,
    pub default_state: String,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            ledger_rpc_url: required("LEDGER_RPC_URL")?,
            ledger_contract_address: required("LEDGER_CONTRACT_ADDRESS")?,
            ledger_signing_key: required("LEDGER_SIGNING_KEY")?,
            pinner_api_url: env::var("PINNER_API_URL")
                .unwrap_or_else(|_| DEFAULT_PINNER_URL.to_string()),
            pinner_jwt: required("PINNER_JWT")?,
            poll_interval: Duration::from_millis(parsed_or(
                "WORKER_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )?),
            result_ttl: Duration::from_secs(parsed_or(
                "RESULT_TTL_SECS",
                DEFAULT_RESULT_TTL_SECS,
            )?),
            default_state: env::var("DEFAULT_STATE").unwrap_or_else(|_| DEFAULT_STATE.to_string()),
        })
    }

    /// Printable form with credentials redacted.
    pub fn redacted(&self) -> Vec<(&'static str, String)> {
        vec![
            ("REDIS_URL", self.redis_url.clone()),
            ("LEDGER_RPC_URL", self.ledger_rpc_url.clone()),
            (
                "LEDGER_CONTRACT_ADDRESS",
                self.ledger_contract_address.clone(),
            ),
            ("LEDGER_SIGNING_KEY", redact(&self.ledger_signing_key)),
            ("PINNER_API_URL", self.pinner_api_url.clone()),
            ("PINNER_JWT", redact(&self.pinner_jwt)),
            (
                "WORKER_POLL_INTERVAL_MS",
                self.poll_interval.as_millis().to_string(),
            ),
            ("RESULT_TTL_SECS", self.result_ttl.as_secs().to_string()),
            ("DEFAULT_STATE", self.default_state.clone()),
        ]
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

fn parsed_or(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value }),
        Err(_) => Ok(default),
    }
}

fn redact(secret: &str) -> String {
    // Counted in chars, not bytes: credentials are operator input and
    // may start with multi-byte characters.
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        let head: String = secret.chars().take(4).collect();
        format!("{}****", head)
    }
}
