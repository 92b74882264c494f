//! CivicLedger - grievance record pipeline.
//!
//! Consumes citizen-submitted registration and complaint tasks from a
//! Redis queue, pins record content to a content-addressable store, and
//! commits tamper-evident digests to an append-only ledger.

pub mod cli;
pub mod config;
pub mod digest;
pub mod ledger;
pub mod models;
pub mod pinner;
pub mod queue;
pub mod results;
pub mod worker;
