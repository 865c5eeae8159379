//! Attest Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the claim engine:
//! - Identifiers (ClaimId, Address)
//! - Time primitives (Timestamp, Timeouts)
//! - Claim lifecycle status
//! - Error types

pub mod error;
pub mod id;
pub mod status;
pub mod time;

pub use error::*;
pub use id::*;
pub use status::*;
pub use time::*;

/// Completeness ratios are expressed in parts per million.
pub const PER_MILLION: u64 = 1_000_000;
