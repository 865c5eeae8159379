//! Time primitives for the claim engine
//!
//! The engine never reads a wall clock. Every request carries a caller
//! supplied timestamp (seconds), assumed non-decreasing across requests.
//! Timeouts are pure comparisons against a claim's last-edited time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request timestamp in whole seconds
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_secs(secs: u64) -> Self {
        Timestamp(secs)
    }

    #[inline]
    pub fn as_secs(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn saturating_add_secs(self, secs: u64) -> Self {
        Timestamp(self.0.saturating_add(secs))
    }

    /// Seconds remaining until `deadline`, zero once it has been reached
    #[inline]
    pub fn secs_until(self, deadline: Timestamp) -> u64 {
        deadline.0.saturating_sub(self.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}s", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolution windows, fixed at process start
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    /// Seconds an undisputed claim stays open before it may be finalized
    pub claim_secs: u64,
    /// Seconds a dispute stays open before it resolves against the claimant
    pub dispute_secs: u64,
}

impl Timeouts {
    pub const fn new(claim_secs: u64, dispute_secs: u64) -> Self {
        Timeouts {
            claim_secs,
            dispute_secs,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        // One day to dispute, half a day to answer a dispute
        Timeouts::new(86_400, 43_200)
    }
}
