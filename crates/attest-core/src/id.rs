//! Identity types for the claim engine
//!
//! Claims are keyed by the text form of the content fingerprint the
//! claimant asserts. Participants are keyed by their address string.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AttestError, AttestResult};

/// Claim identity - the claimed content fingerprint in text form.
///
/// Set once at creation and never changed afterwards.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(String);

impl ClaimId {
    /// Create a claim ID, rejecting the empty string
    pub fn new(id: impl Into<String>) -> AttestResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(AttestError::MalformedRequest(
                "claim id must be a non-empty string".into(),
            ));
        }
        Ok(ClaimId(id))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Claim({})", self.0)
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Participant address.
///
/// Addresses are normalized to lowercase so that `0xAbC` and `0xabc`
/// refer to the same ledger entry.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl AsRef<str>) -> AttestResult<Self> {
        let address = address.as_ref();
        if address.is_empty() {
            return Err(AttestError::MalformedRequest(
                "address must be a non-empty string".into(),
            ));
        }
        Ok(Address(address.to_lowercase()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
