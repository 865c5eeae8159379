//! Content fingerprint
//!
//! A fingerprint is `CIDv1(raw, sha2-256(bytes))`. Its text form is the
//! base32 multibase string (`bafkrei...`) participants use as claim ids.

use std::fmt;
use std::str::FromStr;

use attest_core::{AttestError, AttestResult, ClaimId};
use cid::multihash::Multihash;
use cid::Cid;
use sha2::{Digest, Sha256};

/// Multicodec for raw binary content
pub const RAW_CODEC: u64 = 0x55;

/// Multihash code for sha2-256
pub const SHA2_256: u64 = 0x12;

/// Content fingerprint of a byte payload
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint(Cid);

impl ContentFingerprint {
    /// Fingerprint the exact bytes of `data`
    pub fn compute(data: &[u8]) -> AttestResult<Self> {
        let digest = Sha256::digest(data);
        let hash = Multihash::<64>::wrap(SHA2_256, &digest)
            .map_err(|e| AttestError::InvalidFingerprint(e.to_string()))?;
        Ok(ContentFingerprint(Cid::new_v1(RAW_CODEC, hash)))
    }

    /// Decode the text form of a fingerprint
    pub fn parse(text: &str) -> AttestResult<Self> {
        Cid::from_str(text)
            .map(ContentFingerprint)
            .map_err(|e| AttestError::InvalidFingerprint(format!("{}: {}", text, e)))
    }

    /// Whether `id` decodes to this exact fingerprint.
    ///
    /// An id that doesn't decode is an error, not a mismatch.
    pub fn matches(&self, id: &ClaimId) -> AttestResult<bool> {
        Ok(ContentFingerprint::parse(id.as_str())? == *self)
    }

    /// Raw sha2-256 digest bytes
    pub fn digest(&self) -> &[u8] {
        self.0.hash().digest()
    }
}

impl fmt::Debug for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text form of the fingerprint of `data`
pub fn fingerprint(data: &[u8]) -> AttestResult<String> {
    Ok(ContentFingerprint::compute(data)?.to_string())
}
