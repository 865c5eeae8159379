//! Claim validation
//!
//! A claim holds when the revealed data fingerprints to the claim id and
//! its completeness equals the claimed value exactly.

use std::fmt;

use attest_core::{AttestResult, ClaimId};
use attest_crypto::ContentFingerprint;
use tracing::{debug, warn};

use crate::TableScorer;

/// Judgement over revealed data
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    FingerprintMismatch { computed: String },
    CompletenessMismatch { computed: u64, claimed: u64 },
    /// The data could not be judged; counts as invalid
    Undecidable(String),
}

impl Verdict {
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => write!(f, "data matches claim"),
            Verdict::FingerprintMismatch { computed } => {
                write!(f, "data fingerprint is {}", computed)
            }
            Verdict::CompletenessMismatch { computed, claimed } => {
                write!(f, "completeness is {}, claimed {}", computed, claimed)
            }
            Verdict::Undecidable(reason) => write!(f, "error during claim validation: {}", reason),
        }
    }
}

/// Validator for revealed claim data
#[derive(Clone, Debug, Default)]
pub struct ClaimValidator {
    scorer: TableScorer,
}

impl ClaimValidator {
    pub fn new(scorer: TableScorer) -> Self {
        ClaimValidator { scorer }
    }

    /// Evaluate `data` against a claim, surfacing internal errors
    pub fn evaluate(&self, id: &ClaimId, claimed: u64, data: &[u8]) -> AttestResult<Verdict> {
        let fingerprint = ContentFingerprint::compute(data)?;
        debug!(claim = %id, computed = %fingerprint, "fingerprinted revealed data");

        if !fingerprint.matches(id)? {
            return Ok(Verdict::FingerprintMismatch {
                computed: fingerprint.to_string(),
            });
        }

        let computed = self.scorer.completeness(data)?;
        if computed != claimed {
            return Ok(Verdict::CompletenessMismatch { computed, claimed });
        }

        Ok(Verdict::Valid)
    }

    /// Judge `data` against a claim. Internal errors become
    /// [`Verdict::Undecidable`] so every judgement is terminal.
    pub fn judge(&self, id: &ClaimId, claimed: u64, data: &[u8]) -> Verdict {
        self.evaluate(id, claimed, data).unwrap_or_else(|e| {
            warn!(claim = %id, error = %e, "claim data could not be judged");
            Verdict::Undecidable(e.to_string())
        })
    }
}
