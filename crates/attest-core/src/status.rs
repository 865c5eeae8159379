//! Claim lifecycle status
//!
//! ```text
//!            dispute            finalize (dispute timeout)
//!   Open ─────────────▶ Disputing ─────────────▶ Disputed
//!    │ │                   │
//!    │ │ finalize          │ validate
//!    │ ▼ (claim timeout)   ▼
//!    │ Finalized        Validated | Contradicted
//!    │
//!    └── validate ──▶ Validated | Contradicted
//! ```

use std::fmt;

use serde::{Serialize, Serializer};

/// Claim status. Terminal states never transition again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClaimStatus {
    Open,
    Disputing,
    Finalized,
    Disputed,
    Validated,
    Contradicted,
}

impl ClaimStatus {
    /// All statuses in lifecycle order
    pub const ALL: [ClaimStatus; 6] = [
        ClaimStatus::Open,
        ClaimStatus::Disputing,
        ClaimStatus::Finalized,
        ClaimStatus::Disputed,
        ClaimStatus::Validated,
        ClaimStatus::Contradicted,
    ];

    /// Rendered name, as exposed to inspection
    pub const fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Open => "open",
            ClaimStatus::Disputing => "disputing",
            ClaimStatus::Finalized => "finalized",
            ClaimStatus::Disputed => "disputed",
            ClaimStatus::Validated => "validated",
            ClaimStatus::Contradicted => "contradicted",
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_unresolved()
    }

    /// Open or Disputing: the claim can still be finalized or validated
    #[inline]
    pub fn is_unresolved(self) -> bool {
        matches!(self, ClaimStatus::Open | ClaimStatus::Disputing)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ClaimStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = ClaimStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![
                ClaimStatus::Finalized,
                ClaimStatus::Disputed,
                ClaimStatus::Validated,
                ClaimStatus::Contradicted,
            ]
        );
    }

    #[test]
    fn test_rendering_table() {
        let names: Vec<_> = ClaimStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            ["open", "disputing", "finalized", "disputed", "validated", "contradicted"]
        );
        assert_eq!(
            serde_json::to_string(&ClaimStatus::Disputing).unwrap(),
            "\"disputing\""
        );
    }
}
