//! Claim/dispute state machine
//!
//! Every operation checks all of its preconditions before touching the
//! store, so a rejected request leaves claims and ledger unchanged.

use std::fmt;

use attest_core::{
    Address, AttestError, AttestResult, ClaimId, ClaimStatus, Timeouts, Timestamp, PER_MILLION,
};
use attest_wire::{decompress, Fragment};
use tracing::{debug, info};

use crate::{
    AssemblyLimits, ChunkAssembly, Claim, ClaimStore, ClaimValidator, TableScorer, Verdict,
    DEFAULT_BLANK_SENTINELS,
};

/// Engine configuration, fixed at construction
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub timeouts: Timeouts,
    /// Cell values counted as blank besides the empty string
    pub blank_sentinels: Vec<String>,
    /// Bounds on one chunked validation
    pub assembly_limits: AssemblyLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            timeouts: Timeouts::default(),
            blank_sentinels: DEFAULT_BLANK_SENTINELS.iter().map(|s| s.to_string()).collect(),
            assembly_limits: AssemblyLimits::default(),
        }
    }
}

/// Result of an applied operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Created {
        id: ClaimId,
        value: u64,
    },
    DisputeOpened {
        id: ClaimId,
        disputer: Address,
    },
    /// Timeout resolution: `Finalized` or `Disputed`
    Finalized {
        id: ClaimId,
        status: ClaimStatus,
    },
    /// Data resolution: `Validated` or `Contradicted`
    Resolved {
        id: ClaimId,
        status: ClaimStatus,
        verdict: Verdict,
    },
    ChunkAccepted {
        id: ClaimId,
        index: u32,
        received: usize,
        total: u64,
    },
}

impl Outcome {
    pub fn claim_id(&self) -> &ClaimId {
        match self {
            Outcome::Created { id, .. }
            | Outcome::DisputeOpened { id, .. }
            | Outcome::Finalized { id, .. }
            | Outcome::Resolved { id, .. }
            | Outcome::ChunkAccepted { id, .. } => id,
        }
    }

    /// Status the claim was left in
    pub fn status(&self) -> ClaimStatus {
        match self {
            Outcome::Created { .. } | Outcome::ChunkAccepted { .. } => ClaimStatus::Open,
            Outcome::DisputeOpened { .. } => ClaimStatus::Disputing,
            Outcome::Finalized { status, .. } | Outcome::Resolved { status, .. } => *status,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created { id, value } => {
                write!(f, "Claim {} created with value {}", id, value)
            }
            Outcome::DisputeOpened { id, disputer } => {
                write!(f, "Claim {} disputed by {}", id, disputer)
            }
            Outcome::Finalized { id, status } => write!(f, "Claim {} finalized: {}", id, status),
            Outcome::Resolved {
                id,
                status,
                verdict,
            } => write!(f, "Claim {} {}: {}", id, status, verdict),
            Outcome::ChunkAccepted {
                id,
                index,
                received,
                total,
            } => write!(
                f,
                "Claim {} received chunk {} ({} of {})",
                id, index, received, total
            ),
        }
    }
}

/// The claim engine - owns the registry and ledger
#[derive(Debug)]
pub struct ClaimEngine {
    store: ClaimStore,
    config: EngineConfig,
    validator: ClaimValidator,
}

impl ClaimEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_store(ClaimStore::new(), config)
    }

    /// Create an engine over an existing store
    pub fn with_store(store: ClaimStore, config: EngineConfig) -> Self {
        let validator = ClaimValidator::new(TableScorer::new(&config.blank_sentinels));
        ClaimEngine {
            store,
            config,
            validator,
        }
    }

    pub fn store(&self) -> &ClaimStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timeouts(&self) -> Timeouts {
        self.config.timeouts
    }

    fn claim(&self, id: &ClaimId) -> AttestResult<&Claim> {
        self.store
            .claim(id)
            .ok_or_else(|| AttestError::ClaimNotFound(id.clone()))
    }

    /// Register a new Open claim owned by `sender`
    pub fn create(
        &mut self,
        id: ClaimId,
        value: u64,
        sender: &Address,
        now: Timestamp,
    ) -> AttestResult<Outcome> {
        if value > PER_MILLION {
            return Err(AttestError::ValueOutOfRange(value));
        }
        if self.store.contains_claim(&id) {
            return Err(AttestError::ClaimExists(id));
        }

        self.store
            .insert_claim(Claim::new(id.clone(), sender.clone(), value, now));
        self.store
            .get_or_create_user(sender)
            .open_claims
            .insert(id.clone());

        info!(claim = %id, owner = %sender, value, "claim created");
        Ok(Outcome::Created { id, value })
    }

    /// Challenge an Open claim owned by someone else
    pub fn dispute(&mut self, id: &ClaimId, sender: &Address, now: Timestamp) -> AttestResult<Outcome> {
        let claim = self.claim(id)?;
        if claim.status() != ClaimStatus::Open {
            return Err(AttestError::InvalidStatus {
                operation: "dispute",
                expected: "Open",
                actual: claim.status(),
            });
        }
        if claim.owner() == sender {
            return Err(AttestError::SelfDispute);
        }
        let owner = claim.owner().clone();

        if let Some(claim) = self.store.claim_mut(id) {
            claim.status = ClaimStatus::Disputing;
            claim.disputer = Some(sender.clone());
            claim.last_edited = now;
        }
        let user = self.store.get_or_create_user(&owner);
        user.open_claims.remove(id);
        user.open_disputes.insert(id.clone());

        info!(claim = %id, disputer = %sender, "claim disputed");
        Ok(Outcome::DisputeOpened {
            id: id.clone(),
            disputer: sender.clone(),
        })
    }

    /// Resolve a claim whose window has elapsed. Callable by anyone.
    ///
    /// An Open claim becomes Finalized; a Disputing claim resolves
    /// against its owner and becomes Disputed.
    pub fn finalize(&mut self, id: &ClaimId, now: Timestamp) -> AttestResult<Outcome> {
        let claim = self.claim(id)?;
        let window = match claim.status() {
            ClaimStatus::Open => self.config.timeouts.claim_secs,
            ClaimStatus::Disputing => self.config.timeouts.dispute_secs,
            actual => {
                return Err(AttestError::InvalidStatus {
                    operation: "finalize",
                    expected: "Open or Disputing",
                    actual,
                })
            }
        };
        let deadline = claim.last_edited().saturating_add_secs(window);
        if now < deadline {
            return Err(AttestError::TimeoutPending {
                remaining_secs: now.secs_until(deadline),
            });
        }

        let was_disputing = claim.status() == ClaimStatus::Disputing;
        let owner = claim.owner().clone();
        let disputer = claim.disputer().cloned();
        let status = if was_disputing {
            ClaimStatus::Disputed
        } else {
            ClaimStatus::Finalized
        };

        if let Some(claim) = self.store.claim_mut(id) {
            claim.status = status;
            claim.last_edited = now;
            claim.assembly = None;
        }

        let user = self.store.get_or_create_user(&owner);
        user.total_claims += 1;
        if was_disputing {
            user.total_disputes += 1;
            user.open_disputes.remove(id);
        } else {
            user.correct_claims += 1;
            user.open_claims.remove(id);
        }

        if let Some(disputer) = disputer.filter(|_| was_disputing) {
            let user = self.store.get_or_create_user(&disputer);
            user.total_disputes += 1;
            user.won_disputes += 1;
        }

        info!(claim = %id, %status, "claim finalized by timeout");
        Ok(Outcome::Finalized {
            id: id.clone(),
            status,
        })
    }

    fn check_validatable(&self, id: &ClaimId, sender: &Address) -> AttestResult<()> {
        let claim = self.claim(id)?;
        if !claim.status().is_unresolved() {
            return Err(AttestError::InvalidStatus {
                operation: "validate",
                expected: "Open or Disputing",
                actual: claim.status(),
            });
        }
        if claim.owner() != sender {
            return Err(AttestError::NotOwner);
        }
        Ok(())
    }

    /// Reveal the claimed data in one piece and resolve the claim
    pub fn validate(
        &mut self,
        id: &ClaimId,
        sender: &Address,
        data: &[u8],
        now: Timestamp,
    ) -> AttestResult<Outcome> {
        self.check_validatable(id, sender)?;
        let value = self.claim(id)?.value();
        let verdict = self.validator.judge(id, value, data);
        Ok(self.resolve(id, verdict, now))
    }

    /// Reveal one fragment of the claimed data. The claim resolves once
    /// every fragment has arrived.
    pub fn validate_chunk(
        &mut self,
        id: &ClaimId,
        sender: &Address,
        fragment: Fragment,
        now: Timestamp,
    ) -> AttestResult<Outcome> {
        self.check_validatable(id, sender)?;
        let limits = self.config.assembly_limits;
        let claim = self
            .store
            .claim_mut(id)
            .ok_or_else(|| AttestError::ClaimNotFound(id.clone()))?;

        let index = fragment.index();
        match claim.assembly.as_mut() {
            Some(assembly) => assembly.ingest(fragment)?,
            None => claim.assembly = Some(ChunkAssembly::start(fragment, limits)?),
        }

        let complete = claim.assembly.as_ref().map_or(false, ChunkAssembly::is_complete);
        if !complete {
            let (received, total) = claim
                .assembly
                .as_ref()
                .map_or((0, 0), |a| (a.received(), a.total_chunks()));
            debug!(claim = %id, index, received, total, "chunk accepted");
            return Ok(Outcome::ChunkAccepted {
                id: id.clone(),
                index,
                received,
                total,
            });
        }

        let compressed = claim
            .assembly
            .take()
            .map(ChunkAssembly::into_payload)
            .unwrap_or_default();
        let value = claim.value();

        let verdict = match decompress(&compressed) {
            Ok(data) => self.validator.judge(id, value, &data),
            Err(e) => Verdict::Undecidable(e.to_string()),
        };
        Ok(self.resolve(id, verdict, now))
    }

    /// Apply a verdict to an unresolved claim
    fn resolve(&mut self, id: &ClaimId, verdict: Verdict, now: Timestamp) -> Outcome {
        let valid = verdict.is_valid();
        let status = if valid {
            ClaimStatus::Validated
        } else {
            ClaimStatus::Contradicted
        };

        let mut was_disputing = false;
        let mut parties = None;
        if let Some(claim) = self.store.claim_mut(id) {
            was_disputing = claim.status == ClaimStatus::Disputing;
            claim.status = status;
            claim.last_edited = now;
            claim.assembly = None;
            parties = Some((claim.owner().clone(), claim.disputer.clone()));
        }

        if let Some((owner, disputer)) = parties {
            let user = self.store.get_or_create_user(&owner);
            user.total_claims += 1;
            if valid {
                user.correct_claims += 1;
            }
            user.open_claims.remove(id);
            if was_disputing {
                user.open_disputes.remove(id);
            }

            if let Some(disputer) = disputer.filter(|_| was_disputing) {
                let user = self.store.get_or_create_user(&disputer);
                user.total_disputes += 1;
                if !valid {
                    user.won_disputes += 1;
                }
            }
        }

        info!(claim = %id, %status, %verdict, "claim resolved by validation");
        Outcome::Resolved {
            id: id.clone(),
            status,
            verdict,
        }
    }
}

impl Default for ClaimEngine {
    fn default() -> Self {
        ClaimEngine::new(EngineConfig::default())
    }
}
