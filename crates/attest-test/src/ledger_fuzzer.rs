//! Ledger Fuzzer - Randomized request streams against the claim engine
//!
//! Checks after every request:
//! - Rejected requests leave claims and ledger untouched
//! - Terminal claims never change again
//! - Open/disputing id sets agree with claim status
//! - Resolution counters agree with the number of resolved claims

use std::collections::HashMap;

use attest_core::{Address, ClaimId, ClaimStatus, Timeouts, Timestamp};
use attest_crypto::fingerprint;
use attest_state::{completeness, ClaimEngine, ClaimStore, EngineConfig};
use attest_wire::split;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const CELLS: &[&str] = &["", "na", "NA", "1", "x", "42"];

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of participating addresses
    pub user_count: usize,
    /// Number of distinct tables claims are made about
    pub table_count: usize,
    /// Number of requests to generate
    pub request_count: usize,
    /// Largest clock step between requests, in seconds
    pub max_step_secs: u64,
    pub timeouts: Timeouts,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            user_count: 4,
            table_count: 6,
            request_count: 1000,
            max_step_secs: 40,
            timeouts: Timeouts::new(200, 100),
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            request_count: 200,
            ..Self::default()
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            user_count: 8,
            table_count: 20,
            request_count: 20_000,
            ..Self::default()
        }
    }
}

/// A table claims can be made about
#[derive(Clone, Debug)]
struct Subject {
    id: ClaimId,
    table: String,
    completeness: u64,
}

#[derive(Clone, Debug)]
enum FuzzRequest {
    Create { id: ClaimId, value: u64 },
    Dispute { id: ClaimId },
    Finalize { id: ClaimId },
    Validate { id: ClaimId, table: String },
    /// Every fragment of `table`, delivered in the given order
    ValidateChunks { id: ClaimId, table: String, shuffle: bool },
}

/// Fuzz run result
#[derive(Clone, Debug, Default)]
pub struct FuzzResult {
    pub requests_applied: u32,
    pub requests_rejected: u32,
    pub claims_resolved: u32,
    pub violations: Vec<String>,
}

impl FuzzResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Status snapshot used to detect forbidden transitions
type Snapshot = HashMap<ClaimId, ClaimStatus>;

pub struct LedgerFuzzer {
    config: FuzzerConfig,
    engine: ClaimEngine,
    users: Vec<Address>,
    subjects: Vec<Subject>,
    rng: StdRng,
    clock: Timestamp,
}

impl LedgerFuzzer {
    pub fn new(config: FuzzerConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let users = (0..config.user_count.max(2))
            .filter_map(|i| Address::new(format!("0x{:04x}", i)).ok())
            .collect();

        let mut subjects = Vec::with_capacity(config.table_count);
        while subjects.len() < config.table_count {
            if let Some(subject) = Self::generate_subject(&mut rng) {
                subjects.push(subject);
            }
        }

        let engine = ClaimEngine::new(EngineConfig {
            timeouts: config.timeouts,
            ..EngineConfig::default()
        });

        LedgerFuzzer {
            config,
            engine,
            users,
            subjects,
            rng,
            clock: Timestamp::ZERO,
        }
    }

    fn generate_subject(rng: &mut StdRng) -> Option<Subject> {
        let rows = rng.gen_range(1..6);
        let mut table = String::from("a,b,c\n");
        for _ in 0..rows {
            let row: Vec<&str> = (0..3)
                .map(|_| CELLS[rng.gen_range(0..CELLS.len())])
                .collect();
            table.push_str(&row.join(","));
            table.push('\n');
        }
        let completeness = completeness(&table).ok()?;
        let id = ClaimId::new(fingerprint(table.as_bytes()).ok()?).ok()?;
        Some(Subject {
            id,
            table,
            completeness,
        })
    }

    pub fn store(&self) -> &ClaimStore {
        self.engine.store()
    }

    fn pick_user(&mut self) -> Address {
        self.users[self.rng.gen_range(0..self.users.len())].clone()
    }

    fn pick_subject(&mut self) -> Subject {
        self.subjects[self.rng.gen_range(0..self.subjects.len())].clone()
    }

    fn generate_request(&mut self) -> FuzzRequest {
        let subject = self.pick_subject();
        match self.rng.gen_range(0..10) {
            0..=2 => {
                let value = if self.rng.gen_bool(0.7) {
                    subject.completeness
                } else {
                    self.rng.gen_range(0..=1_000_000)
                };
                FuzzRequest::Create {
                    id: subject.id,
                    value,
                }
            }
            3 | 4 => FuzzRequest::Dispute { id: subject.id },
            5 | 6 => FuzzRequest::Finalize { id: subject.id },
            7 | 8 => {
                let table = if self.rng.gen_bool(0.8) {
                    subject.table
                } else {
                    self.pick_subject().table
                };
                FuzzRequest::Validate { id: subject.id, table }
            }
            _ => FuzzRequest::ValidateChunks {
                id: subject.id,
                table: subject.table,
                shuffle: self.rng.gen_bool(0.5),
            },
        }
    }

    /// Apply one request; `Ok(true)` if it was accepted
    fn apply(&mut self, sender: &Address, request: FuzzRequest) -> Result<bool, String> {
        let now = self.clock;
        let accepted = match request {
            FuzzRequest::Create { id, value } => self.engine.create(id, value, sender, now).is_ok(),
            FuzzRequest::Dispute { id } => self.engine.dispute(&id, sender, now).is_ok(),
            FuzzRequest::Finalize { id } => self.engine.finalize(&id, now).is_ok(),
            FuzzRequest::Validate { id, table } => {
                self.engine.validate(&id, sender, table.as_bytes(), now).is_ok()
            }
            FuzzRequest::ValidateChunks { id, table, shuffle } => {
                let mut fragments = split(table.as_bytes(), 16).map_err(|e| e.to_string())?;
                if shuffle {
                    fragments.shuffle(&mut self.rng);
                }
                let mut accepted = false;
                for fragment in fragments {
                    accepted |= self.engine.validate_chunk(&id, sender, fragment, now).is_ok();
                }
                accepted
            }
        };
        Ok(accepted)
    }

    /// Run the fuzzer
    pub fn run(&mut self) -> FuzzResult {
        let mut result = FuzzResult::default();

        for step in 0..self.config.request_count {
            let step_secs = self.rng.gen_range(0..=self.config.max_step_secs);
            self.clock = self.clock.saturating_add_secs(step_secs);

            let sender = self.pick_user();
            let request = self.generate_request();
            let before = self.snapshot();
            let ledger_before = self.ledger_digest();

            match self.apply(&sender, request) {
                Ok(true) => result.requests_applied += 1,
                Ok(false) => {
                    result.requests_rejected += 1;
                    if self.snapshot() != before || self.ledger_digest() != ledger_before {
                        result
                            .violations
                            .push(format!("step {}: rejected request changed state", step));
                    }
                }
                Err(e) => result.violations.push(format!("step {}: {}", step, e)),
            }

            self.check_transitions(step, &before, &mut result.violations);
            self.check_ledger(step, &mut result.violations);
        }

        result.claims_resolved = self
            .store()
            .claims()
            .filter(|c| c.status().is_terminal())
            .count() as u32;
        result
    }

    fn snapshot(&self) -> Snapshot {
        self.store()
            .claims()
            .map(|c| (c.id().clone(), c.status()))
            .collect()
    }

    /// Per-user counters, in user order
    fn ledger_digest(&self) -> Vec<(usize, usize, u32, u32, u32, u32)> {
        self.users
            .iter()
            .map(|address| match self.store().user(address) {
                Some(u) => (
                    u.open_claims().len(),
                    u.open_disputes().len(),
                    u.total_disputes(),
                    u.won_disputes(),
                    u.total_claims(),
                    u.correct_claims(),
                ),
                None => (0, 0, 0, 0, 0, 0),
            })
            .collect()
    }

    fn check_transitions(&self, step: usize, before: &Snapshot, violations: &mut Vec<String>) {
        for (id, old) in before {
            let new = self.store().claim(id).map(|c| c.status());
            let allowed = match (old, new) {
                (_, None) => false,
                (old, Some(new)) if *old == new => true,
                (ClaimStatus::Open, Some(new)) => new != ClaimStatus::Disputed,
                (ClaimStatus::Disputing, Some(new)) => matches!(
                    new,
                    ClaimStatus::Disputed | ClaimStatus::Validated | ClaimStatus::Contradicted
                ),
                _ => false,
            };
            if !allowed {
                violations.push(format!("step {}: {} went {} -> {:?}", step, id, old, new));
            }
        }
    }

    fn check_ledger(&self, step: usize, violations: &mut Vec<String>) {
        let store = self.store();
        let mut resolved = 0u32;

        for claim in store.claims() {
            let id = claim.id();
            let owner = store.user(claim.owner());
            let in_open = owner.map_or(false, |u| u.open_claims().contains(id));
            let in_disputes = owner.map_or(false, |u| u.open_disputes().contains(id));

            let consistent = match claim.status() {
                ClaimStatus::Open => in_open && !in_disputes,
                ClaimStatus::Disputing => {
                    in_disputes
                        && !in_open
                        && claim.disputer().map_or(false, |d| d != claim.owner())
                }
                _ => !in_open && !in_disputes && claim.assembly().is_none(),
            };
            if !consistent {
                violations.push(format!(
                    "step {}: {} is {} but ledger sets disagree",
                    step,
                    id,
                    claim.status()
                ));
            }
            if claim.status().is_terminal() {
                resolved += 1;
            }
        }

        let mut total_claims = 0u32;
        for address in &self.users {
            if let Some(user) = store.user(address) {
                total_claims += user.total_claims();
                if user.correct_claims() > user.total_claims() {
                    violations.push(format!("step {}: {} has more correct than total", step, address));
                }
                if user.won_disputes() > user.total_disputes() {
                    violations.push(format!("step {}: {} won more disputes than fought", step, address));
                }
            }
        }
        if total_claims != resolved {
            violations.push(format!(
                "step {}: {} resolved claims but {} counted",
                step, resolved, total_claims
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_light_fuzzing() {
        let mut fuzzer = LedgerFuzzer::new(FuzzerConfig::light());
        let result = fuzzer.run();
        assert!(result.is_valid(), "violations: {:?}", result.violations);
        assert!(result.requests_applied > 0);
        assert!(result.requests_rejected > 0);
    }

    #[test]
    fn test_many_seeds() {
        for seed in 0..20 {
            let mut fuzzer = LedgerFuzzer::new(FuzzerConfig {
                seed,
                request_count: 300,
                ..FuzzerConfig::default()
            });
            let result = fuzzer.run();
            assert!(result.is_valid(), "seed {}: {:?}", seed, result.violations);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_any_seed_keeps_ledger_consistent(
            seed in any::<u64>(),
            user_count in 2usize..6,
            max_step_secs in 0u64..150,
        ) {
            let mut fuzzer = LedgerFuzzer::new(FuzzerConfig {
                seed,
                user_count,
                max_step_secs,
                request_count: 100,
                ..FuzzerConfig::default()
            });
            let result = fuzzer.run();
            prop_assert!(result.is_valid(), "seed {}: {:?}", seed, result.violations);
        }
    }

    #[test]
    fn test_fuzzing_resolves_claims() {
        let mut fuzzer = LedgerFuzzer::new(FuzzerConfig::default());
        let result = fuzzer.run();
        assert!(result.is_valid(), "violations: {:?}", result.violations);
        assert!(result.claims_resolved > 0);
    }

    #[test]
    #[ignore]
    fn test_heavy_fuzzing() {
        let mut fuzzer = LedgerFuzzer::new(FuzzerConfig::heavy());
        assert!(fuzzer.run().is_valid());
    }
}
