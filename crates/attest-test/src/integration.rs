//! End-to-end Integration Test Suite
//!
//! Full request flows through the node, from JSON payload to report:
//! - Claim, dispute and validation outcomes and their ledger effects
//! - Chunked validation over hex fragments
//! - Timeout-based finalization
//! - Inspection views

use attest_core::ClaimStatus;
use attest_crypto::fingerprint;
use attest_wire::prepare_fragments;
use serde_json::Value;

use crate::ScenarioHarness;

/// Table scored 666666 (4 of 6 data cells filled)
pub const SAMPLE_TABLE: &str = "a,b,c\n1,,3\nna,5,6\n";

pub const SAMPLE_COMPLETENESS: u64 = 666_666;

/// Claim id for [`SAMPLE_TABLE`]
pub fn sample_id() -> String {
    fingerprint(SAMPLE_TABLE.as_bytes()).unwrap_or_default()
}

/// Result of a scripted scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub status: ClaimStatus,
    pub owner: Value,
    pub disputer: Option<Value>,
    pub reports: Vec<String>,
}

/// Claim `X` at 600000, dispute it, then reveal data that does not
/// fingerprint to `X`.
pub fn run_contradicted_dispute() -> ScenarioResult {
    let mut harness = ScenarioHarness::default();
    let _ = harness.create("0xowner", "X", 600_000);
    harness.advance_clock(10);
    let _ = harness.dispute("0xrival", "X");
    harness.advance_clock(10);
    let _ = harness.validate("0xowner", "X", SAMPLE_TABLE);
    collect(&mut harness, "X", "0xowner", Some("0xrival"))
}

/// Claim the sample table and validate it with fragments delivered
/// last-to-first.
pub fn run_chunked_validation(max_fragment_size: usize) -> ScenarioResult {
    let mut harness = ScenarioHarness::default();
    let id = sample_id();
    let _ = harness.create("0xowner", &id, SAMPLE_COMPLETENESS);
    let fragments = prepare_fragments(SAMPLE_TABLE.as_bytes(), max_fragment_size).unwrap_or_default();
    for fragment in fragments.iter().rev() {
        harness.advance_clock(1);
        let _ = harness.validate_chunk("0xowner", &id, fragment);
    }
    collect(&mut harness, &id, "0xowner", None)
}

fn collect(
    harness: &mut ScenarioHarness,
    id: &str,
    owner: &str,
    disputer: Option<&str>,
) -> ScenarioResult {
    let status = harness
        .node()
        .engine()
        .store()
        .claims()
        .find(|c| c.id().as_str() == id)
        .map_or(ClaimStatus::Open, |c| c.status());
    let owner = harness.show_user(owner).unwrap_or(Value::Null);
    let disputer = disputer.map(|d| harness.show_user(d).unwrap_or(Value::Null));
    ScenarioResult {
        status,
        owner,
        disputer,
        reports: harness.reports().to_vec(),
    }
}
