//! Scenario harness - plays the delivery collaborator for a single node
//!
//! Requests are delivered one at a time with a monotonic clock. Every
//! report the node emits is captured for inspection.

use attest_core::{Address, AttestResult, Timestamp};
use attest_runtime::{Node, NodeConfig};
use attest_state::Outcome;
use serde_json::{json, Value};

/// Harness around one node
pub struct ScenarioHarness {
    node: Node,
    clock: Timestamp,
    reports: Vec<String>,
}

impl ScenarioHarness {
    pub fn new(config: NodeConfig) -> Self {
        ScenarioHarness {
            node: Node::new(&config),
            clock: Timestamp::ZERO,
            reports: Vec::new(),
        }
    }

    /// Harness with custom timeouts and otherwise default configuration
    pub fn with_timeouts(claim_secs: u64, dispute_secs: u64) -> Self {
        Self::new(NodeConfig {
            claim_timeout_secs: claim_secs,
            dispute_timeout_secs: dispute_secs,
            ..NodeConfig::default()
        })
    }

    pub fn now(&self) -> Timestamp {
        self.clock
    }

    /// Move the clock forward
    pub fn advance_clock(&mut self, secs: u64) {
        self.clock = self.clock.saturating_add_secs(secs);
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn reports(&self) -> &[String] {
        &self.reports
    }

    pub fn last_report(&self) -> Option<&str> {
        self.reports.last().map(String::as_str)
    }

    /// Deliver a raw advance payload from `sender`
    pub fn submit(&mut self, sender: &str, payload: Value) -> AttestResult<Outcome> {
        let sender = Address::new(sender)?;
        let bytes = payload.to_string().into_bytes();
        self.node.advance(&sender, self.clock, &bytes, &mut self.reports)
    }

    pub fn create(&mut self, sender: &str, id: &str, value: u64) -> AttestResult<Outcome> {
        self.submit(sender, json!({"action": "claim", "id": id, "value": value}))
    }

    pub fn dispute(&mut self, sender: &str, id: &str) -> AttestResult<Outcome> {
        self.submit(sender, json!({"action": "dispute", "id": id}))
    }

    pub fn finalize(&mut self, sender: &str, id: &str) -> AttestResult<Outcome> {
        self.submit(sender, json!({"action": "finalize", "id": id}))
    }

    pub fn validate(&mut self, sender: &str, id: &str, data: &str) -> AttestResult<Outcome> {
        self.submit(sender, json!({"action": "validate", "id": id, "data": data}))
    }

    /// Deliver one `0x`-hex fragment
    pub fn validate_chunk(&mut self, sender: &str, id: &str, fragment: &str) -> AttestResult<Outcome> {
        self.submit(sender, json!({"action": "validateChunk", "id": id, "data": fragment}))
    }

    fn inspect(&mut self, payload: Value) -> AttestResult<Value> {
        let bytes = payload.to_string().into_bytes();
        let view = self.node.inspect(&bytes, &mut self.reports)?;
        Ok(serde_json::from_str(&view).unwrap_or(Value::Null))
    }

    pub fn show_claim(&mut self, id: &str) -> AttestResult<Value> {
        self.inspect(json!({"action": "showClaim", "id": id}))
    }

    pub fn show_user(&mut self, address: &str) -> AttestResult<Value> {
        self.inspect(json!({"action": "showUser", "id": address}))
    }

    pub fn claim_list(&mut self) -> AttestResult<Value> {
        self.inspect(json!({"action": "getClaimList"}))
    }
}

impl Default for ScenarioHarness {
    fn default() -> Self {
        Self::new(NodeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let mut harness = ScenarioHarness::default();
        harness.advance_clock(10);
        harness.advance_clock(5);
        assert_eq!(harness.now(), Timestamp::from_secs(15));
    }

    #[test]
    fn test_reports_are_captured() {
        let mut harness = ScenarioHarness::default();
        harness.create("0xa", "X", 1).unwrap();
        assert!(harness.create("0xb", "X", 1).is_err());
        assert_eq!(harness.reports().len(), 2);
        assert!(harness.last_report().unwrap().starts_with("claim rejected"));
    }
}
