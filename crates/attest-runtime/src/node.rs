//! Node - request dispatch around the claim engine
//!
//! The node decodes each delivered payload, applies it to the engine and
//! emits exactly one report per request, on success and on failure alike.
//! Errors are still returned so the caller can tell the two apart.

use attest_core::{Address, AttestError, AttestResult, Timestamp};
use attest_state::{ClaimEngine, Outcome};
use tracing::{debug, info, warn};

use crate::{AdvanceRequest, ClaimDetail, ClaimSummary, Envelope, InspectRequest, NodeConfig, Request};

/// Destination for human-readable status reports
pub trait ReportSink {
    fn report(&mut self, message: &str);
}

impl ReportSink for Vec<String> {
    fn report(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Dispatch counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub advances_applied: u64,
    pub advances_rejected: u64,
    pub inspects_served: u64,
    pub inspects_failed: u64,
    /// Inputs that did not decode to a request of the expected kind
    pub malformed_inputs: u64,
}

/// Claim node
#[derive(Debug)]
pub struct Node {
    engine: ClaimEngine,
    stats: NodeStats,
}

impl Node {
    pub fn new(config: &NodeConfig) -> Self {
        Self::with_engine(ClaimEngine::new(config.engine_config()))
    }

    pub fn with_engine(engine: ClaimEngine) -> Self {
        Node {
            engine,
            stats: NodeStats::default(),
        }
    }

    pub fn engine(&self) -> &ClaimEngine {
        &self.engine
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Handle a state-changing payload from `sender` at `now`
    pub fn advance(
        &mut self,
        sender: &Address,
        now: Timestamp,
        payload: &[u8],
        sink: &mut impl ReportSink,
    ) -> AttestResult<Outcome> {
        self.dispatch_advance(sender, now, Request::decode(payload), sink)
    }

    /// Handle a read-only payload. Returns the JSON view that was reported.
    pub fn inspect(&mut self, payload: &[u8], sink: &mut impl ReportSink) -> AttestResult<String> {
        self.dispatch_inspect(Request::decode(payload), sink)
    }

    /// Handle one delivered envelope
    pub fn handle(&mut self, envelope: &Envelope, sink: &mut impl ReportSink) -> AttestResult<()> {
        match envelope {
            Envelope::Advance {
                sender,
                timestamp,
                payload,
            } => {
                let sender = match Address::new(sender) {
                    Ok(sender) => sender,
                    Err(e) => return self.reject_malformed(e, sink),
                };
                let now = Timestamp::from_secs(*timestamp);
                self.dispatch_advance(&sender, now, Request::from_json(payload.clone()), sink)
                    .map(|_| ())
            }
            Envelope::Inspect { payload } => self
                .dispatch_inspect(Request::from_json(payload.clone()), sink)
                .map(|_| ()),
        }
    }

    fn dispatch_advance(
        &mut self,
        sender: &Address,
        now: Timestamp,
        decoded: AttestResult<Request>,
        sink: &mut impl ReportSink,
    ) -> AttestResult<Outcome> {
        let request = match decoded {
            Ok(Request::Advance(request)) => request,
            Ok(Request::Inspect(_)) => {
                let e = AttestError::MalformedRequest("inspection sent as advance".into());
                return self.reject_malformed(e, sink);
            }
            Err(e) => return self.reject_malformed(e, sink),
        };

        let action = request.action();
        debug!(action, sender = %sender, now = now.as_secs(), "dispatching request");

        match self.apply(sender, now, request) {
            Ok(outcome) => {
                self.stats.advances_applied += 1;
                sink.report(&outcome.to_string());
                Ok(outcome)
            }
            Err(e) => {
                self.stats.advances_rejected += 1;
                info!(action, error = %e, kind = ?e.kind(), "request rejected");
                sink.report(&format!("{} rejected: {}", action, e));
                Err(e)
            }
        }
    }

    fn apply(
        &mut self,
        sender: &Address,
        now: Timestamp,
        request: AdvanceRequest,
    ) -> AttestResult<Outcome> {
        match request {
            AdvanceRequest::Create { id, value } => self.engine.create(id, value, sender, now),
            AdvanceRequest::Dispute { id } => self.engine.dispute(&id, sender, now),
            AdvanceRequest::Finalize { id } => self.engine.finalize(&id, now),
            AdvanceRequest::Validate { id, data } => {
                self.engine.validate(&id, sender, data.as_bytes(), now)
            }
            AdvanceRequest::ValidateChunk { id, fragment } => {
                self.engine.validate_chunk(&id, sender, fragment, now)
            }
        }
    }

    fn dispatch_inspect(
        &mut self,
        decoded: AttestResult<Request>,
        sink: &mut impl ReportSink,
    ) -> AttestResult<String> {
        let request = match decoded {
            Ok(Request::Inspect(request)) => request,
            Ok(Request::Advance(request)) => {
                let e = AttestError::MalformedRequest(format!(
                    "'{}' is not an inspection",
                    request.action()
                ));
                return self.reject_malformed(e, sink);
            }
            Err(e) => return self.reject_malformed(e, sink),
        };

        match self.render(&request) {
            Ok(view) => {
                self.stats.inspects_served += 1;
                sink.report(&view);
                Ok(view)
            }
            Err(e) => {
                self.stats.inspects_failed += 1;
                debug!(error = %e, "inspection failed");
                sink.report(&e.to_string());
                Err(e)
            }
        }
    }

    fn render(&self, request: &InspectRequest) -> AttestResult<String> {
        let store = self.engine.store();
        let view = match request {
            InspectRequest::ShowClaim { id } => {
                let claim = store
                    .claim(id)
                    .ok_or_else(|| AttestError::ClaimNotFound(id.clone()))?;
                serde_json::to_string(&ClaimDetail::from(claim))
            }
            InspectRequest::ShowUser { address } => {
                let user = store
                    .user(address)
                    .ok_or_else(|| AttestError::UserNotFound(address.to_string()))?;
                serde_json::to_string(user)
            }
            InspectRequest::ListClaims => {
                let claims: Vec<ClaimSummary> = store.claims().map(ClaimSummary::from).collect();
                serde_json::to_string(&claims)
            }
        };
        view.map_err(|e| AttestError::InvalidWireFormat(e.to_string()))
    }

    fn reject_malformed<T>(&mut self, e: AttestError, sink: &mut impl ReportSink) -> AttestResult<T> {
        self.stats.malformed_inputs += 1;
        warn!(error = %e, "unrecognized input");
        sink.report(&format!("Unrecognized input: {}", e));
        Err(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::{ClaimStatus, ErrorKind};
    use attest_crypto::fingerprint;
    use serde_json::{json, Value};

    const TABLE: &str = "a,b,c\n1,,3\nna,5,6\n";

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    fn payload(value: Value) -> Vec<u8> {
        value.to_string().into_bytes()
    }

    fn node() -> Node {
        Node::new(&NodeConfig::default())
    }

    #[test]
    fn test_every_request_reports_once() {
        let mut node = node();
        let mut reports = Vec::new();
        let alice = addr("0xa");

        node.advance(
            &alice,
            Timestamp::ZERO,
            &payload(json!({"action": "claim", "id": "X", "value": 5})),
            &mut reports,
        )
        .unwrap();
        let err = node
            .advance(
                &alice,
                Timestamp::ZERO,
                &payload(json!({"action": "dispute", "id": "X"})),
                &mut reports,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        let err = node
            .advance(
                &alice,
                Timestamp::ZERO,
                &payload(json!({"action": "finalize", "id": "Y"})),
                &mut reports,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0], "Claim X created with value 5");
        assert!(reports[1].starts_with("dispute rejected:"));
        assert!(reports[2].starts_with("finalize rejected:"));

        let stats = node.stats();
        assert_eq!(stats.advances_applied, 1);
        assert_eq!(stats.advances_rejected, 2);
    }

    #[test]
    fn test_unrecognized_input() {
        let mut node = node();
        let mut reports = Vec::new();

        let err = node
            .advance(&addr("0xa"), Timestamp::ZERO, b"{\"action\":\"steal\"}", &mut reports)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRequest);
        assert!(node
            .advance(
                &addr("0xa"),
                Timestamp::ZERO,
                &payload(json!({"action": "getClaimList"})),
                &mut reports
            )
            .is_err());
        assert!(node
            .inspect(&payload(json!({"action": "finalize", "id": "X"})), &mut reports)
            .is_err());

        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.starts_with("Unrecognized input")));
        assert_eq!(node.stats().malformed_inputs, 3);
        assert_eq!(node.engine().store().claim_count(), 0);
    }

    #[test]
    fn test_timeout_report_names_remaining_seconds() {
        let mut node = node();
        let mut reports = Vec::new();
        let alice = addr("0xa");
        node.advance(
            &alice,
            Timestamp::from_secs(100),
            &payload(json!({"action": "claim", "id": "X", "value": 5})),
            &mut reports,
        )
        .unwrap();
        let _ = node.advance(
            &alice,
            Timestamp::from_secs(100 + 86_399),
            &payload(json!({"action": "finalize", "id": "X"})),
            &mut reports,
        );
        assert!(reports[1].contains("1 more seconds to go"), "{}", reports[1]);
    }

    #[test]
    fn test_validate_through_node() {
        let mut node = node();
        let mut reports = Vec::new();
        let id = fingerprint(TABLE.as_bytes()).unwrap();
        let alice = addr("0xa");

        node.advance(
            &alice,
            Timestamp::ZERO,
            &payload(json!({"action": "claim", "id": id, "value": 666666})),
            &mut reports,
        )
        .unwrap();
        let outcome = node
            .advance(
                &alice,
                Timestamp::from_secs(1),
                &payload(json!({"action": "validate", "id": id, "data": TABLE})),
                &mut reports,
            )
            .unwrap();
        assert_eq!(outcome.status(), ClaimStatus::Validated);
        assert_eq!(reports[1], format!("Claim {} validated: data matches claim", id));
    }

    #[test]
    fn test_inspection_views() {
        let mut node = node();
        let mut reports = Vec::new();
        node.advance(
            &addr("0xA"),
            Timestamp::from_secs(7),
            &payload(json!({"action": "claim", "id": "X", "value": 42})),
            &mut reports,
        )
        .unwrap();
        node.advance(
            &addr("0xb"),
            Timestamp::from_secs(9),
            &payload(json!({"action": "dispute", "id": "X"})),
            &mut reports,
        )
        .unwrap();

        let list = node
            .inspect(&payload(json!({"action": "getClaimList"})), &mut reports)
            .unwrap();
        let list: Value = serde_json::from_str(&list).unwrap();
        assert_eq!(list, json!([{"id": "X", "status": "disputing", "value": 42}]));

        let detail = node
            .inspect(&payload(json!({"action": "showClaim", "id": "X"})), &mut reports)
            .unwrap();
        let detail: Value = serde_json::from_str(&detail).unwrap();
        assert_eq!(detail["userAddress"], "0xa");
        assert_eq!(detail["disputingUserAddress"], "0xb");
        assert_eq!(detail["lastEdited"], 9);
        assert_eq!(detail["dataChunks"], Value::Null);

        let user = node
            .inspect(&payload(json!({"action": "showUser", "id": "0xA"})), &mut reports)
            .unwrap();
        let user: Value = serde_json::from_str(&user).unwrap();
        assert_eq!(user["openDisputes"], json!(["X"]));
        assert_eq!(user["openClaims"], json!([]));

        let err = node
            .inspect(&payload(json!({"action": "showUser", "id": "0xc"})), &mut reports)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(reports.len(), 6);
        assert_eq!(node.stats().inspects_failed, 1);
    }

    #[test]
    fn test_handle_envelope() {
        let mut node = node();
        let mut reports = Vec::new();
        let envelope: Envelope = serde_json::from_value(json!({
            "kind": "advance",
            "sender": "0xA",
            "timestamp": 3,
            "payload": {"action": "claim", "id": "X", "value": 1}
        }))
        .unwrap();
        node.handle(&envelope, &mut reports).unwrap();

        let claim = node
            .engine()
            .store()
            .claim(&attest_core::ClaimId::new("X").unwrap())
            .unwrap();
        assert_eq!(claim.owner().as_str(), "0xa");
        assert_eq!(claim.last_edited(), Timestamp::from_secs(3));

        let no_action = Envelope::advance(&addr("0xa"), Timestamp::ZERO, json!({}));
        assert!(node.handle(&no_action, &mut reports).is_err());
        assert_eq!(reports.len(), 2);

        let list = Envelope::inspect(json!({"action": "getClaimList"}));
        node.handle(&list, &mut reports).unwrap();
        assert_eq!(reports.len(), 3);
        let listed: serde_json::Value = serde_json::from_str(&reports[2]).unwrap();
        assert_eq!(listed, json!([{"id": "X", "status": "open", "value": 1}]));
    }
}
