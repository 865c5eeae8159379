//! Shared node - one critical section around the whole node
//!
//! Engine operations are not safe under interleaving, so concurrent
//! callers take a single lock for the full request.

use std::sync::Arc;

use attest_core::{Address, AttestResult, Timestamp};
use attest_state::Outcome;
use parking_lot::Mutex;

use crate::{Envelope, Node, NodeConfig, NodeStats, ReportSink};

#[derive(Clone, Debug)]
pub struct SharedNode {
    inner: Arc<Mutex<Node>>,
}

impl SharedNode {
    pub fn new(node: Node) -> Self {
        SharedNode {
            inner: Arc::new(Mutex::new(node)),
        }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(Node::new(config))
    }

    pub fn advance(
        &self,
        sender: &Address,
        now: Timestamp,
        payload: &[u8],
        sink: &mut impl ReportSink,
    ) -> AttestResult<Outcome> {
        self.inner.lock().advance(sender, now, payload, sink)
    }

    pub fn inspect(&self, payload: &[u8], sink: &mut impl ReportSink) -> AttestResult<String> {
        self.inner.lock().inspect(payload, sink)
    }

    pub fn handle(&self, envelope: &Envelope, sink: &mut impl ReportSink) -> AttestResult<()> {
        self.inner.lock().handle(envelope, sink)
    }

    pub fn stats(&self) -> NodeStats {
        self.inner.lock().stats().clone()
    }

    /// Run `f` with the node locked
    pub fn with_node<R>(&self, f: impl FnOnce(&Node) -> R) -> R {
        f(&self.inner.lock())
    }
}
