//! Claim registry and user ledger
//!
//! Claims are never removed once created. Users are created lazily the
//! first time an operation needs their ledger entry.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use attest_core::{Address, ClaimId, ClaimStatus, Timestamp};
use serde::Serialize;

use crate::ChunkAssembly;

/// A content claim
#[derive(Clone, Debug)]
pub struct Claim {
    id: ClaimId,
    owner: Address,
    value: u64,
    pub(crate) disputer: Option<Address>,
    pub(crate) last_edited: Timestamp,
    pub(crate) status: ClaimStatus,
    pub(crate) assembly: Option<ChunkAssembly>,
}

impl Claim {
    pub(crate) fn new(id: ClaimId, owner: Address, value: u64, now: Timestamp) -> Self {
        Claim {
            id,
            owner,
            value,
            disputer: None,
            last_edited: now,
            status: ClaimStatus::Open,
            assembly: None,
        }
    }

    pub fn id(&self) -> &ClaimId {
        &self.id
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn disputer(&self) -> Option<&Address> {
        self.disputer.as_ref()
    }

    /// Claimed completeness in parts per million
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn last_edited(&self) -> Timestamp {
        self.last_edited
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    /// Chunked validation in progress, if any
    pub fn assembly(&self) -> Option<&ChunkAssembly> {
        self.assembly.as_ref()
    }
}

/// Per-address ledger entry. Counters only ever grow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Open claims owned by this address
    pub(crate) open_claims: BTreeSet<ClaimId>,
    /// Claims owned by this address that are under dispute
    pub(crate) open_disputes: BTreeSet<ClaimId>,
    pub(crate) total_disputes: u32,
    pub(crate) won_disputes: u32,
    pub(crate) total_claims: u32,
    pub(crate) correct_claims: u32,
}

impl User {
    pub fn open_claims(&self) -> &BTreeSet<ClaimId> {
        &self.open_claims
    }

    pub fn open_disputes(&self) -> &BTreeSet<ClaimId> {
        &self.open_disputes
    }

    pub fn total_disputes(&self) -> u32 {
        self.total_disputes
    }

    pub fn won_disputes(&self) -> u32 {
        self.won_disputes
    }

    pub fn total_claims(&self) -> u32 {
        self.total_claims
    }

    pub fn correct_claims(&self) -> u32 {
        self.correct_claims
    }
}

/// Claim registry plus user ledger
#[derive(Debug, Default)]
pub struct ClaimStore {
    claims: BTreeMap<ClaimId, Claim>,
    users: HashMap<Address, User>,
}

impl ClaimStore {
    pub fn new() -> Self {
        ClaimStore::default()
    }

    pub fn claim(&self, id: &ClaimId) -> Option<&Claim> {
        self.claims.get(id)
    }

    pub(crate) fn claim_mut(&mut self, id: &ClaimId) -> Option<&mut Claim> {
        self.claims.get_mut(id)
    }

    pub fn contains_claim(&self, id: &ClaimId) -> bool {
        self.claims.contains_key(id)
    }

    pub(crate) fn insert_claim(&mut self, claim: Claim) {
        self.claims.insert(claim.id.clone(), claim);
    }

    /// All claims, ordered by id
    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.claims.values()
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    pub fn user(&self, address: &Address) -> Option<&User> {
        self.users.get(address)
    }

    /// Ledger entry for `address`, created empty on first use
    pub(crate) fn get_or_create_user(&mut self, address: &Address) -> &mut User {
        self.users.entry(address.clone()).or_default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}
