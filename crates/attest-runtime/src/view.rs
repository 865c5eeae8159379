//! Read-only JSON views over the claim store

use attest_core::{Address, ClaimId, ClaimStatus, Timestamp};
use attest_state::{ChunkAssembly, Claim};
use serde::Serialize;

/// One row of the claim list
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimSummary {
    pub id: ClaimId,
    pub status: ClaimStatus,
    pub value: u64,
}

impl From<&Claim> for ClaimSummary {
    fn from(claim: &Claim) -> Self {
        ClaimSummary {
            id: claim.id().clone(),
            status: claim.status(),
            value: claim.value(),
        }
    }
}

/// Progress of a chunked validation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkProgress {
    pub total_chunks: u64,
    /// Bytes buffered so far
    pub size: usize,
    /// Received fragment indices, ascending
    pub chunks: Vec<u32>,
}

impl From<&ChunkAssembly> for ChunkProgress {
    fn from(assembly: &ChunkAssembly) -> Self {
        ChunkProgress {
            total_chunks: assembly.total_chunks(),
            size: assembly.buffered_size(),
            chunks: assembly.received_indices().collect(),
        }
    }
}

/// Full view of a single claim
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDetail {
    pub id: ClaimId,
    pub user_address: Address,
    pub disputing_user_address: Option<Address>,
    pub value: u64,
    pub last_edited: Timestamp,
    pub status: ClaimStatus,
    pub data_chunks: Option<ChunkProgress>,
}

impl From<&Claim> for ClaimDetail {
    fn from(claim: &Claim) -> Self {
        ClaimDetail {
            id: claim.id().clone(),
            user_address: claim.owner().clone(),
            disputing_user_address: claim.disputer().cloned(),
            value: claim.value(),
            last_edited: claim.last_edited(),
            status: claim.status(),
            data_chunks: claim.assembly().map(ChunkProgress::from),
        }
    }
}
