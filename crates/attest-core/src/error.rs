//! Error types for the claim engine

use thiserror::Error;

use crate::{ClaimId, ClaimStatus};

/// Coarse classification of failures.
///
/// Every kind is local to one request; none is fatal to the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or wrong-typed field, out-of-range value
    MalformedRequest,
    /// Unknown claim or user
    NotFound,
    /// Wrong status, wrong sender, timeout not elapsed
    PreconditionFailed,
    /// Inconsistent fragment stream; only the offending fragment is rejected
    ProtocolViolation,
    /// Validator could not judge the data; resolves the claim as invalid
    ValidationInternal,
}

/// Core Attest errors
#[derive(Error, Debug)]
pub enum AttestError {
    // Request errors
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Claim value {0} exceeds 1000000")]
    ValueOutOfRange(u64),

    // Lookup errors
    #[error("Claim {0} doesn't exist")]
    ClaimNotFound(ClaimId),

    #[error("User {0} doesn't exist")]
    UserNotFound(String),

    // Precondition errors
    #[error("Claim {0} already exists")]
    ClaimExists(ClaimId),

    #[error("Can only {operation} {expected} claims, claim is {actual}")]
    InvalidStatus {
        operation: &'static str,
        expected: &'static str,
        actual: ClaimStatus,
    },

    #[error("Can not dispute own claims")]
    SelfDispute,

    #[error("Can only validate own claims")]
    NotOwner,

    #[error("Claim can't be finalized yet, {remaining_secs} more seconds to go")]
    TimeoutPending { remaining_secs: u64 },

    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Inconsistent chunk index {index}, total is {total}")]
    ChunkIndexOutOfRange { index: u32, total: u64 },

    #[error("Inconsistent number of chunks: assembly expects {expected}, fragment declares {declared}")]
    ChunkCountMismatch { expected: u64, declared: u64 },

    #[error("Fragment declares {declared} chunks, limit is {limit}")]
    TooManyChunks { declared: u64, limit: u32 },

    #[error("Assembly would buffer {size} bytes, limit is {limit}")]
    AssemblyTooLarge { size: u64, limit: u64 },

    // Codec errors
    #[error("Compression failed: {0}")]
    Compression(String),

    #[error("Decompression failed: {0}")]
    Decompression(String),

    // Validation errors
    #[error("Invalid content fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("Table parse error: {0}")]
    TableParse(String),

    #[error("Table has no data cells")]
    EmptyTable,
}

impl AttestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttestError::MalformedRequest(_) | AttestError::ValueOutOfRange(_) => {
                ErrorKind::MalformedRequest
            }
            AttestError::ClaimNotFound(_) | AttestError::UserNotFound(_) => ErrorKind::NotFound,
            AttestError::ClaimExists(_)
            | AttestError::InvalidStatus { .. }
            | AttestError::SelfDispute
            | AttestError::NotOwner
            | AttestError::TimeoutPending { .. } => ErrorKind::PreconditionFailed,
            AttestError::InvalidWireFormat(_)
            | AttestError::BufferTooShort { .. }
            | AttestError::ChunkIndexOutOfRange { .. }
            | AttestError::ChunkCountMismatch { .. }
            | AttestError::TooManyChunks { .. }
            | AttestError::AssemblyTooLarge { .. } => ErrorKind::ProtocolViolation,
            AttestError::Compression(_)
            | AttestError::Decompression(_)
            | AttestError::InvalidFingerprint(_)
            | AttestError::TableParse(_)
            | AttestError::EmptyTable => ErrorKind::ValidationInternal,
        }
    }
}

/// Result type for Attest operations
pub type AttestResult<T> = Result<T, AttestError>;
