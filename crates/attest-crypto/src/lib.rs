//! Attest Crypto - Content identity
//!
//! Provides the content fingerprint a claim is keyed by:
//! - CIDv1 with the raw codec
//! - sha2-256 multihash of the exact payload bytes
//! - Base32 multibase text form, the same form used for claim ids

pub mod fingerprint;

pub use fingerprint::*;
