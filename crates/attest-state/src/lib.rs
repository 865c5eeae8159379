//! Attest State Engine - Claim lifecycle and adjudication
//!
//! This crate implements the deterministic core:
//! - Chunk assembly of revealed data
//! - Table completeness scoring
//! - Claim validation (fingerprint + completeness)
//! - Claim registry and user ledger
//! - Claim/dispute state machine with timeout-gated finalization

pub mod assembly;
pub mod engine;
pub mod ledger;
pub mod table;
pub mod validator;

pub use assembly::*;
pub use engine::*;
pub use ledger::*;
pub use table::*;
pub use validator::*;
