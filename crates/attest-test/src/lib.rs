//! Attest Test Harness - Scenario driving and ledger validation
//!
//! This crate provides:
//! - A scenario harness playing the delivery collaborator
//! - Randomized ledger fuzzing with invariant checks
//! - End-to-end integration testing

pub mod harness;
pub mod integration;
pub mod ledger_fuzzer;

pub use harness::*;
pub use integration::*;
pub use ledger_fuzzer::*;
