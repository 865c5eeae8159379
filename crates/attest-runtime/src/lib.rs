//! Attest Runtime - Request handling around the claim engine
//!
//! This crate connects the deterministic engine to its delivery harness:
//! - Request envelope decoding into typed requests
//! - Node dispatch with one report per request
//! - Read-only inspection views
//! - Configuration and logging setup
//! - Mutex-serialized shared node for concurrent callers

pub mod config;
pub mod node;
pub mod observability;
pub mod request;
pub mod shared;
pub mod view;

pub use config::*;
pub use node::*;
pub use observability::*;
pub use request::*;
pub use shared::*;
pub use view::*;
