//! Attest Wire - Fragment format and content codec
//!
//! This crate implements how revealed data travels to the engine:
//! - Content codec (gzip, lossless and deterministic)
//! - Fragment wire form: 8-byte big-endian header + payload
//! - Hex text form (`0x` prefixed) used in request payloads
//! - Splitter that compresses and partitions data into fragments

pub mod codec;
pub mod fragment;
pub mod split;

pub use codec::*;
pub use fragment::*;
pub use split::*;
