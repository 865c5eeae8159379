//! Content codec - gzip compression of revealed payloads
//!
//! The gzip header written by the encoder carries no timestamp, so equal
//! inputs always compress to equal outputs.

use std::io::{Read, Write};

use attest_core::{AttestError, AttestResult};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Compress a payload
pub fn compress(data: &[u8]) -> AttestResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| AttestError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| AttestError::Compression(e.to_string()))
}

/// Decompress a payload produced by [`compress`].
///
/// Concatenated gzip members are decoded back to back.
pub fn decompress(data: &[u8]) -> AttestResult<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| AttestError::Decompression(e.to_string()))?;
    Ok(out)
}
