//! Fragment wire form
//!
//! A fragment is 8 bytes of header followed by its payload:
//! - Bytes 0-3: Fragment index (BE)
//! - Bytes 4-7: Total fragment count minus one (BE)
//! - Bytes 8..: Payload (a slice of the compressed content)
//!
//! In request payloads fragments travel as `0x` prefixed lowercase hex.

use std::fmt;

use attest_core::{AttestError, AttestResult};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Fragment header size in bytes
pub const FRAGMENT_HEADER_SIZE: usize = 8;

/// Prefix of the hex text form
pub const HEX_PREFIX: &str = "0x";

/// Fragment header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentHeader {
    /// 0-based position of this fragment
    pub index: u32,
    /// Index of the last fragment (total count minus one)
    pub last_index: u32,
}

impl FragmentHeader {
    /// Create a header for fragment `index` out of `total` fragments
    pub fn new(index: u32, total: u32) -> Self {
        FragmentHeader {
            index,
            last_index: total.saturating_sub(1),
        }
    }

    /// Declared number of fragments in the whole payload
    #[inline]
    pub fn total(&self) -> u64 {
        self.last_index as u64 + 1
    }

    /// Parse header from bytes
    pub fn parse(mut buf: &[u8]) -> AttestResult<Self> {
        if buf.len() < FRAGMENT_HEADER_SIZE {
            return Err(AttestError::BufferTooShort {
                expected: FRAGMENT_HEADER_SIZE,
                actual: buf.len(),
            });
        }

        let index = buf.get_u32();
        let last_index = buf.get_u32();

        Ok(FragmentHeader { index, last_index })
    }

    /// Serialize header into a buffer
    pub fn serialize(&self, buf: &mut impl BufMut) {
        buf.put_u32(self.index);
        buf.put_u32(self.last_index);
    }
}

/// One indexed piece of a compressed payload
#[derive(Clone, PartialEq, Eq)]
pub struct Fragment {
    pub header: FragmentHeader,
    pub payload: Bytes,
}

impl Fragment {
    pub fn new(header: FragmentHeader, payload: impl Into<Bytes>) -> Self {
        Fragment {
            header,
            payload: payload.into(),
        }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.header.index
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.header.total()
    }

    /// Parse fragment from its binary wire form
    pub fn parse(buf: &[u8]) -> AttestResult<Self> {
        let header = FragmentHeader::parse(buf)?;
        let payload = Bytes::copy_from_slice(&buf[FRAGMENT_HEADER_SIZE..]);
        Ok(Fragment { header, payload })
    }

    /// Serialize fragment to its binary wire form
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(FRAGMENT_HEADER_SIZE + self.payload.len());
        self.header.serialize(&mut buf);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Parse fragment from its `0x` hex text form.
    ///
    /// Bad text is a malformed request; a well-formed but truncated
    /// fragment is a protocol violation.
    pub fn from_hex(text: &str) -> AttestResult<Self> {
        let digits = text.strip_prefix(HEX_PREFIX).ok_or_else(|| {
            AttestError::MalformedRequest(format!(
                "fragment must be hex prefixed with '{}'",
                HEX_PREFIX
            ))
        })?;
        let raw = hex::decode(digits).map_err(|e| {
            AttestError::MalformedRequest(format!("error converting hex to bytes: {}", e))
        })?;
        Fragment::parse(&raw)
    }

    /// Serialize fragment to its `0x` hex text form
    pub fn to_hex(&self) -> String {
        format!("{}{}", HEX_PREFIX, hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fragment({}/{}, {}b)",
            self.header.index,
            self.total(),
            self.payload.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout_is_big_endian() {
        let fragment = Fragment::new(FragmentHeader::new(1, 3), vec![0xAA, 0xBB]);
        let bytes = fragment.to_bytes();
        assert_eq!(&bytes[..], &[0, 0, 0, 1, 0, 0, 0, 2, 0xAA, 0xBB]);
    }

    #[test]
    fn test_hex_form() {
        let fragment = Fragment::new(FragmentHeader::new(0, 1), vec![0x1f, 0x8b]);
        let text = fragment.to_hex();
        assert_eq!(text, "0x00000000000000001f8b");

        let parsed = Fragment::from_hex(&text).unwrap();
        assert_eq!(parsed, fragment);
        assert_eq!(parsed.total(), 1);
    }

    #[test]
    fn test_total_from_max_last_index() {
        let header = FragmentHeader::parse(&[0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(header.total(), u32::MAX as u64 + 1);
    }

    #[test]
    fn test_fragment_too_short() {
        let result = Fragment::from_hex("0x000000");
        assert!(matches!(result, Err(AttestError::BufferTooShort { .. })));
    }

    #[test]
    fn test_fragment_bad_text() {
        assert!(matches!(
            Fragment::from_hex("00000000000000001f8b"),
            Err(AttestError::MalformedRequest(_))
        ));
        assert!(matches!(
            Fragment::from_hex("0xzz"),
            Err(AttestError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_empty_payload_allowed() {
        let parsed = Fragment::from_hex("0x0000000200000004").unwrap();
        assert_eq!(parsed.index(), 2);
        assert_eq!(parsed.total(), 5);
        assert!(parsed.payload.is_empty());
    }
}
