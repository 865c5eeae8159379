//! Splitter - compress a payload and partition it into fragments

use attest_core::{AttestError, AttestResult};

use crate::{compress, Fragment, FragmentHeader};

/// Compress `data` and split it into fragments of at most
/// `max_fragment_size` payload bytes, numbered `0..N-1`.
///
/// An exact multiple of `max_fragment_size` yields exactly
/// `size / max_fragment_size` fragments, never a trailing empty one.
pub fn split(data: &[u8], max_fragment_size: usize) -> AttestResult<Vec<Fragment>> {
    if data.is_empty() {
        return Err(AttestError::MalformedRequest("invalid empty data".into()));
    }
    if max_fragment_size == 0 {
        return Err(AttestError::MalformedRequest(
            "max fragment size must be at least 1".into(),
        ));
    }

    let compressed = compress(data)?;
    let count = compressed.len().div_ceil(max_fragment_size);
    let total = u32::try_from(count).map_err(|_| {
        AttestError::InvalidWireFormat(format!("{} fragments exceed the u32 index space", count))
    })?;

    Ok(compressed
        .chunks(max_fragment_size)
        .zip(0u32..)
        .map(|(chunk, index)| {
            Fragment::new(FragmentHeader::new(index, total), chunk.to_vec())
        })
        .collect())
}

/// Split `data` and render every fragment in its `0x` hex text form,
/// ready to be sent one per chunked validation request.
pub fn prepare_fragments(data: &[u8], max_fragment_size: usize) -> AttestResult<Vec<String>> {
    Ok(split(data, max_fragment_size)?
        .iter()
        .map(Fragment::to_hex)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress;

    fn rejoin(fragments: &[Fragment]) -> Vec<u8> {
        fragments
            .iter()
            .flat_map(|f| f.payload.iter().copied())
            .collect()
    }

    #[test]
    fn test_split_numbers_fragments() {
        let data: Vec<u8> = (0..5000u32).flat_map(|i| i.to_be_bytes()).collect();
        let fragments = split(&data, 64).unwrap();

        let total = fragments.len() as u64;
        for (i, fragment) in fragments.iter().enumerate() {
            assert_eq!(fragment.index() as usize, i);
            assert_eq!(fragment.total(), total);
            assert!(fragment.payload.len() <= 64);
        }
        assert_eq!(decompress(&rejoin(&fragments)).unwrap(), data);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let data = b"header\nrow,row\n".repeat(40);
        let size = compress(&data).unwrap().len();

        for max in [1, 2, size, size / 2] {
            if max == 0 || size % max != 0 {
                continue;
            }
            let fragments = split(&data, max).unwrap();
            assert_eq!(fragments.len(), size / max);
            assert!(fragments.iter().all(|f| f.payload.len() == max));
        }
    }

    #[test]
    fn test_single_fragment_when_large_limit() {
        let fragments = split(b"a,b\n1,2\n", 409_600).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].header.last_index, 0);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            split(b"", 10),
            Err(AttestError::MalformedRequest(_))
        ));
        assert!(split(b"abc", 0).is_err());
    }

    #[test]
    fn test_prepare_fragments_hex() {
        let prepared = prepare_fragments(b"a,b\n1,2\n", 8).unwrap();
        assert!(prepared.len() > 1);
        for (i, text) in prepared.iter().enumerate() {
            let fragment = Fragment::from_hex(text).unwrap();
            assert_eq!(fragment.index() as usize, i);
        }
    }
}
