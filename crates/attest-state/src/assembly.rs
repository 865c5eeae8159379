//! Chunk assembly - rebuild a compressed payload from indexed fragments
//!
//! Fragments may arrive in any order and may be resubmitted. The first
//! fragment fixes the expected total; every later fragment must agree.

use attest_core::{AttestError, AttestResult};
use attest_wire::Fragment;
use bytes::Bytes;

/// Default bound on the number of fragments a single assembly accepts
pub const DEFAULT_MAX_TOTAL_CHUNKS: u32 = 1 << 16;

/// Default bound on the payload bytes a single assembly buffers
pub const DEFAULT_MAX_ASSEMBLY_BYTES: usize = 64 << 20;

/// Resource bounds for one assembly
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssemblyLimits {
    pub max_total_chunks: u32,
    pub max_bytes: usize,
}

impl AssemblyLimits {
    pub const fn new(max_total_chunks: u32, max_bytes: usize) -> Self {
        AssemblyLimits {
            max_total_chunks,
            max_bytes,
        }
    }
}

impl Default for AssemblyLimits {
    fn default() -> Self {
        AssemblyLimits::new(DEFAULT_MAX_TOTAL_CHUNKS, DEFAULT_MAX_ASSEMBLY_BYTES)
    }
}

/// In-flight assembly attached to a claim
#[derive(Clone, Debug)]
pub struct ChunkAssembly {
    /// One slot per fragment index
    slots: Vec<Option<Bytes>>,
    /// Number of filled slots
    received: usize,
    /// Payload bytes across filled slots
    buffered: usize,
    max_bytes: usize,
}

impl ChunkAssembly {
    /// Start an assembly from its first fragment.
    ///
    /// Nothing is created if the fragment is rejected.
    pub fn start(fragment: Fragment, limits: AssemblyLimits) -> AttestResult<Self> {
        let declared = fragment.total();
        if declared > limits.max_total_chunks as u64 {
            return Err(AttestError::TooManyChunks {
                declared,
                limit: limits.max_total_chunks,
            });
        }

        let mut assembly = ChunkAssembly {
            slots: vec![None; declared as usize],
            received: 0,
            buffered: 0,
            max_bytes: limits.max_bytes,
        };
        assembly.ingest(fragment)?;
        Ok(assembly)
    }

    /// Add a fragment. Resubmitting an index overwrites its payload.
    ///
    /// A rejected fragment leaves the assembly untouched.
    pub fn ingest(&mut self, fragment: Fragment) -> AttestResult<()> {
        let declared = fragment.total();
        let index = fragment.index();

        if index as u64 >= declared {
            return Err(AttestError::ChunkIndexOutOfRange {
                index,
                total: declared,
            });
        }
        if declared != self.total_chunks() {
            return Err(AttestError::ChunkCountMismatch {
                expected: self.total_chunks(),
                declared,
            });
        }

        let slot = &mut self.slots[index as usize];
        let replaced = slot.as_ref().map_or(0, Bytes::len);
        let buffered = self.buffered - replaced + fragment.payload.len();
        if buffered > self.max_bytes {
            return Err(AttestError::AssemblyTooLarge {
                size: buffered as u64,
                limit: self.max_bytes as u64,
            });
        }

        if slot.is_none() {
            self.received += 1;
        }
        *slot = Some(fragment.payload);
        self.buffered = buffered;
        Ok(())
    }

    /// Expected number of fragments, fixed by the first fragment
    #[inline]
    pub fn total_chunks(&self) -> u64 {
        self.slots.len() as u64
    }

    /// Number of distinct indices received
    #[inline]
    pub fn received(&self) -> usize {
        self.received
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.received == self.slots.len()
    }

    /// Indices received so far, ascending
    pub fn received_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots
            .iter()
            .zip(0u32..)
            .filter(|(slot, _)| slot.is_some())
            .map(|(_, index)| index)
    }

    /// Bytes buffered so far
    #[inline]
    pub fn buffered_size(&self) -> usize {
        self.buffered
    }

    /// Concatenate payloads in index order
    pub fn into_payload(self) -> Vec<u8> {
        debug_assert!(self.is_complete(), "composing an incomplete assembly");
        let mut payload = Vec::with_capacity(self.buffered);
        for chunk in self.slots.into_iter().flatten() {
            payload.extend_from_slice(&chunk);
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_wire::{decompress, split, FragmentHeader};
    use proptest::prelude::*;

    const LIMITS: AssemblyLimits = AssemblyLimits::new(16, 64);

    fn fragment(index: u32, total: u32, payload: &[u8]) -> Fragment {
        Fragment::new(FragmentHeader::new(index, total), payload.to_vec())
    }

    #[test]
    fn test_out_of_order_assembly() {
        let mut assembly = ChunkAssembly::start(fragment(2, 3, b"ghi"), LIMITS).unwrap();
        assert_eq!(assembly.total_chunks(), 3);
        assert!(!assembly.is_complete());

        assembly.ingest(fragment(0, 3, b"abc")).unwrap();
        assembly.ingest(fragment(1, 3, b"def")).unwrap();
        assert!(assembly.is_complete());
        assert_eq!(assembly.into_payload(), b"abcdefghi");
    }

    #[test]
    fn test_resubmission_is_idempotent() {
        let mut assembly = ChunkAssembly::start(fragment(0, 2, b"old"), LIMITS).unwrap();
        assembly.ingest(fragment(0, 2, b"new")).unwrap();

        assert_eq!(assembly.received(), 1);
        assert_eq!(assembly.total_chunks(), 2);
        assert!(!assembly.is_complete());

        assembly.ingest(fragment(1, 2, b"!")).unwrap();
        assert_eq!(assembly.into_payload(), b"new!");
    }

    #[test]
    fn test_index_beyond_total_rejected() {
        let result = ChunkAssembly::start(fragment(3, 3, b"x"), LIMITS);
        assert!(matches!(
            result,
            Err(AttestError::ChunkIndexOutOfRange { index: 3, total: 3 })
        ));
    }

    #[test]
    fn test_total_mismatch_keeps_assembly() {
        let mut assembly = ChunkAssembly::start(fragment(0, 2, b"ab"), LIMITS).unwrap();

        let result = assembly.ingest(fragment(1, 3, b"cd"));
        assert!(matches!(
            result,
            Err(AttestError::ChunkCountMismatch {
                expected: 2,
                declared: 3
            })
        ));
        assert_eq!(assembly.received(), 1);

        assembly.ingest(fragment(1, 2, b"cd")).unwrap();
        assert_eq!(assembly.into_payload(), b"abcd");
    }

    #[test]
    fn test_limit_on_declared_total() {
        let result = ChunkAssembly::start(fragment(0, 17, b""), LIMITS);
        assert!(matches!(result, Err(AttestError::TooManyChunks { .. })));
    }

    #[test]
    fn test_byte_limit_keeps_assembly() {
        let mut assembly = ChunkAssembly::start(fragment(0, 3, &[0; 40]), LIMITS).unwrap();

        let result = assembly.ingest(fragment(1, 3, &[1; 25]));
        assert!(matches!(
            result,
            Err(AttestError::AssemblyTooLarge { size: 65, limit: 64 })
        ));
        assert_eq!(assembly.received(), 1);
        assert_eq!(assembly.buffered_size(), 40);

        // Replacing a slot only counts the difference
        assembly.ingest(fragment(0, 3, &[0; 10])).unwrap();
        assembly.ingest(fragment(1, 3, &[1; 25])).unwrap();
        assembly.ingest(fragment(2, 3, &[2; 29])).unwrap();
        assert!(assembly.is_complete());
        assert_eq!(assembly.into_payload().len(), 64);
    }

    #[test]
    fn test_oversized_first_fragment() {
        let result = ChunkAssembly::start(fragment(0, 2, &[0; 65]), LIMITS);
        assert!(matches!(result, Err(AttestError::AssemblyTooLarge { .. })));
    }

    #[test]
    fn test_progress_reporting() {
        let mut assembly = ChunkAssembly::start(fragment(3, 4, b"dd"), LIMITS).unwrap();
        assembly.ingest(fragment(1, 4, b"b")).unwrap();
        assert_eq!(assembly.received_indices().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(assembly.buffered_size(), 3);
    }

    proptest! {
        #[test]
        fn prop_any_order_reconstructs(
            data in proptest::collection::vec(any::<u8>(), 1..1024),
            max in 1usize..64,
            seed in any::<u64>(),
        ) {
            let mut fragments = split(&data, max).unwrap();

            // Deterministic shuffle
            let mut state = seed | 1;
            for i in (1..fragments.len()).rev() {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                fragments.swap(i, (state % (i as u64 + 1)) as usize);
            }

            let mut iter = fragments.into_iter();
            let first = iter.next().unwrap();
            let limits = AssemblyLimits::new(u32::MAX, usize::MAX);
            let mut assembly = ChunkAssembly::start(first, limits).unwrap();
            for fragment in iter {
                prop_assert!(!assembly.is_complete());
                assembly.ingest(fragment).unwrap();
            }
            prop_assert!(assembly.is_complete());
            prop_assert_eq!(decompress(&assembly.into_payload()).unwrap(), data);
        }
    }
}
