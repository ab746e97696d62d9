//! Candidate index over truncated fingerprint codes.
//!
//! Every 32-bit code is reduced to its top `bits` bits. The index maps each
//! truncated value to the files containing it, along with how often it occurs
//! in each file. A query counts, per file, how many of its own truncated
//! values also appear in the indexed file, never crediting a value more times
//! than the indexed file contains it.
//!
//! The index is approximate: two recordings can be near-identical bitwise
//! while sharing few exact top-bit prefixes. Hits are only candidates and
//! must be confirmed with [`super::compare_fingerprints`].
//!
//! # Example
//!
//! ```
//! use echodupe::cache::FileId;
//! use echodupe::duplicates::CandidateIndex;
//!
//! let id = FileId::new(1).unwrap();
//! let mut index = CandidateIndex::default();
//! index.add(id, &[0x4444_2222, 0x4444_1111, 0x3333_2222]);
//!
//! assert_eq!(index.find(&[0x4444_0000, 0x3333_ffff], 2), vec![id]);
//! assert!(index.find(&[0x9999_9999], 1).is_empty());
//! ```

use std::collections::HashMap;

use crate::cache::FileId;

/// Default truncation width in bits.
pub const DEFAULT_INDEX_BITS: u8 = 16;

/// In-memory inverted index from truncated codes to files.
#[derive(Debug, Clone)]
pub struct CandidateIndex {
    bits: u8,
    entries: HashMap<u32, HashMap<FileId, u32>>,
}

impl CandidateIndex {
    /// Create an empty index keyed on the top `bits` bits of each code.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not in `1..=32`. Configuration is validated before
    /// an index is built, so this indicates a programming error.
    #[must_use]
    pub fn new(bits: u8) -> Self {
        assert!(
            (1..=32).contains(&bits),
            "index bits must be in 1..=32, got {bits}"
        );
        Self {
            bits,
            entries: HashMap::new(),
        }
    }

    /// Truncation width in bits.
    #[must_use]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Number of distinct truncated values seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn truncate(&self, code: u32) -> u32 {
        code >> (32 - u32::from(self.bits))
    }

    /// Index every code of `fingerprint` under `id`.
    pub fn add(&mut self, id: FileId, fingerprint: &[u32]) {
        for &code in fingerprint {
            let key = self.truncate(code);
            *self.entries.entry(key).or_default().entry(id).or_insert(0) += 1;
        }
    }

    /// Files sharing at least `threshold` truncated values with `fingerprint`.
    ///
    /// Only files with at least one hit are considered. The result is sorted
    /// by ID.
    #[must_use]
    pub fn find(&self, fingerprint: &[u32], threshold: usize) -> Vec<FileId> {
        let mut hits: HashMap<FileId, HashMap<u32, u32>> = HashMap::new();

        for &code in fingerprint {
            let key = self.truncate(code);
            let Some(files) = self.entries.get(&key) else {
                continue;
            };
            for (&id, &available) in files {
                let seen = hits.entry(id).or_default().entry(key).or_insert(0);
                if *seen < available {
                    *seen += 1;
                }
            }
        }

        let mut ids: Vec<FileId> = hits
            .into_iter()
            .filter(|(_, per_key)| per_key.values().map(|&n| n as usize).sum::<usize>() >= threshold)
            .map(|(id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for CandidateIndex {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_BITS)
    }
}
