//! Cached file records and the fingerprint blob encoding.

use serde::{Deserialize, Serialize};

/// Opaque handle for a file stored in the fingerprint cache.
///
/// IDs are assigned by the cache, increase monotonically, are never reused,
/// and always fit in the positive range of an `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Largest ID the cache will hand out.
    pub const MAX: u32 = i32::MAX as u32;

    /// Wrap a raw ID, returning `None` if it is outside `1..=FileId::MAX`.
    #[must_use]
    pub fn new(raw: u32) -> Option<Self> {
        (1..=Self::MAX).contains(&raw).then_some(Self(raw))
    }

    /// Convert an SQLite ROWID into an ID.
    #[must_use]
    pub fn from_rowid(rowid: i64) -> Option<Self> {
        u32::try_from(rowid).ok().and_then(Self::new)
    }

    /// The raw numeric value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file whose fingerprint has been cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    /// Cache-assigned ID
    pub id: FileId,
    /// Path relative to the scanned directory (`/`-separated, NFC)
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// Audio duration in seconds
    pub duration: f64,
    /// Ordered fingerprint codes
    #[serde(skip)]
    pub fingerprint: Vec<u32>,
}

/// A file record that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFileRecord {
    /// Path relative to the scanned directory
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// Audio duration in seconds
    pub duration: f64,
    /// Ordered fingerprint codes
    pub fingerprint: Vec<u32>,
}

impl NewFileRecord {
    /// Attach the ID assigned by the cache.
    #[must_use]
    pub fn into_record(self, id: FileId) -> FileRecord {
        FileRecord {
            id,
            path: self.path,
            size: self.size,
            duration: self.duration,
            fingerprint: self.fingerprint,
        }
    }
}

/// Serialize fingerprint codes as little-endian 32-bit words.
#[must_use]
pub fn encode_fingerprint(codes: &[u32]) -> Vec<u8> {
    codes.iter().flat_map(|c| c.to_le_bytes()).collect()
}

/// Deserialize little-endian 32-bit words.
///
/// Returns `None` if the blob length is not a multiple of 4.
#[must_use]
pub fn decode_fingerprint(bytes: &[u8]) -> Option<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_range() {
        assert!(FileId::new(0).is_none());
        assert_eq!(FileId::new(1).map(FileId::get), Some(1));
        assert!(FileId::new(FileId::MAX).is_some());
        assert!(FileId::new(FileId::MAX + 1).is_none());

        assert!(FileId::from_rowid(-3).is_none());
        assert!(FileId::from_rowid(i64::from(i32::MAX) + 1).is_none());
        assert_eq!(FileId::from_rowid(42).map(FileId::get), Some(42));
    }

    #[test]
    fn test_encode_is_little_endian() {
        assert_eq!(
            encode_fingerprint(&[0x0403_0201, 0xdead_beef]),
            vec![0x01, 0x02, 0x03, 0x04, 0xef, 0xbe, 0xad, 0xde]
        );
    }

    #[test]
    fn test_decode_rejects_partial_words() {
        assert!(decode_fingerprint(&[1, 2, 3]).is_none());
        assert_eq!(decode_fingerprint(&[]), Some(vec![]));
        assert_eq!(
            decode_fingerprint(&[0x01, 0x02, 0x03, 0x04]),
            Some(vec![0x0403_0201])
        );
    }
}
