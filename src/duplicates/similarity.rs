//! Bitwise fingerprint similarity.
//!
//! Two fingerprints are compared at every relative offset. At each offset the
//! overlapping codes are XORed and the agreeing bits counted; the best total
//! is normalized by the number of bits in the reference length. Offsets make
//! the score tolerant of leading silence or trimmed intros.

use serde::Serialize;

/// Best alignment found between two fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Alignment {
    /// Fraction of agreeing bits, in `[0, 1]`
    pub score: f64,
    /// Number of leading codes of `a` skipped
    pub a_offset: usize,
    /// Number of leading codes of `b` skipped
    pub b_offset: usize,
}

/// Agreeing bits between the overlapping prefixes of `a` and `b`.
#[inline]
fn agreeing_bits(a: &[u32], b: &[u32]) -> u64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| u64::from(32 - (x ^ y).count_ones()))
        .sum()
}

/// Find the offset pair maximizing bit agreement.
///
/// The zero shift is tried first, then every shift of `a` against `b`, then
/// every shift of `b` against `a`; on ties the first one found wins. The score
/// is normalized by `32 * max(len)`, or `32 * min(len)` when
/// `use_shorter_length` is set. An empty input scores 0.
#[must_use]
pub fn best_alignment(a: &[u32], b: &[u32], use_shorter_length: bool) -> Alignment {
    let reference = if use_shorter_length {
        a.len().min(b.len())
    } else {
        a.len().max(b.len())
    };
    if a.is_empty() || b.is_empty() {
        return Alignment {
            score: 0.0,
            a_offset: 0,
            b_offset: 0,
        };
    }

    let mut best = agreeing_bits(a, b);
    let (mut a_offset, mut b_offset) = (0, 0);

    for i in 1..a.len() {
        let count = agreeing_bits(&a[i..], b);
        if count > best {
            best = count;
            (a_offset, b_offset) = (i, 0);
        }
    }
    for j in 1..b.len() {
        let count = agreeing_bits(a, &b[j..]);
        if count > best {
            best = count;
            (a_offset, b_offset) = (0, j);
        }
    }

    Alignment {
        score: best as f64 / (32 * reference) as f64,
        a_offset,
        b_offset,
    }
}

/// Similarity of two fingerprints in `[0, 1]`.
///
/// Symmetric in `a` and `b`. Runs in `O(len(a) * len(b))`.
///
/// # Example
///
/// ```
/// use echodupe::duplicates::compare_fingerprints;
///
/// let a = [0xffff_0000, 0x1234_5678];
/// assert_eq!(compare_fingerprints(&a, &a, false), 1.0);
/// assert_eq!(compare_fingerprints(&a, &[], false), 0.0);
/// ```
#[must_use]
pub fn compare_fingerprints(a: &[u32], b: &[u32], use_shorter_length: bool) -> f64 {
    best_alignment(a, b, use_shorter_length).score
}
