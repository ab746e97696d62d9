//! Near-duplicate detection module.
//!
//! This module provides:
//! - A coarse candidate index over truncated fingerprint codes ([`lookup`])
//! - Exact bitwise similarity with alignment search ([`similarity`])
//! - Connected-component grouping of matches ([`groups`])
//! - The scan pipeline tying them to the cache and walker ([`finder`])

pub mod finder;
pub mod groups;
pub mod lookup;
pub mod similarity;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary, SkippedFile};
pub use groups::{components, AudioGroup, SimilarityGraph};
pub use lookup::{CandidateIndex, DEFAULT_INDEX_BITS};
pub use similarity::{best_alignment, compare_fingerprints, Alignment};
