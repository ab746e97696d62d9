//! Shared fixtures: audio files whose contents are the JSON `fpcalc -raw
//! -json` would print for them, and a generator that reads them back.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use echodupe::cache::FingerprintCache;
use echodupe::duplicates::{DuplicateFinder, FinderConfig};
use echodupe::fingerprint::fpcalc::parse_output;
use echodupe::fingerprint::{
    FingerprintError, FingerprintGenerator, FingerprintSettings, GeneratedFingerprint,
};
use echodupe::scanner::{WalkerConfig, DEFAULT_FILE_PATTERN};
use regex::Regex;

/// Length of every synthetic track, in codes.
pub const TRACK_LEN: usize = 120;

/// Generator that parses each file's contents as fpcalc output.
#[derive(Default)]
pub struct FixtureGenerator {
    calls: AtomicUsize,
}

impl FixtureGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FingerprintGenerator for FixtureGenerator {
    fn generate(
        &self,
        path: &Path,
        _settings: &FingerprintSettings,
    ) -> Result<GeneratedFingerprint, FingerprintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stdout = fs::read(path).map_err(|source| FingerprintError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;
        parse_output(path, &stdout)
    }
}

/// Deterministic pseudo-random codes.
pub fn codes(seed: u32, len: usize) -> Vec<u32> {
    let mut x = seed.wrapping_mul(2_654_435_761).max(1);
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x
        })
        .collect()
}

/// A lossy re-encode: a low bit differs in every fifth code.
pub fn reencode(codes: &[u32]) -> Vec<u32> {
    codes
        .iter()
        .enumerate()
        .map(|(i, &c)| if i % 5 == 0 { c ^ 0b100 } else { c })
        .collect()
}

/// The same audio after `n` codes of leading silence.
pub fn pad(codes: &[u32], n: usize) -> Vec<u32> {
    let mut padded = vec![0; n];
    padded.extend_from_slice(codes);
    padded
}

/// Write `codes` as fpcalc JSON to `rel` under `root`.
pub fn write_fixture(root: &Path, rel: &str, codes: &[u32]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let json = serde_json::json!({
        "duration": codes.len() as f64 * 0.1238,
        "fingerprint": codes,
    });
    fs::write(path, serde_json::to_vec(&json).unwrap()).unwrap();
}

/// Two tracks, each as an original, a re-encode and a silence-padded copy.
pub fn two_track_library(root: &Path) {
    for (name, seed) in [("one", 11), ("two", 22)] {
        let original = codes(seed, TRACK_LEN);
        write_fixture(root, &format!("{name}.flac"), &original);
        write_fixture(root, &format!("{name}.mp3"), &reencode(&original));
        write_fixture(root, &format!("{name}_padded.ogg"), &pad(&original, 3));
    }
}

/// Finder defaults used by the tests: audio files only, no periodic logs.
pub fn test_config() -> FinderConfig {
    FinderConfig::default()
        .with_log_interval(Duration::ZERO)
        .with_walker_config(WalkerConfig {
            file_pattern: Some(Regex::new(DEFAULT_FILE_PATTERN).unwrap()),
            ..Default::default()
        })
}

pub fn memory_finder(
    config: FinderConfig,
    generator: Arc<dyn FingerprintGenerator>,
) -> DuplicateFinder {
    let cache = FingerprintCache::open_in_memory(&config.settings).unwrap();
    DuplicateFinder::new(config, cache, generator)
}

pub fn file_finder(
    db: &Path,
    config: FinderConfig,
    generator: Arc<dyn FingerprintGenerator>,
) -> DuplicateFinder {
    let cache = FingerprintCache::open(db, &config.settings).unwrap();
    DuplicateFinder::new(config, cache, generator)
}
