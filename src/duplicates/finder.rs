//! Scan pipeline that finds groups of near-duplicate recordings.
//!
//! # Pipeline
//!
//! 1. **Walk** - Collect audio files under the scan root in sorted order
//! 2. **Scan** - For each file in walk order:
//!    - load its fingerprint from the cache, or generate and cache it
//!    - query the candidate index for files sharing enough code prefixes
//!    - score each non-excluded candidate and link it if the score is high
//!      enough
//!    - add the file to the index
//! 3. **Group** - Turn the connected components of the link graph into
//!    [`AudioGroup`]s
//!
//! Each file is only ever compared against files walked before it, so every
//! pair is considered at most once.
//!
//! Fingerprint generation is the expensive step. With
//! [`FinderConfig::fingerprint_threads`] above one, uncached files are
//! fingerprinted in parallel a batch ahead of the matching loop; the cache,
//! index and graph are still only touched from the calling thread, in walk
//! order.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{components, AudioGroup, SimilarityGraph};
use super::lookup::{CandidateIndex, DEFAULT_INDEX_BITS};
use super::similarity::compare_fingerprints;
use crate::cache::{CacheError, FileRecord, FingerprintCache, NewFileRecord, SettingsDescriptor};
use crate::fingerprint::{
    FingerprintError, FingerprintGenerator, FingerprintSettings, GeneratedFingerprint,
};
use crate::progress::{ProgressCallback, PHASE_SCANNING, PHASE_WALKING};
use crate::scanner::path_utils::relative_key;
use crate::scanner::{FileEntry, ScanError, Walker, WalkerConfig};

/// Files fingerprinted per worker thread in each prefetch batch.
const PREFETCH_PER_THREAD: usize = 8;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Settings passed to the fingerprint generator.
    pub settings: FingerprintSettings,
    /// Fraction of a file's codes that must hit the candidate index, in
    /// `(0, 1]`.
    pub lookup_threshold: f64,
    /// Minimum similarity score for two files to be linked, in `(0, 1]`.
    pub match_threshold: f64,
    /// Normalize scores by the shorter fingerprint instead of the longer.
    pub match_min_length: bool,
    /// Log and skip files that can't be fingerprinted instead of aborting.
    pub skip_bad_files: bool,
    /// Only consider files that are already cached.
    pub skip_new_files: bool,
    /// How often to log a progress line; zero disables periodic logging.
    pub log_interval: Duration,
    /// Candidate index truncation width, in `1..=32`.
    pub index_bits: u8,
    /// Worker threads for fingerprint generation; 1 generates inline.
    pub fingerprint_threads: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("settings", &self.settings)
            .field("lookup_threshold", &self.lookup_threshold)
            .field("match_threshold", &self.match_threshold)
            .field("match_min_length", &self.match_min_length)
            .field("skip_bad_files", &self.skip_bad_files)
            .field("skip_new_files", &self.skip_new_files)
            .field("log_interval", &self.log_interval)
            .field("index_bits", &self.index_bits)
            .field("fingerprint_threads", &self.fingerprint_threads)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            settings: FingerprintSettings::default(),
            lookup_threshold: 0.25,
            match_threshold: 0.95,
            match_min_length: false,
            skip_bad_files: false,
            skip_new_files: false,
            log_interval: Duration::from_secs(10),
            index_bits: DEFAULT_INDEX_BITS,
            fingerprint_threads: 1,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the fingerprint settings.
    #[must_use]
    pub fn with_settings(mut self, settings: FingerprintSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the candidate lookup threshold.
    #[must_use]
    pub fn with_lookup_threshold(mut self, threshold: f64) -> Self {
        self.lookup_threshold = threshold;
        self
    }

    /// Set the match threshold.
    #[must_use]
    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Normalize scores by the shorter fingerprint.
    #[must_use]
    pub fn with_match_min_length(mut self, enabled: bool) -> Self {
        self.match_min_length = enabled;
        self
    }

    /// Skip files that can't be fingerprinted.
    #[must_use]
    pub fn with_skip_bad_files(mut self, enabled: bool) -> Self {
        self.skip_bad_files = enabled;
        self
    }

    /// Skip files that aren't cached yet.
    #[must_use]
    pub fn with_skip_new_files(mut self, enabled: bool) -> Self {
        self.skip_new_files = enabled;
        self
    }

    /// Set the periodic progress log interval.
    #[must_use]
    pub fn with_log_interval(mut self, interval: Duration) -> Self {
        self.log_interval = interval;
        self
    }

    /// Set the candidate index truncation width.
    #[must_use]
    pub fn with_index_bits(mut self, bits: u8) -> Self {
        self.index_bits = bits;
        self
    }

    /// Set the number of fingerprinting threads.
    #[must_use]
    pub fn with_fingerprint_threads(mut self, threads: usize) -> Self {
        self.fingerprint_threads = threads;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check that every setting is in range.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<(), FinderError> {
        let in_unit = |v: f64| v > 0.0 && v <= 1.0;
        if !in_unit(self.lookup_threshold) {
            return Err(FinderError::InvalidConfig(format!(
                "lookup threshold must be in (0, 1], got {}",
                self.lookup_threshold
            )));
        }
        if !in_unit(self.match_threshold) {
            return Err(FinderError::InvalidConfig(format!(
                "match threshold must be in (0, 1], got {}",
                self.match_threshold
            )));
        }
        if !(1..=32).contains(&self.index_bits) {
            return Err(FinderError::InvalidConfig(format!(
                "index bits must be in 1..=32, got {}",
                self.index_bits
            )));
        }
        if self.fingerprint_threads == 0 {
            return Err(FinderError::InvalidConfig(
                "fingerprint threads must be at least 1".to_string(),
            ));
        }
        self.settings.validate().map_err(FinderError::InvalidConfig)
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// A file left out of the scan because it couldn't be fingerprinted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedFile {
    /// Path relative to the scan root
    pub path: String,
    /// Why it was skipped
    pub reason: String,
}

/// Summary statistics from a scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Audio files found by the walker
    pub total_files: usize,
    /// Total size of all walked files in bytes
    pub total_size: u64,
    /// Files whose fingerprint came from the cache
    pub cached_files: usize,
    /// Files fingerprinted during this scan
    pub fingerprinted_files: usize,
    /// Uncached files skipped because of `skip_new_files`
    pub skipped_new_files: usize,
    /// Files skipped because they couldn't be fingerprinted
    pub skipped_files: Vec<SkippedFile>,
    /// Candidate pairs scored
    pub comparisons: usize,
    /// Candidate pairs ignored because they were excluded
    pub excluded_pairs: usize,
    /// Candidate pairs linked as matches
    pub matches: usize,
    /// Number of groups found
    pub groups: usize,
    /// Files belonging to some group
    pub grouped_files: usize,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Errors encountered while walking
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Files that took part in matching.
    #[must_use]
    pub fn scanned_files(&self) -> usize {
        self.cached_files + self.fingerprinted_files
    }

    /// Whether some files were left out because of errors.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.skipped_files.is_empty() || !self.scan_errors.is_empty()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while resolving the scan root.
    #[error("I/O error for {path}: {source}")]
    IoWithPath {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file couldn't be fingerprinted and bad files aren't skipped.
    #[error("Failed to fingerprint {path}: {source}")]
    Fingerprint {
        /// File that failed
        path: PathBuf,
        /// The generator's error
        #[source]
        source: FingerprintError,
    },

    /// The fingerprint cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl FinderError {
    /// Whether the error was caused by bad configuration rather than by the
    /// files being scanned.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::InvalidConfig(_) => true,
            Self::Cache(e) => e.is_configuration_error(),
            _ => false,
        }
    }
}

/// A walked file waiting to be matched.
struct PlannedFile {
    entry: FileEntry,
    key: String,
    cached: Option<FileRecord>,
}

/// Orchestrates a single scan over a directory.
///
/// Owns the fingerprint cache for the duration of the scan. Use
/// [`DuplicateFinder::into_cache`] to get it back, e.g. to close it.
///
/// # Example
///
/// ```no_run
/// use echodupe::cache::FingerprintCache;
/// use echodupe::duplicates::{DuplicateFinder, FinderConfig};
/// use echodupe::fingerprint::Fpcalc;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let config = FinderConfig::default();
/// let cache = FingerprintCache::open(Path::new("cache.db"), &config.settings).unwrap();
/// let finder = DuplicateFinder::new(config, cache, Arc::new(Fpcalc::new()));
///
/// let (groups, summary) = finder.find_duplicates(Path::new("/music")).unwrap();
/// println!("{} groups among {} files", groups.len(), summary.scanned_files());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    cache: FingerprintCache,
    generator: Arc<dyn FingerprintGenerator>,
}

impl DuplicateFinder {
    /// Create a finder that reads and writes `cache` and fingerprints new
    /// files with `generator`.
    #[must_use]
    pub fn new(
        config: FinderConfig,
        cache: FingerprintCache,
        generator: Arc<dyn FingerprintGenerator>,
    ) -> Self {
        Self {
            config,
            cache,
            generator,
        }
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// The fingerprint cache.
    #[must_use]
    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    /// Give back the fingerprint cache.
    #[must_use]
    pub fn into_cache(self) -> FingerprintCache {
        self.cache
    }

    fn callback(&self) -> Option<&Arc<dyn ProgressCallback>> {
        self.config.progress_callback.as_ref()
    }

    /// Scan `root` and return groups of near-duplicate recordings.
    ///
    /// Groups are sorted by their first path, and files within a group by
    /// path.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The configuration is invalid or doesn't match the cache's settings
    /// - The path does not exist or is not a directory
    /// - A file can't be fingerprinted and `skip_bad_files` is off
    /// - The cache fails
    /// - The scan is interrupted by shutdown signal
    ///
    /// Fingerprints cached before an error remain cached.
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<AudioGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        self.config.validate()?;
        let requested = SettingsDescriptor::from(&self.config.settings);
        if requested != *self.cache.settings() {
            return Err(FinderError::InvalidConfig(format!(
                "fingerprint settings ({requested}) differ from the cache's ({})",
                self.cache.settings()
            )));
        }

        if !root.exists() {
            return Err(FinderError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }
        let root = root.canonicalize().map_err(|e| FinderError::IoWithPath {
            path: root.to_path_buf(),
            source: e,
        })?;

        log::info!("Starting scan of {}", root.display());
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let planned = self.walk(&root, &mut summary)?;
        log::info!(
            "Found {} audio files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        let graph = self.scan(&planned, &mut summary)?;

        let groups = self.build_groups(&graph)?;
        summary.groups = groups.len();
        summary.grouped_files = groups.iter().map(AudioGroup::len).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} groups, {} grouped files, {} comparisons, {} skipped",
            summary.groups,
            summary.grouped_files,
            summary.comparisons,
            summary.skipped_files.len()
        );

        Ok((groups, summary))
    }

    /// Walk phase: collect files and look each one up in the cache.
    fn walk(&self, root: &Path, summary: &mut ScanSummary) -> Result<Vec<PlannedFile>, FinderError> {
        if let Some(cb) = self.callback() {
            cb.on_phase_start(PHASE_WALKING, 0);
            cb.on_message(&format!("Walking {}", root.display()));
        }

        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut planned = Vec::new();
        let mut seen_keys = HashSet::new();
        for result in walker.walk() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    summary.scan_errors.push(e);
                    continue;
                }
            };

            let relative = entry.path.strip_prefix(root).unwrap_or(entry.path.as_path());
            if relative.to_str().is_none() {
                log::warn!(
                    "Skipping {}: path is not valid UTF-8",
                    entry.path.display()
                );
                summary.skipped_files.push(SkippedFile {
                    path: entry.path.display().to_string(),
                    reason: "path is not valid UTF-8".to_string(),
                });
                continue;
            }
            let Some(key) = relative_key(root, &entry.path) else {
                log::debug!("Skipping path outside scan root: {}", entry.path.display());
                continue;
            };
            if !seen_keys.insert(key.clone()) {
                log::warn!(
                    "Skipping {}: another file normalizes to the same path {key}",
                    entry.path.display()
                );
                continue;
            }

            summary.total_files += 1;
            summary.total_size += entry.size;
            if let Some(cb) = self.callback() {
                cb.on_progress(summary.total_files, &key);
            }

            let cached = self.cache.get_by_path(&key)?;
            planned.push(PlannedFile { entry, key, cached });
        }

        if let Some(cb) = self.callback() {
            cb.on_phase_end(PHASE_WALKING);
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        Ok(planned)
    }

    /// Scan phase: fingerprint, match and index every planned file in order.
    fn scan(
        &self,
        planned: &[PlannedFile],
        summary: &mut ScanSummary,
    ) -> Result<SimilarityGraph, FinderError> {
        let mut index = CandidateIndex::new(self.config.index_bits);
        let mut graph = SimilarityGraph::new();
        log::debug!("Candidate index keyed on the top {} bits", index.bits());
        let mut last_log = Instant::now();
        let log_enabled = !self.config.log_interval.is_zero();

        if let Some(cb) = self.callback() {
            cb.on_phase_start(PHASE_SCANNING, planned.len());
        }

        let pool = self.prefetch_pool();
        let batch_size = pool
            .as_ref()
            .map_or(1, |p| p.current_num_threads() * PREFETCH_PER_THREAD);

        let mut position = 0;
        for batch in planned.chunks(batch_size) {
            let mut prefetched = match &pool {
                Some(pool) => self.prefetch(pool, batch),
                None => HashMap::new(),
            };

            for (offset, file) in batch.iter().enumerate() {
                if self.config.is_shutdown_requested() {
                    log::info!("Scan interrupted after {} files", summary.scanned_files());
                    return Err(FinderError::Interrupted);
                }
                position += 1;

                let generated = prefetched.remove(&offset);
                if let Some(record) = self.resolve_record(file, generated, summary)? {
                    self.match_and_index(&record, &mut index, &mut graph, summary)?;
                }

                if let Some(cb) = self.callback() {
                    cb.on_progress(position, &file.key);
                    cb.on_item_completed(file.entry.size);
                }
                if log_enabled && last_log.elapsed() >= self.config.log_interval {
                    let status = format!("Scanned {position} of {} files", planned.len());
                    log::info!("{status}");
                    if let Some(cb) = self.callback() {
                        cb.on_message(&status);
                    }
                    last_log = Instant::now();
                }
            }
        }

        if let Some(cb) = self.callback() {
            cb.on_phase_end(PHASE_SCANNING);
        }
        if log_enabled {
            log::info!("Finished scanning {} files", position);
        }
        summary.matches = graph.edge_count();
        Ok(graph)
    }

    /// Pool for parallel fingerprinting, if more than one thread is wanted.
    fn prefetch_pool(&self) -> Option<rayon::ThreadPool> {
        if self.config.fingerprint_threads <= 1 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.fingerprint_threads)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!("Failed to create fingerprint thread pool, fingerprinting inline: {e}");
                None
            }
        }
    }

    /// Fingerprint the uncached files of `batch` in parallel, keyed by their
    /// offset in the batch.
    fn prefetch(
        &self,
        pool: &rayon::ThreadPool,
        batch: &[PlannedFile],
    ) -> HashMap<usize, Result<GeneratedFingerprint, FingerprintError>> {
        if self.config.skip_new_files {
            return HashMap::new();
        }
        // The cache connection isn't Sync, so only these cross into the pool.
        let settings = &self.config.settings;
        let generator = &self.generator;
        let shutdown = self.config.shutdown_flag.as_deref();
        pool.install(|| {
            batch
                .par_iter()
                .enumerate()
                .filter(|(_, file)| file.cached.is_none())
                .filter_map(|(offset, file)| {
                    if shutdown.is_some_and(|f| f.load(Ordering::SeqCst)) {
                        return None;
                    }
                    Some((offset, generator.generate(&file.entry.path, settings)))
                })
                .collect()
        })
    }

    /// Get the cached record for `file`, or fingerprint and cache it.
    ///
    /// Returns `None` when the file is skipped.
    fn resolve_record(
        &self,
        file: &PlannedFile,
        prefetched: Option<Result<GeneratedFingerprint, FingerprintError>>,
        summary: &mut ScanSummary,
    ) -> Result<Option<FileRecord>, FinderError> {
        if let Some(record) = &file.cached {
            log::trace!("Cache hit: {}", file.key);
            summary.cached_files += 1;
            return Ok(Some(record.clone()));
        }

        if self.config.skip_new_files {
            log::debug!("Skipping uncached file: {}", file.key);
            summary.skipped_new_files += 1;
            return Ok(None);
        }

        let generated = prefetched.unwrap_or_else(|| {
            log::debug!("Fingerprinting {}", file.entry.path.display());
            self.generator.generate(&file.entry.path, &self.config.settings)
        });
        let generated = generated.and_then(|fp| {
            if fp.codes.is_empty() {
                Err(FingerprintError::EmptyFingerprint(file.entry.path.clone()))
            } else {
                Ok(fp)
            }
        });

        let fp = match generated {
            Ok(fp) => fp,
            Err(e) if self.config.skip_bad_files => {
                log::warn!("Skipping {}: {}", file.entry.path.display(), e);
                summary.skipped_files.push(SkippedFile {
                    path: file.key.clone(),
                    reason: e.to_string(),
                });
                return Ok(None);
            }
            Err(e) => {
                return Err(FinderError::Fingerprint {
                    path: file.entry.path.clone(),
                    source: e,
                })
            }
        };

        let new_record = NewFileRecord {
            path: file.key.clone(),
            size: file.entry.size,
            duration: fp.duration,
            fingerprint: fp.codes,
        };
        let id = self.cache.save(&new_record)?;
        summary.fingerprinted_files += 1;
        Ok(Some(new_record.into_record(id)))
    }

    /// Link `record` to every sufficiently similar earlier file, then index it.
    fn match_and_index(
        &self,
        record: &FileRecord,
        index: &mut CandidateIndex,
        graph: &mut SimilarityGraph,
        summary: &mut ScanSummary,
    ) -> Result<(), FinderError> {
        let threshold =
            (self.config.lookup_threshold * record.fingerprint.len() as f64).floor() as usize;

        for candidate_id in index.find(&record.fingerprint, threshold) {
            let candidate = self
                .cache
                .get_by_id(candidate_id)?
                .ok_or(CacheError::NotFound(candidate_id))?;

            if self.cache.is_excluded_pair(&record.path, &candidate.path)? {
                log::debug!("Excluded pair: {} / {}", record.path, candidate.path);
                summary.excluded_pairs += 1;
                continue;
            }

            let score = compare_fingerprints(
                &record.fingerprint,
                &candidate.fingerprint,
                self.config.match_min_length,
            );
            summary.comparisons += 1;
            if score >= self.config.match_threshold {
                log::debug!(
                    "Match {:.3}: {} ~ {}",
                    score,
                    record.path,
                    candidate.path
                );
                graph.add_edge(record.id, candidate.id);
            } else {
                log::trace!(
                    "Below threshold {:.3}: {} ~ {}",
                    score,
                    record.path,
                    candidate.path
                );
            }
        }

        index.add(record.id, &record.fingerprint);
        Ok(())
    }

    /// Group phase: resolve components to records and sort them.
    fn build_groups(&self, graph: &SimilarityGraph) -> Result<Vec<AudioGroup>, FinderError> {
        let mut groups = Vec::new();
        for component in components(graph) {
            let mut records = Vec::with_capacity(component.len());
            for id in component {
                let record = self.cache.get_by_id(id)?.ok_or(CacheError::NotFound(id))?;
                records.push(record);
            }
            groups.push(AudioGroup::new(records));
        }
        groups.sort_by(|a, b| a.first_path().cmp(b.first_path()));
        Ok(groups)
    }
}
