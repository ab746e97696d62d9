//! Application configuration management.
//!
//! Configuration is layered with figment, later layers winning:
//! built-in defaults, then the TOML config file, then `ECHODUPE_*`
//! environment variables (`__` separates nested keys, e.g.
//! `ECHODUPE_FINGERPRINT__LENGTH=30`), then command-line flags.
//!
//! # Example config file
//!
//! ```toml
//! lookup_threshold = 0.25
//! match_threshold = 0.95
//! skip_bad_files = true
//!
//! [fingerprint]
//! length = 30
//! algorithm = 2
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Commands, FingerprintArgs, OutputFormat, ScanArgs};
use crate::duplicates::{FinderConfig, FinderError, DEFAULT_INDEX_BITS};
use crate::fingerprint::FingerprintSettings;
use crate::scanner::{WalkerConfig, DEFAULT_FILE_PATTERN};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "ECHODUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fingerprint generator settings. Changing these invalidates a cache.
    pub fingerprint: FingerprintSettings,
    /// Fraction of a file's codes that must hit the candidate index.
    pub lookup_threshold: f64,
    /// Minimum similarity score for two files to be grouped.
    pub match_threshold: f64,
    /// Normalize scores by the shorter fingerprint.
    pub match_min_length: bool,
    /// Candidate index truncation width.
    pub index_bits: u8,
    /// Skip files that fail to fingerprint instead of aborting.
    pub skip_bad_files: bool,
    /// Only consider files already in the cache.
    pub skip_new_files: bool,
    /// Print size and duration per file in text output.
    pub print_file_info: bool,
    /// Seconds between progress log lines; 0 disables them.
    pub log_interval_secs: u64,
    /// Concurrent fpcalc processes.
    pub threads: usize,
    /// Regex selecting audio files by name.
    pub file_pattern: String,
    /// Extra gitignore-style patterns to skip.
    pub ignore_patterns: Vec<String>,
    pub follow_symlinks: bool,
    pub skip_hidden: bool,
    /// Output format for scan results.
    pub output: OutputFormat,
    /// Fingerprint cache location; the platform cache dir when unset.
    pub cache_path: Option<PathBuf>,
    /// Keep fingerprints in memory only.
    pub no_cache: bool,
    pub no_color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fingerprint: FingerprintSettings::default(),
            lookup_threshold: 0.25,
            match_threshold: 0.95,
            match_min_length: false,
            index_bits: DEFAULT_INDEX_BITS,
            skip_bad_files: false,
            skip_new_files: false,
            print_file_info: false,
            log_interval_secs: 10,
            threads: 1,
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            ignore_patterns: Vec::new(),
            follow_symlinks: false,
            skip_hidden: false,
            output: OutputFormat::Text,
            cache_path: None,
            no_cache: false,
            no_color: false,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the platform default location
    /// when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidConfig`] if the config file or an
    /// `ECHODUPE_*` variable can't be parsed into a configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, FinderError> {
        match path.map(Path::to_path_buf).or_else(Self::default_config_path) {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No config directory available, using defaults");
                Self::figment(None).extract().map_err(|e| {
                    FinderError::InvalidConfig(format!("bad environment override: {e}"))
                })
            }
        }
    }

    /// Load configuration layered over the TOML file at `path`.
    ///
    /// A missing file is not an error; the defaults and environment apply.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidConfig`] if the file is malformed or a
    /// value (from the file or the environment) has the wrong type.
    pub fn load_from_path(path: PathBuf) -> Result<Self, FinderError> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
        }
        Self::figment(Some(&path)).extract().map_err(|e| {
            FinderError::InvalidConfig(format!("bad config file {}: {e}", path.display()))
        })
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Default platform-specific fingerprint cache path.
    #[must_use]
    pub fn default_cache_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.cache_dir().join("fingerprints.db"))
    }

    /// Cache path to use, if fingerprints should be persisted at all.
    #[must_use]
    pub fn resolved_cache_path(&self) -> Option<PathBuf> {
        if self.no_cache {
            return None;
        }
        self.cache_path.clone().or_else(Self::default_cache_path)
    }

    /// Apply global flags and the active subcommand's flags.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if cli.no_color {
            self.no_color = true;
        }
        match &cli.command {
            Commands::Scan(args) => self.merge_scan_args(args),
            Commands::Compare(args) => {
                self.merge_fingerprint_args(&args.fingerprint);
                if args.match_min_length {
                    self.match_min_length = true;
                }
            }
            Commands::Exclude(args) => {
                self.merge_fingerprint_args(&args.fingerprint);
                if let Some(cache) = &args.cache {
                    self.cache_path = Some(cache.clone());
                    self.no_cache = false;
                }
            }
        }
    }

    /// Apply flags from the scan subcommand. Flags left unset keep the
    /// configured value.
    pub fn merge_scan_args(&mut self, args: &ScanArgs) {
        self.merge_fingerprint_args(&args.fingerprint);

        if let Some(output) = args.output {
            self.output = output;
        }
        if let Some(pattern) = &args.file_pattern {
            self.file_pattern = pattern.clone();
        }
        self.ignore_patterns
            .extend(args.ignore_patterns.iter().cloned());
        if args.follow_symlinks {
            self.follow_symlinks = true;
        } else if args.no_follow_symlinks {
            self.follow_symlinks = false;
        }
        if args.skip_hidden {
            self.skip_hidden = true;
        }
        if let Some(v) = args.lookup_threshold {
            self.lookup_threshold = v;
        }
        if let Some(v) = args.match_threshold {
            self.match_threshold = v;
        }
        if args.match_min_length {
            self.match_min_length = true;
        }
        if let Some(v) = args.index_bits {
            self.index_bits = v;
        }
        if args.skip_bad_files {
            self.skip_bad_files = true;
        }
        if args.skip_new_files {
            self.skip_new_files = true;
        }
        if args.print_file_info {
            self.print_file_info = true;
        }
        if let Some(v) = args.log_interval {
            self.log_interval_secs = v;
        }
        if let Some(v) = args.threads {
            self.threads = v;
        }
        if let Some(cache) = &args.cache {
            self.cache_path = Some(cache.clone());
            self.no_cache = false;
        }
        if args.no_cache {
            self.no_cache = true;
        }
    }

    fn merge_fingerprint_args(&mut self, args: &FingerprintArgs) {
        if let Some(length) = args.length {
            self.fingerprint.length = length;
        }
        if let Some(chunk) = args.chunk {
            self.fingerprint.chunk = chunk;
        }
        if let Some(algorithm) = args.algorithm {
            self.fingerprint.algorithm = algorithm;
        }
        if args.overlap {
            self.fingerprint.overlap = true;
        }
    }

    /// Build the walker configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidConfig`] if the file pattern is not a
    /// valid regular expression.
    pub fn walker_config(&self) -> Result<WalkerConfig, FinderError> {
        let file_pattern = Regex::new(&self.file_pattern).map_err(|e| {
            FinderError::InvalidConfig(format!("bad file pattern '{}': {e}", self.file_pattern))
        })?;
        Ok(WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            ignore_patterns: self.ignore_patterns.clone(),
            file_pattern: Some(file_pattern),
        })
    }

    /// Build the finder configuration, without shutdown flag or progress
    /// callback.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidConfig`] if the file pattern is invalid.
    pub fn finder_config(&self) -> Result<FinderConfig, FinderError> {
        Ok(FinderConfig::default()
            .with_settings(self.fingerprint)
            .with_lookup_threshold(self.lookup_threshold)
            .with_match_threshold(self.match_threshold)
            .with_match_min_length(self.match_min_length)
            .with_index_bits(self.index_bits)
            .with_skip_bad_files(self.skip_bad_files)
            .with_skip_new_files(self.skip_new_files)
            .with_log_interval(Duration::from_secs(self.log_interval_secs))
            .with_fingerprint_threads(self.threads)
            .with_walker_config(self.walker_config()?))
    }

    /// Check every value before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<(), FinderError> {
        self.finder_config()?.validate()
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "echodupe", "echodupe")
}
