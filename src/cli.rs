//! Command-line interface definitions for EchoDupe.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, color, config file) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Scan a music collection and print groups of near-duplicates
//! echodupe scan ~/Music
//!
//! # Reuse a fingerprint cache and emit JSON for scripting
//! echodupe scan ~/Music --cache music.db --output json
//!
//! # Compare two recordings directly
//! echodupe compare a.flac b.mp3
//!
//! # Mark files as not being duplicates of each other
//! echodupe exclude --cache music.db live/take1.flac live/take2.flac
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Find near-duplicate audio recordings by comparing acoustic fingerprints.
///
/// EchoDupe fingerprints audio files with fpcalc (Chromaprint), caches the
/// fingerprints in SQLite, and groups files that sound alike.
#[derive(Debug, Parser)]
#[command(name = "echodupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file to load instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for EchoDupe.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for near-duplicate audio files
    Scan(ScanArgs),
    /// Fingerprint two files and print their similarity
    Compare(CompareArgs),
    /// Record that the given files are not duplicates of each other
    Exclude(ExcludeArgs),
}

/// Fingerprinting options shared by every subcommand.
///
/// These must match the settings a cache was created with.
#[derive(Debug, Clone, Default, Args)]
pub struct FingerprintArgs {
    /// Max audio duration to fingerprint, in seconds (fpcalc -length)
    #[arg(long, value_name = "SECS")]
    pub length: Option<f64>,

    /// Audio chunk duration in seconds, 0 to disable (fpcalc -chunk)
    #[arg(long, value_name = "SECS")]
    pub chunk: Option<f64>,

    /// Fingerprint algorithm (fpcalc -algorithm)
    #[arg(long, value_name = "NUM")]
    pub algorithm: Option<u8>,

    /// Overlap audio chunks (fpcalc -overlap)
    #[arg(long)]
    pub overlap: bool,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for near-duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format (text for people, json/csv for scripting)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Regular expression matched against file names to select audio files
    ///
    /// Defaults to common audio extensions, case-insensitive.
    #[arg(long, value_name = "REGEX")]
    pub file_pattern: Option<String>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to any .gitignore patterns found.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long, overrides_with = "no_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Do not follow symbolic links (overrides the config file)
    #[arg(long, overrides_with = "follow_symlinks")]
    pub no_follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Fraction of a file's truncated codes that must hit the index, in (0, 1]
    #[arg(long, value_name = "FRACTION")]
    pub lookup_threshold: Option<f64>,

    /// Minimum bitwise similarity to report a match, in (0, 1]
    #[arg(long, value_name = "FRACTION")]
    pub match_threshold: Option<f64>,

    /// Score only over the shorter fingerprint's length
    ///
    /// Helps when one recording is a truncated copy of another.
    #[arg(long)]
    pub match_min_length: bool,

    /// Number of upper fingerprint bits used as candidate index keys (1-32)
    #[arg(long, value_name = "BITS")]
    pub index_bits: Option<u8>,

    /// Log and skip files fpcalc cannot fingerprint instead of aborting
    #[arg(long)]
    pub skip_bad_files: bool,

    /// Only consider files that already have cached fingerprints
    #[arg(long)]
    pub skip_new_files: bool,

    /// Include size and duration for each file in text output
    #[arg(long)]
    pub print_file_info: bool,

    /// Seconds between progress log lines (0 disables them)
    #[arg(long, value_name = "SECS")]
    pub log_interval: Option<u64>,

    /// Number of fpcalc processes to run concurrently
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    #[command(flatten)]
    pub fingerprint: FingerprintArgs,

    /// Path to the fingerprint cache database
    ///
    /// If not specified, a default platform-specific path is used.
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Keep fingerprints in memory only
    #[arg(long, conflicts_with = "cache")]
    pub no_cache: bool,
}

/// Arguments for the compare subcommand.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// First audio file
    #[arg(value_name = "FILE_A")]
    pub a: PathBuf,

    /// Second audio file
    #[arg(value_name = "FILE_B")]
    pub b: PathBuf,

    /// Score only over the shorter fingerprint's length
    #[arg(long)]
    pub match_min_length: bool,

    #[command(flatten)]
    pub fingerprint: FingerprintArgs,
}

/// Arguments for the exclude subcommand.
#[derive(Debug, Args)]
pub struct ExcludeArgs {
    /// Cache-relative paths (as printed by scan) to exclude pairwise
    #[arg(value_name = "PATH", num_args = 2.., required = true)]
    pub paths: Vec<String>,

    /// Path to the fingerprint cache database
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    #[command(flatten)]
    pub fingerprint: FingerprintArgs,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, one path per line with blank lines between groups
    #[default]
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
