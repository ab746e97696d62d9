//! Scanner module for finding audio files.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Gitignore-style exclusion and filename pattern matching
//! - Unicode path normalization for cache keys
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`path_utils`]: Relative, NFC-normalized cache keys
//!
//! # Example
//!
//! ```no_run
//! use echodupe::scanner::{Walker, WalkerConfig, DEFAULT_FILE_PATTERN};
//! use regex::Regex;
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     skip_hidden: true,
//!     file_pattern: Some(Regex::new(DEFAULT_FILE_PATTERN).unwrap()),
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/music"), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod path_utils;
pub mod walker;

use std::path::PathBuf;

use regex::Regex;

pub use walker::Walker;

/// Filenames scanned when no other pattern is configured.
pub const DEFAULT_FILE_PATTERN: &str = r"(?i)\.(aiff|flac|m4a|mp3|oga|ogg|opus|wav|wma)$";

/// A file discovered during directory walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new file entry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links to files and directories.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Gitignore-style patterns for paths to skip.
    pub ignore_patterns: Vec<String>,

    /// Only yield files whose name matches. `None` yields every file.
    pub file_pattern: Option<Regex>,
}

/// Errors that can occur during directory walking.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission denied when accessing a path.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// General I/O error with path context.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
