//! Output formatters for scan results.
//!
//! This module provides different output formats for scan results:
//! - Plain text for people and shell pipelines ([`text`])
//! - JSON for automation and scripting ([`json`])
//! - CSV for spreadsheet import ([`csv`])
//!
//! Groups carry cache keys (paths relative to the scan root); every
//! formatter joins them back onto the root it is given.
//!
//! # Example
//!
//! ```no_run
//! use echodupe::cache::FingerprintCache;
//! use echodupe::duplicates::{DuplicateFinder, FinderConfig};
//! use echodupe::error::ExitCode;
//! use echodupe::fingerprint::Fpcalc;
//! use echodupe::output::JsonOutput;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let config = FinderConfig::default();
//! let cache = FingerprintCache::open_in_memory(&config.settings).unwrap();
//! let finder = DuplicateFinder::new(config, cache, Arc::new(Fpcalc::new()));
//! let root = Path::new("/music");
//! let (groups, summary) = finder.find_duplicates(root).unwrap();
//!
//! let output = JsonOutput::new(root, &groups, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::path::Path;

pub use csv::{CsvOutput, CsvOutputError};
pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;

/// Full display path for a cache key under `root`.
#[must_use]
pub fn display_path(root: &Path, key: &str) -> String {
    key.split('/')
        .fold(root.to_path_buf(), |path, part| path.join(part))
        .to_string_lossy()
        .into_owned()
}
