//! JSON output formatter for scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "total_size": 9437184,
//!       "files": [
//!         { "path": "/music/a.flac", "key": "a.flac", "size": 8388608, "duration": 215.4 },
//!         { "path": "/music/a.mp3", "key": "a.mp3", "size": 1048576, "duration": 215.5 }
//!       ]
//!     }
//!   ],
//!   "skipped": [ { "path": "broken.ogg", "reason": "..." } ],
//!   "summary": {
//!     "total_files": 100,
//!     "groups": 1,
//!     "exit_code": 0,
//!     "exit_code_name": "ED000"
//!   }
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::display_path;
use crate::duplicates::{AudioGroup, ScanSummary, SkippedFile};
use crate::error::ExitCode;

/// A single file of a group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Path under the scan root
    pub path: String,
    /// Cache key (relative to the scan root)
    pub key: String,
    /// File size in bytes
    pub size: u64,
    /// Audio duration in seconds
    pub duration: f64,
}

/// A group of near-duplicate files in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// Combined size of the group's files in bytes
    pub total_size: u64,
    /// Files, sorted by key
    pub files: Vec<JsonFile>,
}

impl JsonGroup {
    fn from_group(root: &Path, group: &AudioGroup) -> Self {
        Self {
            total_size: group.total_size(),
            files: group
                .files
                .iter()
                .map(|f| JsonFile {
                    path: display_path(root, &f.path),
                    key: f.path.clone(),
                    size: f.size,
                    duration: f.duration,
                })
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Audio files found by the walker
    pub total_files: usize,
    /// Total size of all walked files in bytes
    pub total_size: u64,
    /// Fingerprints served from the cache
    pub cached_files: usize,
    /// Fingerprints computed during this scan
    pub fingerprinted_files: usize,
    /// Uncached files left out by `--skip-new-files`
    pub skipped_new_files: usize,
    /// Candidate pairs scored
    pub comparisons: usize,
    /// Candidate pairs ignored because they were excluded
    pub excluded_pairs: usize,
    /// Pairs linked as matches
    pub matches: usize,
    /// Number of groups
    pub groups: usize,
    /// Files belonging to some group
    pub grouped_files: usize,
    /// Directory entries that couldn't be read
    pub walk_errors: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "ED000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            cached_files: summary.cached_files,
            fingerprinted_files: summary.fingerprinted_files,
            skipped_new_files: summary.skipped_new_files,
            comparisons: summary.comparisons,
            excluded_pairs: summary.excluded_pairs,
            matches: summary.matches,
            groups: summary.groups,
            grouped_files: summary.grouped_files,
            walk_errors: summary.scan_errors.len(),
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Groups of near-duplicate files
    pub groups: Vec<JsonGroup>,
    /// Files that couldn't be fingerprinted
    pub skipped: Vec<SkippedFile>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output.
    ///
    /// ```
    /// use echodupe::duplicates::ScanSummary;
    /// use echodupe::error::ExitCode;
    /// use echodupe::output::JsonOutput;
    /// use std::path::Path;
    ///
    /// let output = JsonOutput::new(Path::new("/music"), &[], &ScanSummary::default(), ExitCode::NoGroups);
    /// assert!(output.groups.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(
        root: &Path,
        groups: &[AudioGroup],
        summary: &ScanSummary,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            groups: groups
                .iter()
                .map(|g| JsonGroup::from_group(root, g))
                .collect(),
            skipped: summary.skipped_files.clone(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FileId, FileRecord};
    use std::path::PathBuf;
    use std::time::Duration;

    fn record(id: u32, path: &str, size: u64) -> FileRecord {
        FileRecord {
            id: FileId::new(id).unwrap(),
            path: path.to_string(),
            size,
            duration: 180.5,
            fingerprint: vec![1, 2, 3],
        }
    }

    fn sample() -> (Vec<AudioGroup>, ScanSummary) {
        let groups = vec![AudioGroup::new(vec![
            record(2, "b.mp3", 100),
            record(1, "a.flac", 900),
        ])];
        let summary = ScanSummary {
            total_files: 3,
            total_size: 1500,
            fingerprinted_files: 3,
            comparisons: 1,
            matches: 1,
            groups: 1,
            grouped_files: 2,
            scan_duration: Duration::from_millis(1234),
            skipped_files: vec![SkippedFile {
                path: "c.ogg".to_string(),
                reason: "Empty fingerprint: c.ogg".to_string(),
            }],
            ..Default::default()
        };
        (groups, summary)
    }

    #[test]
    fn test_json_structure() {
        let (groups, summary) = sample();
        let root = PathBuf::from("/music");
        let output = JsonOutput::new(&root, &groups, &summary, ExitCode::PartialSuccess);
        let value: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

        let files = value["groups"][0]["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["key"], "a.flac");
        assert_eq!(files[0]["path"], root.join("a.flac").to_string_lossy().as_ref());
        assert_eq!(files[0]["duration"], 180.5);
        assert!(files[0].get("fingerprint").is_none());
        assert_eq!(value["groups"][0]["total_size"], 1000);

        assert_eq!(value["skipped"][0]["path"], "c.ogg");
        assert_eq!(value["summary"]["scan_duration_ms"], 1234);
        assert_eq!(value["summary"]["exit_code"], 3);
        assert_eq!(value["summary"]["exit_code_name"], "ED003");
    }

    #[test]
    fn test_write_to_pretty() {
        let (groups, summary) = sample();
        let output = JsonOutput::new(Path::new("/m"), &groups, &summary, ExitCode::Success);
        let mut buf = Vec::new();
        output.write_to(&mut buf, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"groups\""));
    }
}
