//! CSV output formatter for scan results.
//!
//! One row is generated for each grouped file.
//!
//! # Columns
//!
//! - `group_id`: 1-based group number
//! - `path`: Path under the scan root
//! - `size`: File size in bytes
//! - `duration`: Audio duration in seconds

use std::io;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use super::display_path;
use crate::duplicates::AudioGroup;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    path: String,
    size: u64,
    duration: &'a str,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    root: &'a Path,
    groups: &'a [AudioGroup],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(root: &'a Path, groups: &'a [AudioGroup]) -> Self {
        Self { root, groups }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, group) in self.groups.iter().enumerate() {
            for file in &group.files {
                let duration = format!("{:.3}", file.duration);
                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    path: display_path(self.root, &file.path),
                    size: file.size,
                    duration: &duration,
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
