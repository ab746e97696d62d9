//! Plain text output.
//!
//! One path per line, groups separated by a blank line, so the output can be
//! piped straight into other tools. With file info enabled each line also
//! carries the file's size and duration.

use std::io::{self, Write};
use std::path::Path;

use bytesize::ByteSize;
use yansi::Paint;

use super::display_path;
use crate::cache::FileRecord;
use crate::duplicates::{Alignment, AudioGroup, ScanSummary};

/// Text output formatter.
pub struct TextOutput<'a> {
    root: &'a Path,
    groups: &'a [AudioGroup],
    print_file_info: bool,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter for groups found under `root`.
    #[must_use]
    pub fn new(root: &'a Path, groups: &'a [AudioGroup]) -> Self {
        Self {
            root,
            groups,
            print_file_info: false,
            color: false,
        }
    }

    /// Append size and duration to each path.
    #[must_use]
    pub fn with_file_info(mut self, enabled: bool) -> Self {
        self.print_file_info = enabled;
        self
    }

    /// Dim the file info with ANSI styling.
    #[must_use]
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Write every group.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (i, group) in self.groups.iter().enumerate() {
            if i != 0 {
                writeln!(writer)?;
            }
            for file in &group.files {
                let path = display_path(self.root, &file.path);
                if self.print_file_info {
                    writeln!(writer, "{path} {}", self.file_info(file))?;
                } else {
                    writeln!(writer, "{path}")?;
                }
            }
        }
        Ok(())
    }

    fn file_info(&self, file: &FileRecord) -> String {
        let info = format!(
            "({}, {})",
            ByteSize::b(file.size),
            format_duration(file.duration)
        );
        if self.color {
            info.dim().to_string()
        } else {
            info
        }
    }
}

/// Write a short human summary of the scan.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(writer: &mut W, summary: &ScanSummary, color: bool) -> io::Result<()> {
    let headline = format!(
        "{} group(s), {} file(s) alike",
        summary.groups, summary.grouped_files
    );
    let headline = if color {
        headline.bold().to_string()
    } else {
        headline
    };
    writeln!(
        writer,
        "{headline} among {} scanned ({}; {} cached, {} fingerprinted) in {:.2}s",
        summary.scanned_files(),
        summary.total_size_display(),
        summary.cached_files,
        summary.fingerprinted_files,
        summary.scan_duration.as_secs_f64()
    )?;
    if summary.skipped_new_files > 0 {
        writeln!(
            writer,
            "{} uncached file(s) not considered",
            summary.skipped_new_files
        )?;
    }
    for skipped in &summary.skipped_files {
        let line = format!("skipped {}: {}", skipped.path, skipped.reason);
        if color {
            writeln!(writer, "{}", line.yellow())?;
        } else {
            writeln!(writer, "{line}")?;
        }
    }
    for err in &summary.scan_errors {
        writeln!(writer, "walk error: {err}")?;
    }
    Ok(())
}

/// Write the result of comparing two files.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_comparison<W: Write>(
    writer: &mut W,
    a: &Path,
    b: &Path,
    alignment: &Alignment,
) -> io::Result<()> {
    writeln!(writer, "{}", a.display())?;
    writeln!(writer, "{}", b.display())?;
    writeln!(
        writer,
        "score {:.4} (offset a={}, b={})",
        alignment.score, alignment.a_offset, alignment.b_offset
    )
}

/// Format seconds as `m:ss.s`, or `h:mm:ss.s` past an hour.
#[must_use]
pub fn format_duration(secs: f64) -> String {
    let tenths = (secs.max(0.0) * 10.0).round() as u64;
    let (hours, rest) = (tenths / 36_000, tenths % 36_000);
    let (minutes, rest) = (rest / 600, rest % 600);
    let (seconds, tenth) = (rest / 10, rest % 10);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}.{tenth}")
    } else {
        format!("{minutes}:{seconds:02}.{tenth}")
    }
}
