//! Progress reporting utilities using indicatif.
//!
//! The scan pipeline reports through the [`ProgressCallback`] trait; the
//! [`Progress`] struct implements it with terminal progress bars for the text
//! output mode.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name for directory walking.
pub const PHASE_WALKING: &str = "walking";
/// Phase name for fingerprinting and matching.
pub const PHASE_SCANNING: &str = "scanning";

/// Progress callback for the scan pipeline.
///
/// Implement this trait to receive progress updates during a scan.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_WALKING`] or [`PHASE_SCANNING`])
    /// * `total` - Total number of items to process (0 if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been processed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    scanning: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

fn slot(m: &Mutex<Option<ProgressBar>>) -> MutexGuard<'_, Option<ProgressBar>> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use echodupe::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            scanning: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn scanning_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    /// The bar currently receiving updates, preferring the later phase.
    fn with_active_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(pb) = slot(&self.scanning).as_ref() {
            f(pb);
            return;
        }
        if let Some(pb) = slot(&self.walking).as_ref() {
            f(pb);
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALKING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directory");
                pb.enable_steady_tick(Duration::from_millis(100));
                *slot(&self.walking) = Some(pb);
            }
            PHASE_SCANNING => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::scanning_style());
                pb.set_message("Fingerprinting");
                *slot(&self.scanning) = Some(pb);
            }
            other => log::debug!("Unknown progress phase: {other}"),
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        let msg = truncate_path(path, 40);
        self.with_active_bar(|pb| {
            pb.set_position(current as u64);
            pb.set_message(msg);
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALKING => {
                if let Some(pb) = slot(&self.walking).take() {
                    pb.finish_with_message("Walking complete");
                }
            }
            PHASE_SCANNING => {
                if let Some(pb) = slot(&self.scanning).take() {
                    pb.finish_with_message("Scanning complete");
                }
            }
            _ => {}
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.with_active_bar(|pb| pb.set_message(message.to_string()));
    }
}

/// Truncate a path for display in the progress bar.
///
/// Keeps the file name where possible and never splits a character.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = path.rsplit(&['/', '\\'][..]).next().unwrap_or(path);
    let name_len = file_name.chars().count();
    if name_len + 4 <= max_len {
        return format!(".../{file_name}");
    }

    let keep = max_len.saturating_sub(3);
    let tail: String = file_name.chars().skip(name_len - keep.min(name_len)).collect();
    format!("...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_path_unchanged() {
        assert_eq!(truncate_path("a/b.mp3", 40), "a/b.mp3");
    }

    #[test]
    fn test_truncate_keeps_file_name() {
        let path = "some/very/deeply/nested/collection/of/music/track.mp3";
        assert_eq!(truncate_path(path, 20), ".../track.mp3");
    }

    #[test]
    fn test_truncate_long_file_name() {
        let path = "dir/ééééééééééééééééééééééééé.flac";
        let out = truncate_path(path, 10);
        assert!(out.starts_with("..."));
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with(".flac"));
    }

    #[test]
    fn test_quiet_progress_is_noop() {
        let progress = Progress::new(true);
        progress.on_phase_start(PHASE_SCANNING, 10);
        progress.on_progress(1, "a.mp3");
        progress.on_message("hello");
        progress.on_phase_end(PHASE_SCANNING);
        assert!(slot(&progress.scanning).is_none());
    }

    #[test]
    fn test_phase_lifecycle() {
        let progress = Progress::new(false);
        progress.on_phase_start(PHASE_WALKING, 0);
        assert!(slot(&progress.walking).is_some());
        progress.on_progress(3, "a.mp3");
        progress.on_phase_end(PHASE_WALKING);
        assert!(slot(&progress.walking).is_none());

        progress.on_phase_start(PHASE_SCANNING, 2);
        progress.on_progress(1, "a.mp3");
        progress.on_phase_end(PHASE_SCANNING);
        assert!(slot(&progress.scanning).is_none());
    }
}
