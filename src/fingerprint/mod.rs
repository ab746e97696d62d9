//! Acoustic fingerprint generation.
//!
//! Fingerprints are produced by an external tool; this crate never decodes
//! audio itself. The [`FingerprintGenerator`] trait is the seam between the
//! scan pipeline and that tool, and [`Fpcalc`] is the implementation that
//! runs Chromaprint's `fpcalc` binary.
//!
//! # Example
//!
//! ```no_run
//! use echodupe::fingerprint::{FingerprintGenerator, FingerprintSettings, Fpcalc};
//! use std::path::Path;
//!
//! let fpcalc = Fpcalc::new();
//! let settings = FingerprintSettings::default();
//! let fp = fpcalc.generate(Path::new("song.mp3"), &settings).unwrap();
//! println!("{} codes, {:.1}s", fp.codes.len(), fp.duration);
//! ```

pub mod fpcalc;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use fpcalc::Fpcalc;

/// An ordered sequence of 32-bit acoustic feature codes.
pub type Fingerprint = Vec<u32>;

/// Longest duration (in seconds) accepted for `length` and `chunk`.
///
/// Durations are persisted as whole milliseconds in a `u32`.
pub const MAX_SETTING_SECS: f64 = (u32::MAX / 1000) as f64;

/// Settings passed to the fingerprint generator.
///
/// Fingerprints computed under different settings are not comparable, so the
/// fingerprint cache records these settings and refuses to open under others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintSettings {
    /// Maximum audio duration to process, in seconds (`fpcalc -length`).
    pub length: f64,
    /// Split audio into chunks of this duration, in seconds; 0 disables
    /// chunking (`fpcalc -chunk`).
    pub chunk: f64,
    /// Fingerprint algorithm (`fpcalc -algorithm`).
    pub algorithm: u8,
    /// Overlap chunks slightly (`fpcalc -overlap`).
    pub overlap: bool,
}

impl Default for FingerprintSettings {
    fn default() -> Self {
        Self {
            length: 15.0,
            chunk: 0.0,
            algorithm: 2,
            overlap: false,
        }
    }
}

impl FingerprintSettings {
    /// Check that the settings can be passed to the generator and persisted.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if !self.length.is_finite() || self.length <= 0.0 || self.length > MAX_SETTING_SECS {
            return Err(format!(
                "fingerprint length must be in (0, {MAX_SETTING_SECS}] seconds, got {}",
                self.length
            ));
        }
        if !self.chunk.is_finite() || self.chunk < 0.0 || self.chunk > MAX_SETTING_SECS {
            return Err(format!(
                "fingerprint chunk must be in [0, {MAX_SETTING_SECS}] seconds, got {}",
                self.chunk
            ));
        }
        Ok(())
    }
}

/// Output of a successful fingerprint run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFingerprint {
    /// Ordered 32-bit fingerprint codes.
    pub codes: Fingerprint,
    /// Duration of the audio in seconds.
    pub duration: f64,
}

/// Errors returned by a [`FingerprintGenerator`].
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// The audio is too short to produce any fingerprint codes.
    #[error("Empty fingerprint: {0}")]
    EmptyFingerprint(PathBuf),

    /// The generator binary could not be found.
    #[error("fpcalc not found in PATH (install libchromaprint-tools?)")]
    NotInstalled,

    /// The generator process could not be started.
    #[error("Failed to run fpcalc on {path}: {source}")]
    Spawn {
        /// File being fingerprinted
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The generator exited unsuccessfully.
    #[error("fpcalc failed for {path} ({status}): {stderr}")]
    Failed {
        /// File being fingerprinted
        path: PathBuf,
        /// Exit status description
        status: String,
        /// First line of the generator's stderr
        stderr: String,
    },

    /// The generator's output could not be parsed.
    #[error("Invalid fpcalc output for {path}: {source}")]
    Parse {
        /// File being fingerprinted
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl FingerprintError {
    /// Whether the file simply had no fingerprintable audio.
    #[must_use]
    pub fn is_empty_fingerprint(&self) -> bool {
        matches!(self, Self::EmptyFingerprint(_))
    }
}

/// Produces fingerprints for audio files.
///
/// Implementations must be shareable across threads: uncached files may be
/// fingerprinted on a worker pool ahead of the matching stage.
pub trait FingerprintGenerator: Send + Sync {
    /// Fingerprint the file at `path` under `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::EmptyFingerprint`] for audio that is too
    /// short, and other variants when the generator itself fails.
    fn generate(
        &self,
        path: &Path,
        settings: &FingerprintSettings,
    ) -> Result<GeneratedFingerprint, FingerprintError>;
}
