//! Persisted description of the fingerprint settings a cache was built with.

use crate::fingerprint::FingerprintSettings;

/// Layout version of [`SettingsDescriptor`].
///
/// Bump when fields are added or their meaning changes; caches written under a
/// different version are rejected.
pub const SETTINGS_VERSION: u32 = 1;

/// Structured, versioned form of [`FingerprintSettings`].
///
/// Durations are held as whole milliseconds so that equality never depends on
/// floating-point formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsDescriptor {
    /// Descriptor layout version
    pub version: u32,
    /// Maximum processed duration in milliseconds
    pub max_duration_ms: u32,
    /// Chunk duration in milliseconds (0 = no chunking)
    pub chunk_duration_ms: u32,
    /// Fingerprint algorithm ID
    pub algorithm: u8,
    /// Whether chunks overlap
    pub overlap: bool,
}

impl From<&FingerprintSettings> for SettingsDescriptor {
    fn from(settings: &FingerprintSettings) -> Self {
        Self {
            version: SETTINGS_VERSION,
            max_duration_ms: secs_to_ms(settings.length),
            chunk_duration_ms: secs_to_ms(settings.chunk),
            algorithm: settings.algorithm,
            overlap: settings.overlap,
        }
    }
}

/// Saturating conversion; settings are range-checked before they get here.
fn secs_to_ms(secs: f64) -> u32 {
    (secs * 1000.0).round() as u32
}

fn fmt_ms(ms: u32) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

impl std::fmt::Display for SettingsDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "length={},chunk={},algorithm={},overlap={}",
            fmt_ms(self.max_duration_ms),
            fmt_ms(self.chunk_duration_ms),
            self.algorithm,
            self.overlap
        )
    }
}
