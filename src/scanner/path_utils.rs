//! Cache keys for scanned paths.
//!
//! Files are cached under their path relative to the scanned directory, so a
//! collection can be moved or mounted elsewhere without losing its cache.
//! Keys are always `/`-separated and NFC-normalized.
//!
//! # Background
//!
//! macOS uses NFD (Decomposed) normalization for file paths, while Windows
//! and Linux typically use NFC (Composed) normalization. The same visual
//! filename can therefore have different byte representations:
//!
//! - NFC: `café.mp3` - 'é' is U+00E9 (single code point)
//! - NFD: `café.mp3` - 'e' U+0065 + combining acute accent U+0301
//!
//! Without normalization, a collection copied between systems would look
//! like a fresh set of files to the cache.
//!
//! # Example
//!
//! ```
//! use echodupe::scanner::path_utils::{normalize_path_str, relative_key};
//! use std::path::Path;
//!
//! assert_eq!(normalize_path_str("cafe\u{0301}.mp3"), "café.mp3");
//! assert_eq!(
//!     relative_key(Path::new("/music"), Path::new("/music/artist/01.flac")),
//!     Some("artist/01.flac".to_string())
//! );
//! ```

use std::path::{Component, Path};
use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Cache key for `path` relative to `root`.
///
/// Returns `None` if `path` is not strictly inside `root`, or if a component
/// is not valid UTF-8.
#[must_use]
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(normalize_path_str(&parts.join("/")))
}
