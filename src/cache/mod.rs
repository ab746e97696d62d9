//! Fingerprint caching module for EchoDupe.
//!
//! Fingerprinting is by far the slowest part of a scan, so every computed
//! fingerprint is persisted and reused on subsequent scans.
//!
//! # Architecture
//!
//! * [`database`]: SQLite persistence, schema, settings check and CRUD.
//! * [`entry`]: File IDs, records and the fingerprint blob encoding.
//! * [`settings`]: The versioned settings descriptor stored with the cache.
//!
//! # Cache Invalidation
//!
//! There is none at the record level: records are insert-only and keyed by
//! relative path. The whole cache is bound to the fingerprint settings it was
//! created with; opening it with other settings is an error, and the user must
//! point at a different cache file instead.

pub mod database;
pub mod entry;
pub mod settings;

pub use database::{CacheError, CacheResult, FingerprintCache};
pub use entry::{decode_fingerprint, encode_fingerprint, FileId, FileRecord, NewFileRecord};
pub use settings::{SettingsDescriptor, SETTINGS_VERSION};
