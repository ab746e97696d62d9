//! SQLite-backed fingerprint cache.
//!
//! # Schema
//!
//! ```sql
//! Settings      (Version, MaxDurationMs, ChunkDurationMs, Algorithm, Overlap, Descr)
//! Files         (Id INTEGER PRIMARY KEY AUTOINCREMENT, Path UNIQUE, Size, Duration, Fingerprint)
//! ExcludedPairs (PathA, PathB) with PathA <= PathB
//! ```
//!
//! `Settings` holds exactly one row, written when the database is created.
//! Opening an existing database under different fingerprint settings fails
//! with [`CacheError::SettingsMismatch`].

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use thiserror::Error;

use super::entry::{decode_fingerprint, encode_fingerprint, FileId, FileRecord, NewFileRecord};
use super::settings::{SettingsDescriptor, SETTINGS_VERSION};
use crate::fingerprint::FingerprintSettings;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Settings (
        Version INTEGER NOT NULL,
        MaxDurationMs INTEGER NOT NULL,
        ChunkDurationMs INTEGER NOT NULL,
        Algorithm INTEGER NOT NULL,
        Overlap INTEGER NOT NULL,
        Descr TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS Files (
        Id INTEGER PRIMARY KEY AUTOINCREMENT,
        Path TEXT NOT NULL UNIQUE,
        Size INTEGER NOT NULL,
        Duration REAL NOT NULL,
        Fingerprint BLOB NOT NULL
    );
    CREATE TABLE IF NOT EXISTS ExcludedPairs (
        PathA TEXT NOT NULL,
        PathB TEXT NOT NULL,
        PRIMARY KEY (PathA, PathB)
    );
";

/// Errors raised by the fingerprint cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The database was created with different fingerprint settings.
    #[error("Cache was built with different settings ({stored}); current settings are ({current})")]
    SettingsMismatch {
        /// Settings recorded in the database
        stored: String,
        /// Settings requested by the caller
        current: String,
    },

    /// The database uses a settings layout this version doesn't understand.
    #[error("Unsupported cache settings version {found} (expected {SETTINGS_VERSION})")]
    UnsupportedVersion {
        /// Version recorded in the database
        found: i64,
    },

    /// Underlying SQLite failure.
    #[error("Cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The cache directory could not be created.
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A stored fingerprint blob isn't a whole number of 32-bit words.
    #[error("Corrupt fingerprint for {path}: {len} bytes is not a multiple of 4")]
    InvalidFingerprintLength {
        /// Path of the corrupt row
        path: String,
        /// Blob length in bytes
        len: usize,
    },

    /// A stored or assigned ID is outside the positive 32-bit range.
    #[error("File ID {0} is out of range")]
    IdOutOfRange(i64),

    /// A stored row has values that can't be represented.
    #[error("Invalid cache record for {path}: {reason}")]
    InvalidRecord {
        /// Path of the offending record
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// No file with this ID is cached.
    #[error("File {0} not found in cache")]
    NotFound(FileId),

    /// A record for this path already exists.
    #[error("Path already cached: {0}")]
    DuplicatePath(String),
}

impl CacheError {
    /// Whether the error stems from how the cache was opened rather than
    /// from its contents.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::SettingsMismatch { .. } | Self::UnsupportedVersion { .. } | Self::CreateDir { .. }
        )
    }

    /// Whether the error means the stored data is inconsistent.
    #[must_use]
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFingerprintLength { .. }
                | Self::IdOutOfRange(_)
                | Self::InvalidRecord { .. }
                | Self::DuplicatePath(_)
        )
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Raw `Files` row before validation.
type RawRow = (i64, String, i64, f64, Vec<u8>);

/// Persistent store of file fingerprints and excluded pairs.
///
/// Not shared between threads; one scan owns one cache.
#[derive(Debug)]
pub struct FingerprintCache {
    conn: Connection,
    settings: SettingsDescriptor,
}

impl FingerprintCache {
    /// Open (or create) the cache at `path`.
    ///
    /// A new database records `settings`; an existing one must have been
    /// created with equal settings.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::SettingsMismatch`] if the stored settings differ,
    /// [`CacheError::UnsupportedVersion`] for an unknown settings layout, and
    /// [`CacheError::Database`] if the file can't be opened or isn't SQLite.
    pub fn open(path: &Path, settings: &FingerprintSettings) -> CacheResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        log::debug!("Opened fingerprint cache at {}", path.display());
        Self::init(conn, settings)
    }

    /// Open a throwaway cache that lives only in memory.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if SQLite fails to initialize.
    pub fn open_in_memory(settings: &FingerprintSettings) -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, settings)
    }

    fn init(conn: Connection, settings: &FingerprintSettings) -> CacheResult<Self> {
        conn.execute_batch(SCHEMA)?;
        let current = SettingsDescriptor::from(settings);

        let stored = conn
            .query_row(
                "SELECT Version, MaxDurationMs, ChunkDurationMs, Algorithm, Overlap, Descr
                 FROM Settings LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, bool>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        match stored {
            None => {
                conn.execute(
                    "INSERT INTO Settings
                     (Version, MaxDurationMs, ChunkDurationMs, Algorithm, Overlap, Descr)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        current.version,
                        current.max_duration_ms,
                        current.chunk_duration_ms,
                        current.algorithm,
                        current.overlap,
                        current.to_string(),
                    ],
                )?;
                log::debug!("Initialized cache settings: {current}");
            }
            Some((version, max_ms, chunk_ms, algorithm, overlap, descr)) => {
                if version != i64::from(SETTINGS_VERSION) {
                    return Err(CacheError::UnsupportedVersion { found: version });
                }
                let matches = max_ms == i64::from(current.max_duration_ms)
                    && chunk_ms == i64::from(current.chunk_duration_ms)
                    && algorithm == i64::from(current.algorithm)
                    && overlap == current.overlap;
                if !matches {
                    return Err(CacheError::SettingsMismatch {
                        stored: descr,
                        current: current.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            conn,
            settings: current,
        })
    }

    /// Settings this cache was opened with.
    #[must_use]
    pub fn settings(&self) -> &SettingsDescriptor {
        &self.settings
    }

    /// Look up a cached file by its relative path.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidFingerprintLength`] or
    /// [`CacheError::IdOutOfRange`] if the stored row is corrupt.
    pub fn get_by_path(&self, path: &str) -> CacheResult<Option<FileRecord>> {
        let raw = self
            .conn
            .query_row(
                "SELECT Id, Path, Size, Duration, Fingerprint FROM Files WHERE Path = ?1",
                params![path],
                read_row,
            )
            .optional()?;
        raw.map(into_record).transpose()
    }

    /// Look up a cached file by ID.
    ///
    /// # Errors
    ///
    /// Same as [`FingerprintCache::get_by_path`].
    pub fn get_by_id(&self, id: FileId) -> CacheResult<Option<FileRecord>> {
        let raw = self
            .conn
            .query_row(
                "SELECT Id, Path, Size, Duration, Fingerprint FROM Files WHERE Id = ?1",
                params![id.get()],
                read_row,
            )
            .optional()?;
        raw.map(into_record).transpose()
    }

    /// Path of the file with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] if no such file is cached.
    pub fn path_of(&self, id: FileId) -> CacheResult<String> {
        self.conn
            .query_row(
                "SELECT Path FROM Files WHERE Id = ?1",
                params![id.get()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(CacheError::NotFound(id))
    }

    /// Insert a new record and return its assigned ID.
    ///
    /// Records are never updated; a path can only be saved once.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::DuplicatePath`] if the path is already cached,
    /// [`CacheError::IdOutOfRange`] if the assigned ID would not fit in 31
    /// bits (the insert is rolled back), and [`CacheError::InvalidRecord`] for
    /// sizes or durations that can't be stored.
    pub fn save(&self, record: &NewFileRecord) -> CacheResult<FileId> {
        let size = i64::try_from(record.size).map_err(|_| CacheError::InvalidRecord {
            path: record.path.clone(),
            reason: format!("size {} does not fit in 63 bits", record.size),
        })?;
        if !record.duration.is_finite() || record.duration < 0.0 {
            return Err(CacheError::InvalidRecord {
                path: record.path.clone(),
                reason: format!("duration {} is not a non-negative number", record.duration),
            });
        }

        let tx = self.conn.unchecked_transaction()?;
        let inserted = tx.execute(
            "INSERT INTO Files (Path, Size, Duration, Fingerprint) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.path,
                size,
                record.duration,
                encode_fingerprint(&record.fingerprint)
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(CacheError::DuplicatePath(record.path.clone()));
            }
            Err(e) => return Err(e.into()),
        }

        let rowid = tx.last_insert_rowid();
        let Some(id) = FileId::from_rowid(rowid) else {
            // Dropping the transaction rolls the insert back.
            return Err(CacheError::IdOutOfRange(rowid));
        };
        tx.commit()?;

        log::trace!("Cached {} as {id}", record.path);
        Ok(id)
    }

    /// Number of cached files.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on query failure.
    pub fn file_count(&self) -> CacheResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Files", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Whether the user has marked `a` and `b` as not duplicates.
    ///
    /// The relation is symmetric.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on query failure.
    pub fn is_excluded_pair(&self, a: &str, b: &str) -> CacheResult<bool> {
        let (first, second) = canonical_pair(a, b);
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM ExcludedPairs WHERE PathA = ?1 AND PathB = ?2",
                params![first, second],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Record that `a` and `b` are not duplicates. Saving an existing pair
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on write failure.
    pub fn save_excluded_pair(&self, a: &str, b: &str) -> CacheResult<()> {
        let (first, second) = canonical_pair(a, b);
        self.conn.execute(
            "INSERT OR IGNORE INTO ExcludedPairs (PathA, PathB) VALUES (?1, ?2)",
            params![first, second],
        )?;
        log::debug!("Excluded pair: {first} <-> {second}");
        Ok(())
    }

    /// All excluded pairs, each in canonical order.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on query failure.
    pub fn excluded_pairs(&self) -> CacheResult<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT PathA, PathB FROM ExcludedPairs ORDER BY PathA, PathB")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Flush and close the database.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if SQLite fails to close cleanly.
    pub fn close(self) -> CacheResult<()> {
        self.conn.close().map_err(|(_, e)| CacheError::Database(e))
    }
}

fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn into_record((rowid, path, size, duration, blob): RawRow) -> CacheResult<FileRecord> {
    let id = FileId::from_rowid(rowid).ok_or(CacheError::IdOutOfRange(rowid))?;
    let size = u64::try_from(size).map_err(|_| CacheError::InvalidRecord {
        path: path.clone(),
        reason: format!("negative size {size}"),
    })?;
    let fingerprint = decode_fingerprint(&blob).ok_or_else(|| CacheError::InvalidFingerprintLength {
        path: path.clone(),
        len: blob.len(),
    })?;
    Ok(FileRecord {
        id,
        path,
        size,
        duration,
        fingerprint,
    })
}
