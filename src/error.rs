//! Structured error handling and exit codes.

use serde::Serialize;

use crate::cache::CacheError;
use crate::duplicates::FinderError;

/// Exit codes for the EchoDupe application.
///
/// - 0: Success (completed normally, groups found)
/// - 1: General error (unexpected failure)
/// - 2: No groups found (completed normally, nothing alike)
/// - 3: Partial success (completed, but some files were skipped or unreadable)
/// - 4: Invalid configuration (bad thresholds, pattern, or cache settings)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and near-duplicate groups were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No groups: Scan completed but no near-duplicates were found.
    NoGroups = 2,
    /// Partial success: Scan completed but skipped some files.
    PartialSuccess = 3,
    /// Invalid configuration, detected before any scanning.
    InvalidConfig = 4,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "ED000",
            Self::GeneralError => "ED001",
            Self::NoGroups => "ED002",
            Self::PartialSuccess => "ED003",
            Self::InvalidConfig => "ED004",
            Self::Interrupted => "ED130",
        }
    }

    /// Pick the exit code for an error that ended the run.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<FinderError>() {
                if matches!(e, FinderError::Interrupted) {
                    return Self::Interrupted;
                }
                if e.is_configuration_error() {
                    return Self::InvalidConfig;
                }
            }
            if let Some(e) = cause.downcast_ref::<CacheError>() {
                if e.is_configuration_error() {
                    return Self::InvalidConfig;
                }
            }
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "ED001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
