//! Chromaprint `fpcalc` runner.
//!
//! Runs `fpcalc -raw -json` once per file and parses its JSON output.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use super::{FingerprintError, FingerprintGenerator, FingerprintSettings, GeneratedFingerprint};

/// Message `fpcalc` prints when the input is too short to fingerprint.
const EMPTY_FINGERPRINT_MESSAGE: &str = "ERROR: Empty fingerprint";

/// Raw JSON object printed by `fpcalc -raw -json`.
#[derive(Debug, Deserialize)]
struct FpcalcOutput {
    #[serde(default)]
    fingerprint: Vec<u32>,
    duration: f64,
}

/// Fingerprint generator backed by the `fpcalc` binary.
#[derive(Debug, Clone)]
pub struct Fpcalc {
    program: PathBuf,
}

impl Fpcalc {
    /// Use `fpcalc` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("fpcalc"),
        }
    }

    /// Use a specific `fpcalc` executable.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check whether the binary can be executed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .output()
            .is_ok_and(|out| out.status.success())
    }

    /// Build the argument list for fingerprinting `path`.
    #[must_use]
    pub fn args(&self, path: &Path, settings: &FingerprintSettings) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-raw".into(),
            "-json".into(),
            "-length".into(),
            format!("{:.3}", settings.length).into(),
            "-algorithm".into(),
            settings.algorithm.to_string().into(),
        ];
        if settings.chunk > 0.0 {
            args.push("-chunk".into());
            args.push(format!("{:.3}", settings.chunk).into());
        }
        if settings.overlap {
            args.push("-overlap".into());
        }
        args.push(path.as_os_str().to_owned());
        args
    }
}

impl Default for Fpcalc {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintGenerator for Fpcalc {
    fn generate(
        &self,
        path: &Path,
        settings: &FingerprintSettings,
    ) -> Result<GeneratedFingerprint, FingerprintError> {
        log::trace!("Running {} on {}", self.program.display(), path.display());

        let output = Command::new(&self.program)
            .args(self.args(path, settings))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FingerprintError::NotInstalled
                } else {
                    FingerprintError::Spawn {
                        path: path.to_path_buf(),
                        source: e,
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first_line = stderr.lines().next().unwrap_or_default().trim();
            if first_line == EMPTY_FINGERPRINT_MESSAGE {
                return Err(FingerprintError::EmptyFingerprint(path.to_path_buf()));
            }
            return Err(FingerprintError::Failed {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: first_line.to_string(),
            });
        }

        parse_output(path, &output.stdout)
    }
}

/// Parse the JSON printed by `fpcalc -raw -json` for `path`.
///
/// # Errors
///
/// Returns [`FingerprintError::Parse`] for malformed JSON and
/// [`FingerprintError::EmptyFingerprint`] when no codes were produced.
pub fn parse_output(path: &Path, stdout: &[u8]) -> Result<GeneratedFingerprint, FingerprintError> {
    let parsed: FpcalcOutput =
        serde_json::from_slice(stdout).map_err(|e| FingerprintError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    if parsed.fingerprint.is_empty() {
        return Err(FingerprintError::EmptyFingerprint(path.to_path_buf()));
    }

    Ok(GeneratedFingerprint {
        codes: parsed.fingerprint,
        duration: parsed.duration,
    })
}
