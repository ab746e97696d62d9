//! Ctrl+C handling for graceful shutdown.
//!
//! A shared `AtomicBool` is set when the user interrupts. The scan pipeline
//! checks it between files; fingerprints saved before the interrupt stay in
//! the cache, so the next run resumes cheaply.
//!
//! ```rust,no_run
//! use echodupe::duplicates::FinderConfig;
//! use echodupe::signal::install_handler;
//!
//! let handler = install_handler().unwrap();
//! let config = FinderConfig::default().with_shutdown_flag(handler.flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared shutdown flag.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an interrupt (or [`request_shutdown`](Self::request_shutdown))
    /// has happened.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Set the flag without a signal.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag to hand to the finder and walker.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error installing the Ctrl+C handler.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// ctrlc refused to install the handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static INSTALLED: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler.
///
/// The handler is installed once per process; later calls return the same
/// flag, cleared. This lets `run_app` be called repeatedly in tests.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the OS refuses the handler.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = INSTALLED.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.flag();
    let result = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "\nInterrupted. Fingerprints computed so far remain cached."
        );
        let _ = stderr.flush();
    });

    match result {
        Ok(()) => Ok(INSTALLED.get_or_init(|| handler).clone()),
        Err(ctrlc::Error::MultipleHandlers) => match INSTALLED.get() {
            Some(installed) => Ok(installed.clone()),
            None => {
                log::debug!("Ctrl+C handler registered elsewhere, using an unhooked flag");
                Ok(handler)
            }
        },
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
