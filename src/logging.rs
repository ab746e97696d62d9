//! Logging setup using the `log` facade and `env_logger` backend.
//!
//! The level comes from `RUST_LOG` when it is set, otherwise from the CLI:
//! `--quiet` logs errors only, `-v` enables debug and `-vv` trace. The
//! default is info, which is where the scan's periodic progress lines go.
//!
//! Debug builds prefix each line with a timestamp (and the module path when
//! verbose); release builds print only the level and message.

use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize logging for the process.
///
/// Calling this more than once logs a debug message and keeps the first
/// logger.
///
/// ```rust,no_run
/// use echodupe::logging::init_logging;
///
/// init_logging(1, false);
/// log::debug!("visible with -v");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let mut builder = Builder::new();

    match &rust_log {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
        return;
    }

    match rust_log {
        Some(spec) => log::debug!("Logging configured from RUST_LOG={spec}"),
        None => log::debug!("Logging initialized at {}", level_name(log::max_level())),
    }
}

/// Log level for the given CLI flags. Quiet wins over verbose.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

#[cfg(debug_assertions)]
fn configure_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        let timestamp = buf.timestamp_seconds();
        if verbose > 0 {
            writeln!(
                buf,
                "{timestamp} {style}{level:<5}{style:#} [{}] {}",
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{timestamp} {style}{level:<5}{style:#} {}", record.args())
        }
    });
}

#[cfg(not(debug_assertions))]
fn configure_format(builder: &mut Builder, _verbose: u8) {
    builder.format(|buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        writeln!(buf, "{style}{level:<5}{style:#} {}", record.args())
    });
}

/// Lowercase name of a level filter.
#[must_use]
pub fn level_name(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
