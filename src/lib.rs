//! EchoDupe - acoustic near-duplicate audio finder
//!
//! Finds recordings of the same audio (re-encodes, different bitrates,
//! padded or trimmed copies) by comparing Chromaprint fingerprints. The
//! pipeline walks a directory, fingerprints each audio file with `fpcalc`
//! (caching the result in SQLite), narrows candidates with an inverted index
//! over truncated fingerprint codes, confirms them with a bitwise similarity
//! score, and reports connected groups of matching files.

pub mod cache;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cache::FingerprintCache;
use crate::cli::{Cli, Commands, CompareArgs, ExcludeArgs, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{best_alignment, DuplicateFinder, FinderError};
use crate::error::ExitCode;
use crate::fingerprint::{FingerprintError, FingerprintGenerator, Fpcalc};
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::path_utils::normalize_path_str;

/// Run the command described by `cli` with `fpcalc` as the fingerprinter.
///
/// # Errors
///
/// Returns an error if `fpcalc` is missing or the command fails; use
/// [`ExitCode::for_error`] to map it to an exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let fpcalc = Fpcalc::new();
    let needs_fpcalc = match &cli.command {
        Commands::Scan(args) => !args.skip_new_files,
        Commands::Compare(_) => true,
        Commands::Exclude(_) => false,
    };
    if needs_fpcalc && !fpcalc.is_available() {
        return Err(FingerprintError::NotInstalled.into());
    }
    run_with_generator(cli, Arc::new(fpcalc))
}

/// Run the command described by `cli` with a custom fingerprinter.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
pub fn run_with_generator(cli: Cli, generator: Arc<dyn FingerprintGenerator>) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref())?;
    config.merge_cli(&cli);
    log::debug!("Effective configuration: {config:?}");

    match &cli.command {
        Commands::Scan(args) => run_scan(&cli, args, &config, generator),
        Commands::Compare(args) => run_compare(args, &config, generator.as_ref()),
        Commands::Exclude(args) => run_exclude(args, &config),
    }
}

fn run_scan(
    cli: &Cli,
    args: &ScanArgs,
    config: &Config,
    generator: Arc<dyn FingerprintGenerator>,
) -> Result<ExitCode> {
    config.validate()?;

    let shutdown = signal::install_handler()?;
    let mut finder_config = config.finder_config()?.with_shutdown_flag(shutdown.flag());
    let interactive = config.output == OutputFormat::Text && io::stderr().is_terminal();
    if interactive && !cli.quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let cache = match config.resolved_cache_path() {
        Some(path) => {
            log::info!("Using fingerprint cache {}", path.display());
            FingerprintCache::open(&path, &config.fingerprint)
                .with_context(|| format!("Failed to open cache {}", path.display()))?
        }
        None => {
            log::info!("Keeping fingerprints in memory");
            FingerprintCache::open_in_memory(&config.fingerprint)?
        }
    };

    let finder = DuplicateFinder::new(finder_config, cache, generator);
    let (groups, summary) = finder.find_duplicates(&args.path)?;
    finder.into_cache().close()?;

    let exit_code = if summary.is_partial() {
        ExitCode::PartialSuccess
    } else if groups.is_empty() {
        ExitCode::NoGroups
    } else {
        ExitCode::Success
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match config.output {
        OutputFormat::Text => {
            let color = !config.no_color && io::stdout().is_terminal();
            TextOutput::new(&args.path, &groups)
                .with_file_info(config.print_file_info)
                .with_color(color)
                .write_to(&mut out)?;
            if !cli.quiet {
                let color = !config.no_color && io::stderr().is_terminal();
                output::text::write_summary(&mut io::stderr().lock(), &summary, color)?;
            }
        }
        OutputFormat::Json => {
            JsonOutput::new(&args.path, &groups, &summary, exit_code).write_to(&mut out, true)?;
        }
        OutputFormat::Csv => CsvOutput::new(&args.path, &groups).write_to(&mut out)?,
    }
    out.flush()?;

    Ok(exit_code)
}

fn run_compare(
    args: &CompareArgs,
    config: &Config,
    generator: &dyn FingerprintGenerator,
) -> Result<ExitCode> {
    config
        .fingerprint
        .validate()
        .map_err(FinderError::InvalidConfig)?;

    let fingerprint = |path: &Path| {
        generator
            .generate(path, &config.fingerprint)
            .map_err(|source| FinderError::Fingerprint {
                path: path.to_path_buf(),
                source,
            })
    };
    let a = fingerprint(&args.a)?;
    let b = fingerprint(&args.b)?;
    log::debug!(
        "Comparing {} codes against {} codes",
        a.codes.len(),
        b.codes.len()
    );

    let alignment = best_alignment(&a.codes, &b.codes, config.match_min_length);
    let stdout = io::stdout();
    output::text::write_comparison(&mut stdout.lock(), &args.a, &args.b, &alignment)?;
    Ok(ExitCode::Success)
}

fn run_exclude(args: &ExcludeArgs, config: &Config) -> Result<ExitCode> {
    config
        .fingerprint
        .validate()
        .map_err(FinderError::InvalidConfig)?;

    let Some(path) = config.resolved_cache_path() else {
        return Err(FinderError::InvalidConfig(
            "excluding pairs needs a persistent cache (--cache PATH)".to_string(),
        )
        .into());
    };
    let cache = FingerprintCache::open(&path, &config.fingerprint)
        .with_context(|| format!("Failed to open cache {}", path.display()))?;

    let keys: Vec<String> = args
        .paths
        .iter()
        .map(|p| normalize_path_str(p.trim_start_matches("./")))
        .collect();
    for key in &keys {
        if cache.get_by_path(key)?.is_none() {
            log::warn!("{key} is not in the cache; it is excluded anyway");
        }
    }

    let mut pairs = 0usize;
    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            if a == b {
                continue;
            }
            cache.save_excluded_pair(a, b)?;
            pairs += 1;
        }
    }
    cache.close()?;

    log::info!("Excluded {pairs} pair(s) in {}", path.display());
    Ok(ExitCode::Success)
}
