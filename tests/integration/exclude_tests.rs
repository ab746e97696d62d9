use std::path::Path;

use clap::Parser;
use echodupe::cache::FingerprintCache;
use echodupe::cli::Cli;
use echodupe::error::ExitCode;
use echodupe::fingerprint::FingerprintSettings;
use tempfile::tempdir;

use super::common::{file_finder, test_config, two_track_library, FixtureGenerator};

fn run(dir: &Path, args: &[&str]) -> anyhow::Result<ExitCode> {
    let config = dir.join("missing-config.toml");
    let mut argv = vec!["echodupe", "-q", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    echodupe::run_with_generator(cli, FixtureGenerator::new())
}

#[test]
fn test_exclude_records_every_pair() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let db_arg = db.to_str().unwrap();

    let code = run(
        dir.path(),
        &["exclude", "--cache", db_arg, "a.mp3", "./b.mp3", "c.mp3"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let cache = FingerprintCache::open(&db, &FingerprintSettings::default()).unwrap();
    assert_eq!(cache.excluded_pairs().unwrap().len(), 3);
    assert!(cache.is_excluded_pair("c.mp3", "b.mp3").unwrap());
    assert!(cache.is_excluded_pair("a.mp3", "c.mp3").unwrap());
}

#[test]
fn test_excluded_pairs_are_not_linked() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    two_track_library(&music);
    let db = dir.path().join("fp.db");
    let db_arg = db.to_str().unwrap();

    run(
        dir.path(),
        &["exclude", "--cache", db_arg, "one.flac", "one.mp3", "one_padded.ogg"],
    )
    .unwrap();

    let finder = file_finder(&db, test_config(), FixtureGenerator::new());
    let (groups, summary) = finder.find_duplicates(&music).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].first_path(), "two.flac");
    assert_eq!(summary.excluded_pairs, 3);
}

#[test]
fn test_partial_exclusion_keeps_transitive_group() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    two_track_library(&music);
    let db = dir.path().join("fp.db");
    let db_arg = db.to_str().unwrap();

    // one.flac and one.mp3 are still connected through one_padded.ogg.
    run(dir.path(), &["exclude", "--cache", db_arg, "one.flac", "one.mp3"]).unwrap();

    let finder = file_finder(&db, test_config(), FixtureGenerator::new());
    let (groups, summary) = finder.find_duplicates(&music).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(summary.excluded_pairs, 1);
    assert_eq!(summary.matches, 5);
}

#[test]
fn test_exclude_with_mismatched_settings_is_config_error() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    FingerprintCache::open(&db, &FingerprintSettings::default())
        .unwrap()
        .close()
        .unwrap();

    let err = run(
        dir.path(),
        &[
            "exclude",
            "--cache",
            db.to_str().unwrap(),
            "--length",
            "60",
            "a.mp3",
            "b.mp3",
        ],
    )
    .unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidConfig);
}
