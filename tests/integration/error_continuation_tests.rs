use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use echodupe::cache::FingerprintCache;
use echodupe::duplicates::{DuplicateFinder, FinderError};
use echodupe::error::ExitCode;
use echodupe::fingerprint::FingerprintError;
use tempfile::tempdir;

use super::common::{codes, memory_finder, test_config, write_fixture, FixtureGenerator, TRACK_LEN};

/// a.flac and c.flac match; b.flac is corrupt and d.flac too short.
fn library_with_bad_files(root: &std::path::Path) {
    let track = codes(9, TRACK_LEN);
    write_fixture(root, "a.flac", &track);
    fs::write(root.join("b.flac"), b"not fpcalc output").unwrap();
    write_fixture(root, "c.flac", &track);
    write_fixture(root, "d.flac", &[]);
}

#[test]
fn test_bad_file_aborts_by_default() {
    let dir = tempdir().unwrap();
    library_with_bad_files(dir.path());

    let finder = memory_finder(test_config(), FixtureGenerator::new());
    let err = finder.find_duplicates(dir.path()).unwrap_err();

    match err {
        FinderError::Fingerprint { path, source } => {
            assert!(path.ends_with("b.flac"));
            assert!(matches!(source, FingerprintError::Parse { .. }));
        }
        other => panic!("Expected Fingerprint error, got: {other:?}"),
    }
}

#[test]
fn test_abort_keeps_earlier_fingerprints_cached() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    fs::create_dir(&music).unwrap();
    library_with_bad_files(&music);
    let db = dir.path().join("fp.db");

    let config = test_config();
    let cache = FingerprintCache::open(&db, &config.settings).unwrap();
    let finder = DuplicateFinder::new(config, cache, FixtureGenerator::new());
    assert!(finder.find_duplicates(&music).is_err());

    let cache = finder.into_cache();
    assert_eq!(cache.file_count().unwrap(), 1);
    assert!(cache.get_by_path("a.flac").unwrap().is_some());
}

#[test]
fn test_skip_bad_files_continues() {
    let dir = tempdir().unwrap();
    library_with_bad_files(dir.path());

    let finder = memory_finder(
        test_config().with_skip_bad_files(true),
        FixtureGenerator::new(),
    );
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.fingerprinted_files, 2);
    let skipped: Vec<&str> = summary
        .skipped_files
        .iter()
        .map(|s| s.path.as_str())
        .collect();
    assert_eq!(skipped, vec!["b.flac", "d.flac"]);
    assert!(summary.is_partial());
}

#[test]
fn test_empty_fingerprint_aborts_without_skip() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path(), "short.wav", &[]);

    let finder = memory_finder(test_config(), FixtureGenerator::new());
    match finder.find_duplicates(dir.path()).unwrap_err() {
        FinderError::Fingerprint { source, .. } => assert!(source.is_empty_fingerprint()),
        other => panic!("Expected empty fingerprint, got: {other:?}"),
    }
}

#[test]
fn test_shutdown_flag_interrupts_scan() {
    let dir = tempdir().unwrap();
    library_with_bad_files(dir.path());

    let flag = Arc::new(AtomicBool::new(true));
    let finder = memory_finder(test_config().with_shutdown_flag(flag), FixtureGenerator::new());
    let err = finder.find_duplicates(dir.path()).unwrap_err();

    assert!(matches!(err, FinderError::Interrupted));
    assert_eq!(
        ExitCode::for_error(&anyhow::Error::new(err)),
        ExitCode::Interrupted
    );
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_partial() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let track = codes(9, TRACK_LEN);
    write_fixture(dir.path(), "a.flac", &track);
    write_fixture(dir.path(), "b.flac", &track);
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    write_fixture(&locked, "c.flac", &track);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permissions, so only check when the directory is really
    // unreadable.
    let unreadable = fs::read_dir(&locked).is_err();
    let finder = memory_finder(test_config(), FixtureGenerator::new());
    let result = finder.find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (groups, summary) = result.unwrap();
    assert_eq!(groups.len(), 1);
    if unreadable {
        assert!(!summary.scan_errors.is_empty());
        assert!(summary.is_partial());
        assert_eq!(groups[0].len(), 2);
    }
}
