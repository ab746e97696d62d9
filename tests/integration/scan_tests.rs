use std::fs;

use echodupe::duplicates::AudioGroup;
use tempfile::tempdir;

use super::common::{
    codes, file_finder, memory_finder, test_config, two_track_library, write_fixture,
    FixtureGenerator, TRACK_LEN,
};

fn group_paths(groups: &[AudioGroup]) -> Vec<Vec<String>> {
    groups
        .iter()
        .map(|g| g.files.iter().map(|f| f.path.clone()).collect())
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = memory_finder(test_config(), FixtureGenerator::new());

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.groups, 0);
    assert!(!summary.is_partial());
}

#[test]
fn test_two_tracks_three_renditions_form_two_groups() {
    let dir = tempdir().unwrap();
    two_track_library(dir.path());

    let generator = FixtureGenerator::new();
    let finder = memory_finder(test_config(), generator.clone());
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(
        group_paths(&groups),
        vec![
            vec!["one.flac", "one.mp3", "one_padded.ogg"],
            vec!["two.flac", "two.mp3", "two_padded.ogg"],
        ]
    );
    assert_eq!(summary.total_files, 6);
    assert_eq!(summary.fingerprinted_files, 6);
    assert_eq!(summary.groups, 2);
    assert_eq!(summary.grouped_files, 6);
    assert_eq!(summary.matches, 6);
    assert_eq!(generator.calls(), 6);
}

#[test]
fn test_unrelated_tracks_are_not_grouped() {
    let dir = tempdir().unwrap();
    for seed in 1..=5 {
        write_fixture(dir.path(), &format!("{seed}.mp3"), &codes(seed, TRACK_LEN));
    }

    let finder = memory_finder(test_config(), FixtureGenerator::new());
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 5);
    assert_eq!(summary.matches, 0);
}

#[test]
fn test_non_audio_files_are_not_scanned() {
    let dir = tempdir().unwrap();
    two_track_library(dir.path());
    let track = codes(11, TRACK_LEN);
    write_fixture(dir.path(), "cover.jpg", &track);
    write_fixture(dir.path(), "notes.txt", &track);

    let generator = FixtureGenerator::new();
    let finder = memory_finder(test_config(), generator.clone());
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 6);
    assert_eq!(generator.calls(), 6);
    assert_eq!(groups.len(), 2);
}

#[test]
fn test_nested_directories_use_relative_keys() {
    let dir = tempdir().unwrap();
    let track = codes(7, TRACK_LEN);
    write_fixture(dir.path(), "artist/album/01.flac", &track);
    write_fixture(dir.path(), "backup/01.mp3", &track);

    let finder = memory_finder(test_config(), FixtureGenerator::new());
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(
        group_paths(&groups),
        vec![vec!["artist/album/01.flac", "backup/01.mp3"]]
    );
}

#[test]
fn test_rescan_reads_fingerprints_from_cache() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    fs::create_dir(&music).unwrap();
    two_track_library(&music);
    let db = dir.path().join("fp.db");

    let generator = FixtureGenerator::new();
    let finder = file_finder(&db, test_config(), generator.clone());
    let (first, _) = finder.find_duplicates(&music).unwrap();
    finder.into_cache().close().unwrap();
    assert_eq!(generator.calls(), 6);

    let finder = file_finder(&db, test_config(), generator.clone());
    let (second, summary) = finder.find_duplicates(&music).unwrap();

    assert_eq!(generator.calls(), 6);
    assert_eq!(summary.cached_files, 6);
    assert_eq!(summary.fingerprinted_files, 0);
    assert_eq!(group_paths(&first), group_paths(&second));
}

#[test]
fn test_cached_fingerprint_wins_over_changed_file() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    let track = codes(3, TRACK_LEN);
    write_fixture(&music, "a.flac", &track);
    write_fixture(&music, "b.flac", &track);
    let db = dir.path().join("fp.db");

    let finder = file_finder(&db, test_config(), FixtureGenerator::new());
    let (groups, _) = finder.find_duplicates(&music).unwrap();
    assert_eq!(groups.len(), 1);
    finder.into_cache().close().unwrap();

    // Records are keyed by path and never refreshed.
    write_fixture(&music, "b.flac", &codes(4, TRACK_LEN));
    let finder = file_finder(&db, test_config(), FixtureGenerator::new());
    let (groups, summary) = finder.find_duplicates(&music).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(summary.cached_files, 2);
}

#[test]
fn test_skip_new_files_only_considers_cached() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    let track = codes(5, TRACK_LEN);
    write_fixture(&music, "a.flac", &track);
    write_fixture(&music, "b.mp3", &track);
    let db = dir.path().join("fp.db");

    let finder = file_finder(&db, test_config(), FixtureGenerator::new());
    finder.find_duplicates(&music).unwrap();
    finder.into_cache().close().unwrap();

    write_fixture(&music, "c.ogg", &track);
    let generator = FixtureGenerator::new();
    let config = test_config().with_skip_new_files(true);
    let finder = file_finder(&db, config, generator.clone());
    let (groups, summary) = finder.find_duplicates(&music).unwrap();

    assert_eq!(generator.calls(), 0);
    assert_eq!(summary.skipped_new_files, 1);
    assert_eq!(group_paths(&groups), vec![vec!["a.flac", "b.mp3"]]);
}

#[test]
fn test_strict_threshold_separates_renditions() {
    let dir = tempdir().unwrap();
    two_track_library(dir.path());

    let finder = memory_finder(
        test_config().with_match_threshold(1.0),
        FixtureGenerator::new(),
    );
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
    assert!(groups.is_empty());

    // Scoring over the shorter length forgives the padding but not the
    // re-encode.
    let finder = memory_finder(
        test_config()
            .with_match_threshold(1.0)
            .with_match_min_length(true),
        FixtureGenerator::new(),
    );
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(
        group_paths(&groups),
        vec![
            vec!["one.flac", "one_padded.ogg"],
            vec!["two.flac", "two_padded.ogg"],
        ]
    );
}

#[test]
fn test_parallel_fingerprinting_matches_inline() {
    let dir = tempdir().unwrap();
    two_track_library(dir.path());
    for seed in 100..120 {
        write_fixture(dir.path(), &format!("x{seed}.wav"), &codes(seed, TRACK_LEN));
    }

    let inline = memory_finder(test_config(), FixtureGenerator::new());
    let (expected, _) = inline.find_duplicates(dir.path()).unwrap();

    let parallel = memory_finder(
        test_config().with_fingerprint_threads(4),
        FixtureGenerator::new(),
    );
    let (actual, summary) = parallel.find_duplicates(dir.path()).unwrap();

    assert_eq!(group_paths(&expected), group_paths(&actual));
    assert_eq!(summary.fingerprinted_files, 26);
}

#[test]
fn test_narrow_index_still_finds_groups() {
    let dir = tempdir().unwrap();
    two_track_library(dir.path());

    for bits in [8, 20, 32] {
        let finder = memory_finder(test_config().with_index_bits(bits), FixtureGenerator::new());
        let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
        assert_eq!(groups.len(), 2, "index bits {bits}");
    }
}
