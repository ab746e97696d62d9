use echodupe::cache::{CacheError, FingerprintCache, NewFileRecord, SETTINGS_VERSION};
use echodupe::fingerprint::FingerprintSettings;
use tempfile::tempdir;

use super::common::codes;

fn record(path: &str, seed: u32) -> NewFileRecord {
    NewFileRecord {
        path: path.to_string(),
        size: 4_096 + u64::from(seed),
        duration: 187.25,
        fingerprint: codes(seed, 64),
    }
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("nested").join("fp.db");
    let settings = FingerprintSettings::default();

    let cache = FingerprintCache::open(&db, &settings).unwrap();
    let a = cache.save(&record("a.mp3", 1)).unwrap();
    let b = cache.save(&record("dir/ünïcode.flac", 2)).unwrap();
    cache.close().unwrap();

    let cache = FingerprintCache::open(&db, &settings).unwrap();
    assert_eq!(cache.file_count().unwrap(), 2);
    assert_eq!(cache.settings().version, SETTINGS_VERSION);

    let by_path = cache.get_by_path("dir/ünïcode.flac").unwrap().unwrap();
    let by_id = cache.get_by_id(b).unwrap().unwrap();
    assert_eq!(by_path.id, b);
    assert_eq!(by_path.fingerprint, codes(2, 64));
    assert_eq!(by_path.size, 4_098);
    assert_eq!(by_path.duration, 187.25);
    assert_eq!(by_id.path, by_path.path);
    assert_eq!(by_id.fingerprint, by_path.fingerprint);

    assert_eq!(cache.path_of(a).unwrap(), "a.mp3");
    assert!(cache.get_by_path("missing.mp3").unwrap().is_none());
}

#[test]
fn test_reopen_with_other_settings_fails() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");

    let cache = FingerprintCache::open(&db, &FingerprintSettings::default()).unwrap();
    cache.save(&record("a.mp3", 1)).unwrap();
    cache.close().unwrap();

    let other = FingerprintSettings {
        length: 120.0,
        ..Default::default()
    };
    let err = FingerprintCache::open(&db, &other).unwrap_err();
    assert!(matches!(err, CacheError::SettingsMismatch { .. }));
    assert!(err.is_configuration_error());
    let message = err.to_string();
    assert!(message.contains("length=15.000"), "{message}");
    assert!(message.contains("length=120.000"), "{message}");

    // The original settings still work and the data is intact.
    let cache = FingerprintCache::open(&db, &FingerprintSettings::default()).unwrap();
    assert_eq!(cache.file_count().unwrap(), 1);
}

#[test]
fn test_sub_millisecond_setting_changes_are_equal() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");

    FingerprintCache::open(&db, &FingerprintSettings::default())
        .unwrap()
        .close()
        .unwrap();
    let nearly = FingerprintSettings {
        length: 15.0001,
        ..Default::default()
    };
    assert!(FingerprintCache::open(&db, &nearly).is_ok());
}

#[test]
fn test_excluded_pairs_persist() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let settings = FingerprintSettings::default();

    let cache = FingerprintCache::open(&db, &settings).unwrap();
    cache.save_excluded_pair("b.mp3", "a.mp3").unwrap();
    cache.save_excluded_pair("a.mp3", "b.mp3").unwrap();
    cache.close().unwrap();

    let cache = FingerprintCache::open(&db, &settings).unwrap();
    assert!(cache.is_excluded_pair("a.mp3", "b.mp3").unwrap());
    assert!(cache.is_excluded_pair("b.mp3", "a.mp3").unwrap());
    assert!(!cache.is_excluded_pair("a.mp3", "c.mp3").unwrap());
    assert_eq!(
        cache.excluded_pairs().unwrap(),
        vec![("a.mp3".to_string(), "b.mp3".to_string())]
    );
}

#[test]
fn test_garbage_file_is_rejected() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    std::fs::write(&db, b"this is not a database, just some bytes").unwrap();

    let err = FingerprintCache::open(&db, &FingerprintSettings::default()).unwrap_err();
    assert!(matches!(err, CacheError::Database(_)));
}
