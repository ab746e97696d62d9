use std::fs;
use std::path::Path;

use echodupe::cli::OutputFormat;
use echodupe::config::Config;
use echodupe::fingerprint::FingerprintSettings;
use tempfile::tempdir;

#[test]
fn test_config_missing_file_gives_defaults() {
    let temp_dir = tempdir().unwrap();
    let config = Config::load_from_path(temp_dir.path().join("absent.toml")).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.lookup_threshold, 0.25);
    assert_eq!(config.match_threshold, 0.95);
    assert_eq!(config.threads, 1);
    assert_eq!(config.log_interval_secs, 10);
    assert!(config.cache_path.is_none());
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let toml_content = r#"
lookup_threshold = 0.3
match_threshold = 0.9
index_bits = 20
skip_bad_files = true
output = "json"
ignore_patterns = ["Podcasts/", "*.part"]
cache_path = "/var/cache/echodupe/fp.db"

[fingerprint]
length = 45.0
overlap = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.lookup_threshold, 0.3);
    assert_eq!(config.match_threshold, 0.9);
    assert_eq!(config.index_bits, 20);
    assert!(config.skip_bad_files);
    assert_eq!(config.output, OutputFormat::Json);
    assert_eq!(config.ignore_patterns, vec!["Podcasts/", "*.part"]);
    assert_eq!(
        config.cache_path.as_deref(),
        Some(Path::new("/var/cache/echodupe/fp.db"))
    );
    assert_eq!(
        config.fingerprint,
        FingerprintSettings {
            length: 45.0,
            overlap: true,
            ..Default::default()
        }
    );
}

#[test]
fn test_config_saved_file_loads_back() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config = Config {
        threads: 4,
        print_file_info: true,
        ..Default::default()
    };
    fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

    assert_eq!(Config::load_from_path(config_path).unwrap(), config);
}

#[test]
fn test_config_invalid_toml_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "invalid = toml").unwrap();

    let err = Config::load_from_path(config_path).unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_config_one_bad_value_rejects_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "match_threshold = 0.5\ncache_path = \"/srv/fp.db\"\nindex_bits = \"sixteen\"\n\n[fingerprint]\nlength = 45.0\n",
    )
    .unwrap();

    // The other settings must not be silently replaced by defaults.
    let err = Config::load(Some(&config_path)).unwrap_err();
    assert!(err.is_configuration_error());
    assert!(err.to_string().contains("index_bits"), "{err}");
}
