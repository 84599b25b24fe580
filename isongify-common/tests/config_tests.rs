//! Unit tests for configuration loading and data file resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate ISONGIFY_DATA_FILE are marked with #[serial]
//! to ensure they run sequentially, not in parallel.

use isongify_common::config::{
    resolve_data_file, write_toml_config, LoggingConfig, TomlConfig, DATA_FILE_ENV,
    DEFAULT_DATA_FILE,
};
use isongify_common::logging::init_tracing;
use isongify_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(DATA_FILE_ENV);

    let path = resolve_data_file(None, None);
    assert_eq!(path, PathBuf::from(DEFAULT_DATA_FILE));
}

#[test]
#[serial]
fn test_resolver_explicit_argument_wins() {
    env::set_var(DATA_FILE_ENV, "/tmp/from-env.csv");
    let toml = TomlConfig {
        data_file: Some(PathBuf::from("/tmp/from-toml.csv")),
        ..TomlConfig::default()
    };

    let path = resolve_data_file(Some(Path::new("/tmp/explicit.csv")), Some(&toml));
    assert_eq!(path, PathBuf::from("/tmp/explicit.csv"));

    env::remove_var(DATA_FILE_ENV);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(DATA_FILE_ENV, "/tmp/from-env.csv");
    let toml = TomlConfig {
        data_file: Some(PathBuf::from("/tmp/from-toml.csv")),
        ..TomlConfig::default()
    };

    let path = resolve_data_file(None, Some(&toml));
    assert_eq!(path, PathBuf::from("/tmp/from-env.csv"));

    env::remove_var(DATA_FILE_ENV);
}

#[test]
#[serial]
fn test_resolver_blank_env_is_ignored() {
    env::set_var(DATA_FILE_ENV, "   ");
    let toml = TomlConfig {
        data_file: Some(PathBuf::from("/tmp/from-toml.csv")),
        ..TomlConfig::default()
    };

    let path = resolve_data_file(None, Some(&toml));
    assert_eq!(path, PathBuf::from("/tmp/from-toml.csv"));

    env::remove_var(DATA_FILE_ENV);
}

#[test]
fn test_load_or_default_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let config = TomlConfig::load_or_default(&missing).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_missing_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let result = TomlConfig::load(&missing);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_malformed_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("bad.toml");
    std::fs::write(&target, "top_k = [not valid").unwrap();

    let result = TomlConfig::load_or_default(&target);
    assert!(matches!(result, Err(Error::TomlParse(_))));
}

#[test]
fn test_write_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("config.toml");

    let config = TomlConfig {
        data_file: Some(PathBuf::from("/music/songs.csv")),
        top_k: 10,
        logging: LoggingConfig {
            level: "debug".to_string(),
            file: None,
        },
    };

    write_toml_config(&config, &target).unwrap();

    assert!(target.exists());
    assert!(!temp_dir.path().join("config.toml.tmp").exists());

    let loaded = TomlConfig::load(&target).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_init_tracing_to_file_is_repeatable() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("isongify.log");

    let config = LoggingConfig {
        level: "debug".to_string(),
        file: Some(log_file.clone()),
    };

    init_tracing(&config).unwrap();
    // Second call must not panic even though a subscriber is installed
    assert!(!init_tracing(&config).unwrap());
    assert!(log_file.exists());
}
