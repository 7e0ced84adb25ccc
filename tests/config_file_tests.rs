//! Config file loading tests

use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

use logstream::config::{resolve_config_path, Config, ConfigError};

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("logstream.toml");
    let mut file = File::create(&path).unwrap();
    write!(file, "{}", content).unwrap();
    path
}

#[test]
fn test_load_explicit_file() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"[stream]
endpoint = "http://logs.internal:9000/stream"
capacity = 2000
connect_timeout_secs = 3

[catalog]
base_url = "http://logs.internal:9000"

[logging]
level = "debug"
"#,
    );

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.stream.endpoint, "http://logs.internal:9000/stream");
    assert_eq!(config.stream.capacity, Some(2000));
    assert_eq!(config.stream.connect_timeout().as_secs(), 3);
    assert_eq!(config.catalog.base_url, "http://logs.internal:9000");
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.json);
}

#[test]
fn test_explicit_flag_beats_env() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "");
    let resolved =
        resolve_config_path(Some(path.as_path()), Some(temp.path().join("other.toml"))).unwrap();
    assert_eq!(resolved, Some(path));
}

#[test]
fn test_invalid_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[stream]\ncapacity = 0\n");
    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[stream]\nendpoint = \"http://x\"\nfuture_option = true\n");
    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.stream.endpoint, "http://x");
}

#[test]
fn test_missing_env_file_is_not_found() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent.toml");
    let resolved = resolve_config_path(None, Some(missing.clone())).unwrap();
    assert_eq!(resolved.as_deref(), Some(missing.as_path()));
    assert!(matches!(
        Config::from_file(&missing),
        Err(ConfigError::NotFound(_))
    ));
}
