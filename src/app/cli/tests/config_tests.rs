//! Tests for TOML configuration loading

use crate::app::cli::config::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = ServiceConfig::default();
    assert_eq!(config.broker_addrs, vec!["localhost:9092"]);
    assert_eq!(config.registry_addr, "localhost:2181");
    assert_eq!(config.partitions, 16);
    assert_eq!(config.replications, 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let config = ServiceConfig::from_toml_str(
        r#"
        partitions = 3

        [log]
        level = "debug"
        "#,
        Path::new("inline.toml"),
    )
    .unwrap();

    assert_eq!(config.partitions, 3);
    assert_eq!(config.replications, 2);
    assert_eq!(config.log.level.as_deref(), Some("debug"));
    assert_eq!(config.log.format, None);
}

#[test]
fn test_unknown_key_is_a_parse_error() {
    let err = ServiceConfig::from_toml_str("partitons = 3", Path::new("typo.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("typo.toml"));
}

#[test]
fn test_validate_rejects_unusable_settings() {
    let mut config = ServiceConfig::default();
    config.partitions = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = ServiceConfig::default();
    config.replications = 0;
    assert!(config.validate().is_err());

    let mut config = ServiceConfig::default();
    config.broker_addrs.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_settings_follow_config() {
    let config = ServiceConfig {
        broker_addrs: vec!["b1:9092".to_string(), "b2:9092".to_string()],
        registry_addr: "zk:2181".to_string(),
        partitions: 8,
        replications: 3,
        ..ServiceConfig::default()
    };
    let settings = config.settings();
    assert_eq!(settings.broker_addrs, config.broker_addrs);
    assert_eq!(settings.registry_addr, "zk:2181");
    assert_eq!(settings.partitions, 8);
    assert_eq!(settings.replications, 3);
}

#[tokio::test]
async fn test_discover_explicit_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "broker_addrs = [\"kafka:9092\"]\nstate_file = \"/tmp/qg.json\""
    )
    .unwrap();

    let (config, path) = ServiceConfig::discover(Some(file.path())).await.unwrap();
    assert_eq!(config.broker_addrs, vec!["kafka:9092"]);
    assert_eq!(config.state_file, Some(PathBuf::from("/tmp/qg.json")));
    assert_eq!(path.as_deref(), Some(file.path()));
}

#[tokio::test]
async fn test_discover_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let err = ServiceConfig::discover(Some(&missing)).await.unwrap_err();
    assert!(matches!(err, ConfigError::Missing { .. }));
}

#[test]
fn test_default_path_location() {
    if let Some(path) = ServiceConfig::default_path() {
        assert!(path.ends_with("Queuegate/queuegate.toml"));
    }
}
