//! Unit tests for configuration loading and validation

use media_ingest::Error;
use media_ingest::config::Config;
use std::path::PathBuf;

#[test]
fn partial_config_keeps_defaults() {
    let config = Config::from_json(
        r#"{
            "service": { "base_url": "https://media.example", "email": "me@example.com" },
            "catalog": { "discard_on_exit": true }
        }"#,
    )
    .unwrap();

    assert_eq!(config.service.base_url, "https://media.example");
    assert!(config.service.password.is_empty());
    assert!(config.catalog.discard_on_exit);
    assert_eq!(config.catalog.path, PathBuf::from("media-catalog.parquet"));
    assert_eq!(config.catalog.remote_base, "memory://remote");
    assert_eq!(config.source.source_type, "desktop");
    assert_eq!(config.source.handle, "local");
}

#[test]
fn source_uses_type_key() {
    let config = Config::from_json(r#"{ "source": { "type": "laptop", "handle": "work" } }"#)
        .unwrap();

    assert_eq!(config.source.source_type, "laptop");
    assert_eq!(config.source.handle, "work");
}

#[test]
fn malformed_json_is_invalid_input() {
    let result = Config::from_json("{ not json");
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn local_validation_needs_catalog_and_source() {
    let mut config = Config::default();
    assert!(config.validate_local().is_ok());

    config.catalog.path = PathBuf::new();
    assert!(matches!(config.validate_local(), Err(Error::InvalidInput(_))));

    let mut config = Config::default();
    config.source.handle.clear();
    assert!(matches!(config.validate_local(), Err(Error::InvalidInput(_))));
}

#[test]
fn remote_validation_needs_credentials() {
    let mut config = Config::default();
    config.service.base_url = "https://media.example".to_string();
    config.service.email = "me@example.com".to_string();
    assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));

    config.service.password = "secret".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn password_is_never_serialized() {
    let mut config = Config::default();
    config.service.password = "secret".to_string();

    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains("secret"));
}

#[test]
fn config_file_round_trip() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("mingest.json");
    std::fs::write(&path, r#"{ "catalog": { "path": "/var/lib/mingest/catalog.parquet" } }"#)
        .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(
        config.catalog.path,
        PathBuf::from("/var/lib/mingest/catalog.parquet")
    );

    let missing = Config::from_file(&temp_dir.path().join("absent.json"));
    assert!(matches!(missing, Err(Error::Io(_))));
}
