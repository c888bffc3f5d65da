//! Integration tests for configuration loading and saving

use quire_core::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_save_and_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("quire.toml");

    let mut config = QuireConfig::default();
    config.general_mut().log_level = "debug".to_string();
    config.resource_mut().event_capacity = 32;
    config.resource_mut().untitled_extension = Some(".md".to_string());

    config.save_to_path(&path).await.unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("toml.tmp").exists());

    let loaded = QuireConfig::load_from_path(&path).await.unwrap();
    assert_eq!(loaded.general().log_level, "debug");
    assert_eq!(loaded.resource().event_capacity, 32);
    assert_eq!(loaded.resource().untitled_extension.as_deref(), Some(".md"));
}

#[tokio::test]
async fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = QuireConfig::load_from_path(&temp_dir.path().join("missing.toml")).await;
    assert!(matches!(result, Err(ResourceError::Config(_))));
}

#[tokio::test]
async fn test_load_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("quire.toml");
    tokio::fs::write(&path, "[resource]\ndefault_encoding = \"ebcdic\"\n")
        .await
        .unwrap();

    let result = QuireConfig::load_from_path(&path).await;
    assert!(matches!(result, Err(ResourceError::Config(_))));
}

#[tokio::test]
async fn test_save_refuses_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("quire.toml");

    let mut config = QuireConfig::default();
    config.resource_mut().event_capacity = 0;

    assert!(config.save_to_path(&path).await.is_err());
    assert!(!path.exists());
}

#[test]
fn test_malformed_toml() {
    let result = QuireConfig::from_toml_str("[general\nlog_level = ");
    assert!(matches!(result, Err(ResourceError::Config(_))));
}
