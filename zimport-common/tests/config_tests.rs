//! Unit tests for configuration loading and resolution
//!
//! Covers:
//! - Missing default TOML does not fail, compiled defaults apply
//! - Explicit TOML must exist and parse
//! - CLI → ENV → TOML → default priority for paths
//! - Whitelist overrides
//!
//! Tests that manipulate ZIMPORT_* environment variables are marked #[serial]
//! so they never race each other.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use zimport_common::config::{
    load_config, load_toml_config, CliOverrides, CompiledDefaults, ImportSettings, TomlConfig,
    ENV_BASE_URL, ENV_EXTENSIONS, ENV_MEDIA_TYPES, ENV_STORAGE_DIR, ENV_TEMP_DIR,
};

fn clear_env() {
    for name in [ENV_TEMP_DIR, ENV_STORAGE_DIR, ENV_BASE_URL, ENV_MEDIA_TYPES, ENV_EXTENSIONS] {
        env::remove_var(name);
    }
}

#[test]
fn test_compiled_defaults_are_populated() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(defaults.temp_dir.ends_with("zimport"));
    assert!(!defaults.storage_dir.as_os_str().is_empty());
    assert!(defaults.media_type_whitelist.iter().any(|t| t == "image/jpeg"));
    assert!(defaults.extension_whitelist.iter().any(|e| e == "png"));
    assert_eq!(defaults.rows_per_batch, 20);
}

#[test]
#[serial]
fn test_resolve_without_overrides_uses_defaults() {
    clear_env();

    let settings = ImportSettings::resolve(&CliOverrides::default(), &TomlConfig::default());
    let defaults = CompiledDefaults::for_current_platform();

    assert_eq!(settings.temp_dir, defaults.temp_dir);
    assert_eq!(settings.storage_dir, defaults.storage_dir);
    assert_eq!(settings.media_type_whitelist, defaults.media_type_whitelist);
    assert_eq!(settings.logging.level, "info");
}

#[test]
#[serial]
fn test_toml_overrides_defaults() {
    clear_env();

    let toml_config: TomlConfig = toml::from_str(
        r#"
        temp_dir = "/srv/zimport/tmp"
        base_url = "https://media.example.org/files/"
        extension_whitelist = ["jpg", "tif"]
        rows_per_batch = 5

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let settings = ImportSettings::resolve(&CliOverrides::default(), &toml_config);

    assert_eq!(settings.temp_dir, PathBuf::from("/srv/zimport/tmp"));
    assert_eq!(settings.base_url, "https://media.example.org/files");
    assert_eq!(settings.extension_whitelist, vec!["jpg", "tif"]);
    assert_eq!(settings.rows_per_batch, 5);
    assert_eq!(settings.logging.level, "debug");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_TEMP_DIR, "/tmp/zimport-env");
    env::set_var(ENV_MEDIA_TYPES, "image/png, image/gif,");

    let toml_config = TomlConfig {
        temp_dir: Some(PathBuf::from("/srv/zimport/tmp")),
        media_type_whitelist: Some(vec!["image/jpeg".to_string()]),
        ..Default::default()
    };

    let settings = ImportSettings::resolve(&CliOverrides::default(), &toml_config);

    assert_eq!(settings.temp_dir, PathBuf::from("/tmp/zimport-env"));
    assert_eq!(settings.media_type_whitelist, vec!["image/png", "image/gif"]);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_TEMP_DIR, "/tmp/zimport-env");

    let cli = CliOverrides {
        temp_dir: Some(PathBuf::from("/tmp/zimport-cli")),
        ..Default::default()
    };

    let settings = ImportSettings::resolve(&cli, &TomlConfig::default());
    assert_eq!(settings.temp_dir, PathBuf::from("/tmp/zimport-cli"));

    clear_env();
}

#[test]
#[serial]
fn test_zero_batch_size_falls_back_to_default() {
    clear_env();

    let toml_config = TomlConfig {
        rows_per_batch: Some(0),
        ..Default::default()
    };

    let settings = ImportSettings::resolve(&CliOverrides::default(), &toml_config);
    assert_eq!(settings.rows_per_batch, 20);
}

#[test]
fn test_explicit_config_file_must_exist() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.toml");

    assert!(load_config(Some(&missing)).is_err());
}

#[test]
fn test_explicit_config_file_is_parsed() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "storage_dir = \"/srv/zimport/files\"\n").unwrap();

    let loaded = load_config(Some(&path)).unwrap();
    assert_eq!(loaded.config.storage_dir, Some(PathBuf::from("/srv/zimport/files")));
    assert_eq!(loaded.source, Some(path));
}

#[test]
fn test_malformed_toml_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "temp_dir = [unterminated").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(matches!(err, zimport_common::Error::Config(_)));
    assert!(err.to_string().starts_with("Configuration error: Parse TOML"));
}
