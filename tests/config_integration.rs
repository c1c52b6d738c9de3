//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;
use trialgen::config::{AppConfig, ConfigError};

#[test]
#[serial]
fn test_repository_defaults_load() {
    std::env::remove_var("TRIALGEN_OUTPUT__TRIAL_COUNT");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.output.trial_count, 100);
    assert_eq!(config.output.index_width, 4);
    assert_eq!(config.image.pass_masks.len(), 5);
    assert_eq!(config.scenario.name, "drop");
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("TRIALGEN_OUTPUT__TRIAL_COUNT", "7");
    std::env::set_var("TRIALGEN_SCENARIO__SEED", "42");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("TRIALGEN_OUTPUT__TRIAL_COUNT");
    std::env::remove_var("TRIALGEN_SCENARIO__SEED");

    assert_eq!(config.output.trial_count, 7);
    assert_eq!(config.scenario.seed, Some(42));
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        "[output]\ntrial_count = 10\n\n[trial]\nframe_cap = 500\n",
    )
    .unwrap();
    fs::write(dir.path().join("user.toml"), "[trial]\nframe_cap = 250\n").unwrap();

    let config = AppConfig::load_from(dir.path()).unwrap();
    assert_eq!(config.output.trial_count, 10);
    assert_eq!(config.trial.frame_cap, 250);
    // untouched sections keep their defaults
    assert_eq!(config.engine.address, "127.0.0.1:1071");
}

#[test]
#[serial]
fn test_missing_directory_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::load_from(dir.path().join("nope")).unwrap();
    assert_eq!(config.output.file_extension, "zip");
    assert_eq!(config.debug.log_level, "info");
}

#[test]
#[serial]
fn test_malformed_value_is_load_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("default.toml"), "[output]\ntrial_count = \"many\"\n").unwrap();
    let err = AppConfig::load_from(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
#[serial]
fn test_temp_path_must_not_look_like_trial() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("user.toml"),
        "[output]\nroot_dir = \"out\"\ntemp_path = \"out/temp.zip\"\n",
    )
    .unwrap();
    let config = AppConfig::load_from(dir.path()).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}
