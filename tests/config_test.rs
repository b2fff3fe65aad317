//! Integration tests for Settings loading with layered precedence.
//!
//! Precedence: defaults < global < local `.nestview.toml` < `NESTVIEW_*` env.
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use nestview::application::services::AggregationMode;
use nestview::config::{local_config_path, Settings};

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.tree_file, Settings::default().tree_file);
    assert!(!settings.strict_status);
}

#[test]
fn given_local_config_with_relative_paths_when_load_then_resolved_against_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
tree_file = "views.toml"
catalog_file = "state/jobs.toml"
strict_status = true
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.tree_file, dir.path().join("views.toml"));
    assert_eq!(settings.catalog_file, dir.path().join("state/jobs.toml"));
    assert_eq!(settings.aggregation_mode(), AggregationMode::Strict);
}

#[test]
fn given_local_config_with_absolute_path_when_load_then_kept() {
    let dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let absolute = elsewhere.path().join("views.toml");
    fs::write(
        local_config_path(dir.path()),
        format!("tree_file = \"{}\"\n", absolute.display()),
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.tree_file, absolute);
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "strict_status = \"maybe\"\n").unwrap();

    let result = Settings::load(Some(dir.path()));

    let err = result.unwrap_err().to_string();
    assert!(err.contains("config error"), "{err}");
}

#[test]
fn given_env_override_when_load_then_env_wins_over_local() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "root_name = \"local\"\n").unwrap();
    std::env::set_var("NESTVIEW_ROOT_NAME", "from-env");

    let settings = Settings::load(Some(dir.path())).expect("load settings");
    std::env::remove_var("NESTVIEW_ROOT_NAME");

    assert_eq!(settings.root_name, "from-env");
}

#[test]
fn given_settings_when_rendering_toml_then_roundtrips() {
    let settings = Settings {
        tree_file: PathBuf::from("/tmp/views.toml"),
        catalog_file: PathBuf::from("/tmp/jobs.toml"),
        root_name: "ci".to_string(),
        strict_status: true,
    };

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed, settings);
}
