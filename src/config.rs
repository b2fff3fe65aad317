//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/nestview/nestview.toml`
//! 3. Local config: `<dir>/.nestview.toml`
//! 4. Environment variables: `NESTVIEW_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::AggregationMode;
use crate::application::ApplicationError;

/// Unified configuration for nestview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Document holding the whole view tree
    pub tree_file: PathBuf,
    /// Job catalog consulted for view status
    pub catalog_file: PathBuf,
    /// Name of the top-level nested view created for an empty tree
    pub root_name: String,
    /// Fail status queries when a job source errors instead of skipping it
    pub strict_status: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            tree_file: data_dir.join("views.toml"),
            catalog_file: data_dir.join("jobs.toml"),
            root_name: "root".to_string(),
            strict_status: false,
        }
    }
}

/// Raw settings for intermediate parsing (None means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tree_file: Option<PathBuf>,
    pub catalog_file: Option<PathBuf>,
    pub root_name: Option<String>,
    pub strict_status: Option<bool>,
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "nestview")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.nestview"))
}

/// Get the XDG config directory for nestview.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "nestview").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("nestview.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".nestview.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`, leaving the input as-is on failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    pub fn aggregation_mode(&self) -> AggregationMode {
        if self.strict_status {
            AggregationMode::Strict
        } else {
            AggregationMode::BestEffort
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.tree_file = PathBuf::from(expand_env_vars(&self.tree_file.to_string_lossy()));
        self.catalog_file = PathBuf::from(expand_env_vars(&self.catalog_file.to_string_lossy()));
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tree_file: overlay
                .tree_file
                .clone()
                .unwrap_or_else(|| self.tree_file.clone()),
            catalog_file: overlay
                .catalog_file
                .clone()
                .unwrap_or_else(|| self.catalog_file.clone()),
            root_name: overlay
                .root_name
                .clone()
                .unwrap_or_else(|| self.root_name.clone()),
            strict_status: overlay.strict_status.unwrap_or(self.strict_status),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.nestview.toml`
    ///
    /// Relative paths in a local config are resolved against `local_dir`.
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                raw.tree_file = raw.tree_file.map(|p| dir.join(p));
                raw.catalog_file = raw.catalog_file.map(|p| dir.join(p));
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply NESTVIEW_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("NESTVIEW")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("tree_file") {
            settings.tree_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("catalog_file") {
            settings.catalog_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("root_name") {
            settings.root_name = val;
        }
        if let Ok(val) = config.get_bool("strict_status") {
            settings.strict_status = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# nestview configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/nestview/nestview.toml
#   Local:  <dir>/.nestview.toml   (relative paths resolve against <dir>)
#   Env:    NESTVIEW_* environment variables

# Document holding the view tree
# tree_file = "~/.local/share/nestview/views.toml"

# Job catalog used for status
# catalog_file = "~/.local/share/nestview/jobs.toml"

# Name of the top-level view of a new tree
# root_name = "root"

# Fail status queries on job source errors instead of skipping the view
# strict_status = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_files_share_data_dir() {
        let settings = Settings::default();
        assert_eq!(settings.tree_file.parent(), settings.catalog_file.parent());
        assert_eq!(settings.root_name, "root");
        assert_eq!(settings.aggregation_mode(), AggregationMode::BestEffort);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            strict_status: Some(true),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert!(merged.strict_status);
        assert_eq!(merged.tree_file, base.tree_file);
        assert_eq!(merged.root_name, base.root_name);
    }

    #[test]
    fn given_tilde_in_paths_when_expanding_then_uses_home() {
        let mut settings = Settings {
            tree_file: PathBuf::from("~/views.toml"),
            catalog_file: PathBuf::from("$HOME/jobs.toml"),
            ..Default::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.tree_file.starts_with(&home));
        assert!(settings.catalog_file.starts_with(&home));
    }

    #[test]
    fn given_template_when_parsing_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.tree_file.is_none());
    }
}
