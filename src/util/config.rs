//! Configuration file support for swcraft.
//!
//! swcraft supports two configuration file locations:
//! - Global: `~/.swcraft/config.toml` - User-wide defaults
//! - Workspace: `.swcraft/config.toml` - Workspace-specific overrides
//!
//! Workspace config takes precedence over global config. Command-line
//! flags and environment variables take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Directory holding configuration, both globally and per workspace.
pub const CONFIG_DIR: &str = ".swcraft";

/// swcraft configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for command arguments
    pub defaults: DefaultsConfig,

    /// ngsw-config.json generation
    pub manifest: ManifestConfig,
}

/// Defaults used when `--project` / `--target` are not given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Project to add the service worker to
    pub project: Option<String>,

    /// Build target to enable the service worker in
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Replace an existing ngsw-config.json
    pub overwrite: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.defaults.project.is_some() {
            self.defaults.project = other.defaults.project;
        }
        if other.defaults.target.is_some() {
            self.defaults.target = other.defaults.target;
        }
        if other.manifest.overwrite.is_some() {
            self.manifest.overwrite = other.manifest.overwrite;
        }
    }

    /// Whether an existing ngsw-config.json should be replaced.
    pub fn overwrite_manifest(&self) -> bool {
        self.manifest.overwrite.unwrap_or(false)
    }
}

/// Load merged configuration from global and workspace locations.
///
/// Order of precedence (highest to lowest):
/// 1. Workspace config (.swcraft/config.toml)
/// 2. Global config (~/.swcraft/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, workspace_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(workspace_path));

    config
}

/// Get the global swcraft config directory (~/.swcraft).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.swcraft/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the workspace config path (.swcraft/config.toml).
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(CONFIG_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.defaults.project.is_none());
        assert!(config.defaults.target.is_none());
        assert!(!config.overwrite_manifest());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[defaults]
project = "bar"
target = "build"

[manifest]
overwrite = true
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.defaults.project, Some("bar".to_string()));
        assert_eq!(config.defaults.target, Some("build".to_string()));
        assert!(config.overwrite_manifest());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.defaults.project = Some("bar".to_string());
        base.defaults.target = Some("build".to_string());
        base.manifest.overwrite = Some(true);

        let mut override_cfg = Config::default();
        override_cfg.defaults.target = Some("build-pwa".to_string());
        override_cfg.manifest.overwrite = Some(false);

        base.merge(override_cfg);

        assert_eq!(base.defaults.project, Some("bar".to_string())); // Not overridden
        assert_eq!(base.defaults.target, Some("build-pwa".to_string()));
        assert!(!base.overwrite_manifest());
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[defaults\nproject = ").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let workspace_root = tmp.path().join("ws");
        let workspace_path = workspace_config_path(&workspace_root);

        std::fs::write(
            &global_path,
            "[defaults]\nproject = \"shared\"\ntarget = \"build\"\n",
        )
        .unwrap();
        std::fs::create_dir_all(workspace_path.parent().unwrap()).unwrap();
        std::fs::write(&workspace_path, "[defaults]\nproject = \"bar\"\n").unwrap();

        let config = load_config(Some(&global_path), &workspace_path);
        assert_eq!(config.defaults.project, Some("bar".to_string()));
        assert_eq!(config.defaults.target, Some("build".to_string()));
    }

    #[test]
    fn test_workspace_config_path() {
        assert_eq!(
            workspace_config_path(Path::new("/ws")),
            PathBuf::from("/ws/.swcraft/config.toml")
        );
    }
}
