//! Global context for swcraft operations.
//!
//! Provides centralized access to the working directory, the workspace
//! root and the merged configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::config::{global_config_path, load_config, workspace_config_path, Config};
use crate::core::error::TransformError;
use crate::core::workspace::{WORKSPACE_FILE, WORKSPACE_FILE_ALIAS};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global config file (~/.swcraft/config.toml), if a home directory exists
    global_config: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext {
            cwd,
            global_config: global_config_path(),
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use a different global config file.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn global_config(&self) -> Option<&Path> {
        self.global_config.as_deref()
    }

    /// Find the workspace root: the nearest directory, starting from cwd
    /// and searching upward, that holds `angular.json` or `.angular.json`.
    pub fn find_workspace_root(&self) -> Result<PathBuf, TransformError> {
        self.cwd
            .ancestors()
            .find(|dir| is_workspace_root(dir))
            .map(Path::to_path_buf)
            .ok_or(TransformError::WorkspaceNotFound)
    }

    /// Merged configuration for a workspace.
    pub fn config(&self, workspace_root: &Path) -> Config {
        load_config(self.global_config(), &workspace_config_path(workspace_root))
    }
}

/// Whether `dir` directly contains a workspace configuration.
pub fn is_workspace_root(dir: &Path) -> bool {
    dir.join(WORKSPACE_FILE).is_file() || dir.join(WORKSPACE_FILE_ALIAS).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
    }

    #[test]
    fn test_find_workspace_root_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("angular.json"), "{}").unwrap();
        let nested = tmp.path().join("projects/bar/src");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_cwd(nested).unwrap();
        assert_eq!(ctx.find_workspace_root().unwrap(), tmp.path());
    }

    #[test]
    fn test_find_workspace_root_hidden_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".angular.json"), "{}").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        assert_eq!(ctx.find_workspace_root().unwrap(), tmp.path());
    }

    #[test]
    fn test_find_workspace_root_missing() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        // A stray angular.json above the temp dir would be found, so only
        // check the error type when nothing is.
        if let Err(err) = ctx.find_workspace_root() {
            assert_eq!(err, TransformError::WorkspaceNotFound);
        }
    }

    #[test]
    fn test_workspace_config_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        std::fs::write(&global, "[defaults]\nproject = \"foo\"\ntarget = \"build\"\n").unwrap();
        std::fs::create_dir_all(tmp.path().join(".swcraft")).unwrap();
        std::fs::write(
            tmp.path().join(".swcraft/config.toml"),
            "[defaults]\nproject = \"bar\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .unwrap()
            .with_global_config(Some(global));
        let config = ctx.config(tmp.path());
        assert_eq!(config.defaults.project.as_deref(), Some("bar"));
        assert_eq!(config.defaults.target.as_deref(), Some("build"));
    }
}
