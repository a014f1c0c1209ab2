//! Enables the service worker in a project's build target.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::core::error::TransformError;
use crate::core::project_root::ProjectRoot;
use crate::core::tree::Tree;
use crate::core::workspace::WorkspaceConfig;

/// File name of the generated service worker configuration.
pub const NGSW_CONFIG_FILE: &str = "ngsw-config.json";

/// Where the service worker configuration of a project lives.
///
/// Both the build option written here and the file generated by
/// [`crate::ops::ngsw_config`] come from this function.
pub fn ngsw_config_path(root: &ProjectRoot) -> String {
    root.join(NGSW_CONFIG_FILE)
}

/// Result of patching the build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfigReport {
    /// Workspace configuration file that was patched.
    pub workspace_file: String,
    /// Value written to `ngswConfigPath`.
    pub ngsw_config_path: String,
    /// Whether the options already held these values.
    pub unchanged: bool,
}

/// Set `serviceWorker` and `ngswConfigPath` on `projects.<project>.architect.<target>.options`.
pub fn patch_build_config<T: Tree + ?Sized>(
    tree: &mut T,
    project: &str,
    target: &str,
) -> Result<BuildConfigReport> {
    let mut workspace = WorkspaceConfig::load(tree)?;

    let view = workspace.project(project)?;
    if let Some(project_type) = view.project_type() {
        if project_type != "application" {
            return Err(TransformError::UnsupportedProject {
                project: project.to_string(),
                project_type: project_type.to_string(),
            }
            .into());
        }
    }
    let config_path = ngsw_config_path(&view.root());
    let previous = view.target_options(target)?;
    let unchanged = previous.service_worker() == Some(true)
        && previous.ngsw_config_path() == Some(config_path.as_str());

    let mut changed = workspace.set_target_option(project, target, "serviceWorker", Value::Bool(true))?;
    changed |= workspace.set_target_option(
        project,
        target,
        "ngswConfigPath",
        Value::String(config_path.clone()),
    )?;
    if changed {
        workspace.save(tree)?;
    }

    tracing::info!(
        "enabled service worker for {}:{} ({})",
        project,
        target,
        config_path
    );

    Ok(BuildConfigReport {
        workspace_file: workspace.path().to_string(),
        ngsw_config_path: config_path,
        unchanged,
    })
}
