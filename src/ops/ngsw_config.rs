//! Generates the service worker configuration (`ngsw-config.json`).

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};

use super::build_config::ngsw_config_path;
use crate::core::json::{to_string_with_indent, DEFAULT_INDENT};
use crate::core::project_root::ProjectRoot;
use crate::core::tree::{normalize_path, Tree};
use crate::core::workspace::WorkspaceConfig;

/// Schema location relative to the workspace root.
pub const SCHEMA_PATH: &str = "node_modules/@angular/service-worker/config/schema.json";

/// Extensions of binary assets cached lazily.
pub const ASSET_EXTENSIONS: &str = "svg|cur|jpg|jpeg|png|apng|webp|avif|gif|otf|ttf|woff|woff2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigOutcome {
    Created,
    /// A configuration already existed and was left alone.
    Kept,
    Overwritten,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NgswConfigReport {
    pub path: String,
    pub outcome: ConfigOutcome,
}

/// `$schema` of a project's configuration, relative to the project root.
pub fn schema_reference(root: &ProjectRoot) -> String {
    format!("{}/{}", root.path_to_workspace(), SCHEMA_PATH)
}

/// Glob matching binary assets, under `resources_output_path` if given.
pub fn asset_glob(resources_output_path: Option<&str>) -> String {
    let prefix = resources_output_path
        .map(normalize_path)
        .filter(|path| !path.is_empty())
        .map(|path| format!("/{}", path))
        .unwrap_or_default();
    format!("{}/*.({})", prefix, ASSET_EXTENSIONS)
}

/// Render the configuration document.
pub fn render_ngsw_config(root: &ProjectRoot, resources_output_path: Option<&str>) -> Result<String> {
    let document: Value = json!({
        "$schema": schema_reference(root),
        "index": "/index.html",
        "assetGroups": [
            {
                "name": "app",
                "installMode": "prefetch",
                "resources": {
                    "files": [
                        "/favicon.ico",
                        "/index.html",
                        "/manifest.webmanifest",
                        "/*.css",
                        "/*.js"
                    ]
                }
            },
            {
                "name": "assets",
                "installMode": "lazy",
                "updateMode": "prefetch",
                "resources": {
                    "files": [
                        "/assets/**",
                        asset_glob(resources_output_path)
                    ]
                }
            }
        ]
    });

    let mut text = to_string_with_indent(&document, DEFAULT_INDENT)?;
    text.push('\n');
    Ok(text)
}

/// Write `ngsw-config.json` for `project`.
///
/// An existing file is kept unless `overwrite` is set.
pub fn generate_ngsw_config<T: Tree + ?Sized>(
    tree: &mut T,
    project: &str,
    target: &str,
    overwrite: bool,
) -> Result<NgswConfigReport> {
    let workspace = WorkspaceConfig::load(tree)?;
    let view = workspace.project(project)?;
    let root = view.root();
    let options = view.target_options(target)?;
    let path = ngsw_config_path(&root);

    let existed = tree.exists(&path);
    if existed && !overwrite {
        tracing::info!("keeping existing {}", path);
        return Ok(NgswConfigReport {
            path,
            outcome: ConfigOutcome::Kept,
        });
    }

    tracing::debug!(
        "project root `{}` (depth {}), resources output {:?}",
        root,
        root.depth(),
        options.resources_output_path()
    );
    let text = render_ngsw_config(&root, options.resources_output_path())?;
    tree.write(&path, &text)
        .with_context(|| format!("failed to write {}", path))?;
    tracing::info!("wrote {}", path);

    Ok(NgswConfigReport {
        path,
        outcome: if existed {
            ConfigOutcome::Overwritten
        } else {
            ConfigOutcome::Created
        },
    })
}
