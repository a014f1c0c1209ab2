//! Implementation of `swcraft service-worker`.
//!
//! Runs the four steps in order against one tree:
//! 1. enable the worker in the build target
//! 2. add the worker package to package.json
//! 3. register the worker in the root module
//! 4. generate ngsw-config.json
//!
//! Step 4 reads the path written by step 1, so the order is fixed.

use anyhow::{Context, Result};
use serde::Serialize;

use super::bootstrap::{register_service_worker, BootstrapReport};
use super::build_config::{patch_build_config, BuildConfigReport};
use super::dependency::{add_worker_dependency, DependencyReport};
use super::ngsw_config::{generate_ngsw_config, NgswConfigReport};
use crate::core::tree::{FileChange, StagedTree, Tree};

/// Build target used when none is given.
pub const DEFAULT_TARGET: &str = "build";

/// Options for adding a service worker.
#[derive(Debug, Clone)]
pub struct ServiceWorkerOptions {
    /// Project name
    pub project: String,

    /// Build target to enable the worker in
    pub target: String,

    /// Replace an existing ngsw-config.json
    pub overwrite_config: bool,
}

impl ServiceWorkerOptions {
    /// Options for `project` with the default target.
    pub fn new(project: impl Into<String>) -> Self {
        ServiceWorkerOptions {
            project: project.into(),
            target: DEFAULT_TARGET.to_string(),
            overwrite_config: false,
        }
    }
}

/// Combined result of all steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceWorkerReport {
    pub project: String,
    pub target: String,
    pub build_config: BuildConfigReport,
    pub dependency: DependencyReport,
    pub bootstrap: BootstrapReport,
    pub ngsw_config: NgswConfigReport,
}

impl ServiceWorkerReport {
    /// Whether the package manager has to run afterwards.
    pub fn needs_install(&self) -> bool {
        self.dependency.needs_install()
    }
}

/// Add a service worker to a project, writing straight into `tree`.
///
/// A failing step leaves the writes of earlier steps in place; use
/// [`add_service_worker_staged`] when the tree must stay untouched.
pub fn add_service_worker<T: Tree + ?Sized>(
    tree: &mut T,
    opts: &ServiceWorkerOptions,
) -> Result<ServiceWorkerReport> {
    let project = opts.project.as_str();
    let target = opts.target.as_str();

    tracing::debug!("adding service worker to {}:{}", project, target);

    let build_config = patch_build_config(tree, project, target)
        .with_context(|| format!("failed to update the `{}` target of `{}`", target, project))?;
    let dependency = add_worker_dependency(tree).context("failed to update package.json")?;
    let bootstrap = register_service_worker(tree, project, target)
        .with_context(|| format!("failed to register the service worker in `{}`", project))?;
    let ngsw_config = generate_ngsw_config(tree, project, target, opts.overwrite_config)
        .context("failed to generate the service worker configuration")?;

    Ok(ServiceWorkerReport {
        project: project.to_string(),
        target: target.to_string(),
        build_config,
        dependency,
        bootstrap,
        ngsw_config,
    })
}

/// Result of a staged run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedRun {
    pub report: ServiceWorkerReport,
    /// Files that changed, or would change for a dry run.
    pub changes: Vec<FileChange>,
    pub committed: bool,
}

/// Add a service worker through a staging overlay.
///
/// Nothing reaches `base` unless every step succeeds. With `dry_run`
/// nothing reaches it at all and the pending changes are returned.
pub fn add_service_worker_staged<T: Tree + ?Sized>(
    base: &mut T,
    opts: &ServiceWorkerOptions,
    dry_run: bool,
) -> Result<StagedRun> {
    let mut staged = StagedTree::new(base);
    let report = add_service_worker(&mut staged, opts)?;

    if dry_run {
        let changes = staged.changes();
        tracing::info!("dry run: {} file(s) would change", changes.len());
        return Ok(StagedRun {
            report,
            changes,
            committed: false,
        });
    }

    let changes = staged.commit()?;
    tracing::info!("{} file(s) changed", changes.len());
    Ok(StagedRun {
        report,
        changes,
        committed: true,
    })
}
