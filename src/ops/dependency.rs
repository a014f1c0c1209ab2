//! Adds the service worker package next to the framework core.

use anyhow::Result;
use serde::Serialize;

use crate::core::error::TransformError;
use crate::core::package::{InsertOutcome, PackageManifest};
use crate::core::tree::Tree;

/// Package whose version is copied.
pub const CORE_PACKAGE: &str = "@angular/core";

/// Package providing the service worker runtime.
pub const WORKER_PACKAGE: &str = "@angular/service-worker";

/// What happened to the worker dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DependencyOutcome {
    Added,
    AlreadyPresent,
    /// A different version was already pinned and kept.
    Conflict { existing: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub package: String,
    /// Version of the framework core.
    pub version: String,
    #[serde(flatten)]
    pub outcome: DependencyOutcome,
}

impl DependencyReport {
    /// Whether the package manager has to run to fetch the new dependency.
    pub fn needs_install(&self) -> bool {
        self.outcome == DependencyOutcome::Added
    }
}

/// Pin `@angular/service-worker` to the version of `@angular/core`.
pub fn add_worker_dependency<T: Tree + ?Sized>(tree: &mut T) -> Result<DependencyReport> {
    let mut manifest = PackageManifest::load(tree)?;

    let version = manifest
        .dependency_version(CORE_PACKAGE)
        .map(str::to_string)
        .ok_or_else(|| TransformError::MissingDependency {
            package: CORE_PACKAGE.to_string(),
        })?;

    let outcome = match manifest.insert_dependency(WORKER_PACKAGE, &version)? {
        InsertOutcome::Inserted => {
            manifest.save(tree)?;
            tracing::info!("added {}@{}", WORKER_PACKAGE, version);
            DependencyOutcome::Added
        }
        InsertOutcome::Unchanged => {
            tracing::debug!("{}@{} already present", WORKER_PACKAGE, version);
            DependencyOutcome::AlreadyPresent
        }
        InsertOutcome::Conflict { existing } => {
            tracing::warn!(
                "keeping {}@{}, which differs from {}@{}",
                WORKER_PACKAGE,
                existing,
                CORE_PACKAGE,
                version
            );
            DependencyOutcome::Conflict { existing }
        }
    };

    Ok(DependencyReport {
        package: WORKER_PACKAGE.to_string(),
        version,
        outcome,
    })
}
