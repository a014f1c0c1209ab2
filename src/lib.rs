//! swcraft - adds an Angular service worker to an existing workspace
//!
//! This crate provides the library behind the `swcraft` CLI: a virtual
//! file tree, readers and writers for the workspace files, and the four
//! transformations that enable the service worker for a project.

pub mod core;
pub mod ops;
pub mod source;
pub mod util;

/// Test utilities for swcraft unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides in-memory workspaces shaped like freshly
/// generated ones.
#[cfg(test)]
pub mod test_support;

pub use core::{
    error::TransformError, project_root::ProjectRoot, tree::HostTree, tree::MemoryTree, tree::Tree,
    workspace::WorkspaceConfig,
};

pub use ops::{add_service_worker, add_service_worker_staged, ServiceWorkerOptions};
pub use util::context::GlobalContext;
