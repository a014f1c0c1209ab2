//! Core data structures for swcraft.
//!
//! This module contains the foundational types the transformations work on:
//! - The virtual file tree and its staging overlay
//! - Workspace configuration (angular.json) and package manifest (package.json)
//! - Project roots as normalized segment lists
//! - Transformation errors

pub mod error;
pub mod json;
pub mod package;
pub mod project_root;
pub mod tree;
pub mod workspace;

pub use error::TransformError;
pub use package::PackageManifest;
pub use project_root::ProjectRoot;
pub use tree::{FileChange, HostTree, MemoryTree, StagedTree, Tree};
pub use workspace::{WorkspaceConfig, WORKSPACE_FILE, WORKSPACE_FILE_ALIAS};
