//! Test utilities for swcraft unit tests.
//!
//! Provides in-memory workspaces shaped like freshly generated ones, so
//! each transformation can be exercised without touching the disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use swcraft::test_support::{ApplicationFixture, WorkspaceFixture};
//!
//! let mut tree = WorkspaceFixture::new()
//!     .with_app(ApplicationFixture::new("bar"))
//!     .build();
//! ```

pub mod fixtures;

pub use fixtures::*;

use crate::core::tree::{MemoryTree, Tree};

/// Read a JSON file from a tree.
pub fn read_json(tree: &MemoryTree, path: &str) -> serde_json::Value {
    let text = tree
        .read(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path, e));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("{} is not JSON: {}", path, e))
}

/// Count non-overlapping occurrences of `needle`.
pub fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
