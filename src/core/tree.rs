//! Virtual file trees.
//!
//! Every transformation works against a [`Tree`]: an addressable mapping
//! from slash-separated paths to text. The runner owns the tree and hands
//! each step a mutable reference for the duration of that step only.
//!
//! Three implementations are provided:
//! - [`MemoryTree`] - an ordered in-memory map, used by tests and dry runs
//! - [`HostTree`] - a directory on disk
//! - [`StagedTree`] - a copy-on-write overlay that buffers writes until commit

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::util::fs;

/// A mutable file tree addressed by slash-separated paths.
///
/// Writes are immediately visible to subsequent reads on the same tree.
pub trait Tree {
    /// Check whether a file exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Read a file as text.
    fn read(&self, path: &str) -> Result<String>;

    /// Create or overwrite a file.
    fn write(&mut self, path: &str, content: &str) -> Result<()>;
}

/// Normalize a tree path.
///
/// Leading slashes, empty segments and `.` segments are dropped, `..`
/// pops the previous segment. Backslashes are treated as separators.
///
/// ```
/// use swcraft::core::tree::normalize_path;
///
/// assert_eq!(normalize_path("/projects/bar/./src/../ngsw-config.json"), "projects/bar/ngsw-config.json");
/// assert_eq!(normalize_path("/"), "");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Directory part of a normalized path (`""` for top-level files).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Join a relative specifier onto a directory and normalize the result.
pub fn join_path(dir: &str, relative: &str) -> String {
    if dir.is_empty() {
        normalize_path(relative)
    } else {
        normalize_path(&format!("{}/{}", dir, relative))
    }
}

/// In-memory tree with deterministic ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTree {
    files: BTreeMap<String, String>,
}

impl MemoryTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        MemoryTree {
            files: BTreeMap::new(),
        }
    }

    /// Builder-style file insertion.
    pub fn with_file(mut self, path: &str, content: impl Into<String>) -> Self {
        self.files.insert(normalize_path(path), content.into());
        self
    }
}

impl Tree for MemoryTree {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    fn read(&self, path: &str) -> Result<String> {
        let path = normalize_path(path);
        self.files
            .get(&path)
            .cloned()
            .ok_or_else(|| anyhow!("file not found: /{}", path))
    }

    fn write(&mut self, path: &str, content: &str) -> Result<()> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(anyhow!("cannot write to the tree root"));
        }
        self.files.insert(path, content.to_string());
        Ok(())
    }
}

/// A tree backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct HostTree {
    root: PathBuf,
}

impl HostTree {
    /// Create a tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        HostTree { root: root.into() }
    }

    /// The directory this tree is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut resolved = self.root.clone();
        for segment in normalize_path(path).split('/').filter(|s| !s.is_empty()) {
            resolved.push(segment);
        }
        resolved
    }
}

impl Tree for HostTree {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &str) -> Result<String> {
        fs::read_to_string(&self.resolve(path))
    }

    fn write(&mut self, path: &str, content: &str) -> Result<()> {
        if normalize_path(path).is_empty() {
            return Err(anyhow!("cannot write to the tree root"));
        }
        fs::write_string(&self.resolve(path), content)
    }
}

/// Kind of a pending or committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Modified,
}

/// A single file change recorded by a [`StagedTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    pub kind: ChangeKind,
}

/// Copy-on-write overlay over another tree.
///
/// Reads fall through to the base tree until a path has been written.
/// Nothing reaches the base tree until [`StagedTree::commit`], so a
/// pipeline that fails halfway leaves the base untouched.
#[derive(Debug)]
pub struct StagedTree<'a, T: Tree + ?Sized> {
    base: &'a mut T,
    staged: BTreeMap<String, String>,
}

impl<'a, T: Tree + ?Sized> StagedTree<'a, T> {
    /// Start staging writes over `base`.
    pub fn new(base: &'a mut T) -> Self {
        StagedTree {
            base,
            staged: BTreeMap::new(),
        }
    }

    /// Pending changes, in path order.
    ///
    /// A write that leaves a file byte-identical is not a change.
    pub fn changes(&self) -> Vec<FileChange> {
        self.staged
            .iter()
            .filter_map(|(path, content)| {
                if !self.base.exists(path) {
                    return Some(FileChange {
                        path: path.clone(),
                        kind: ChangeKind::Created,
                    });
                }
                match self.base.read(path) {
                    Ok(existing) if existing == *content => None,
                    _ => Some(FileChange {
                        path: path.clone(),
                        kind: ChangeKind::Modified,
                    }),
                }
            })
            .collect()
    }

    /// Write every changed file to the base tree.
    pub fn commit(self) -> Result<Vec<FileChange>> {
        let changes = self.changes();
        for change in &changes {
            let content = &self.staged[&change.path];
            self.base.write(&change.path, content)?;
        }
        Ok(changes)
    }
}

impl<T: Tree + ?Sized> Tree for StagedTree<'_, T> {
    fn exists(&self, path: &str) -> bool {
        self.staged.contains_key(&normalize_path(path)) || self.base.exists(path)
    }

    fn read(&self, path: &str) -> Result<String> {
        match self.staged.get(&normalize_path(path)) {
            Some(content) => Ok(content.clone()),
            None => self.base.read(path),
        }
    }

    fn write(&mut self, path: &str, content: &str) -> Result<()> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(anyhow!("cannot write to the tree root"));
        }
        self.staged.insert(path, content.to_string());
        Ok(())
    }
}
