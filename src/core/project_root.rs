//! Project root locations.

use std::fmt;

use super::tree::normalize_path;

/// The normalized location of a project inside its workspace.
///
/// An empty segment list means the project lives at the workspace root.
/// Anything that needs to know "where is this project" - relative climbs
/// back to the workspace, or paths of files placed in the project - is
/// derived from this one value so the two can never drift apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRoot {
    segments: Vec<String>,
}

impl ProjectRoot {
    /// Parse the `root` value of a workspace project entry.
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize_path(raw);
        let segments = normalized
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        ProjectRoot { segments }
    }

    /// A project located at the workspace root.
    pub fn workspace_root() -> Self {
        ProjectRoot::default()
    }

    /// Whether the project is located at the workspace root.
    pub fn is_workspace_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of directories between the workspace root and the project.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Path segments of the root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path of a file placed directly in the project root.
    pub fn join(&self, file: &str) -> String {
        if self.segments.is_empty() {
            normalize_path(file)
        } else {
            normalize_path(&format!("{}/{}", self.segments.join("/"), file))
        }
    }

    /// Relative path from the project root back to the workspace root.
    ///
    /// `.` for a project at the workspace root, otherwise one `..` per segment.
    pub fn path_to_workspace(&self) -> String {
        if self.segments.is_empty() {
            ".".to_string()
        } else {
            vec![".."; self.segments.len()].join("/")
        }
    }
}

impl fmt::Display for ProjectRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
