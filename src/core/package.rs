//! Package manifest (`package.json`).

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::error::TransformError;
use super::json::{object_at, JsonDocument, Placement};
use super::tree::Tree;

/// Package manifest file name.
pub const PACKAGE_FILE: &str = "package.json";

/// Section holding runtime dependencies.
const DEPENDENCIES: &str = "dependencies";

/// Result of inserting a dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The entry did not exist and was added.
    Inserted,
    /// An entry with the same version already existed.
    Unchanged,
    /// An entry with a different version exists and was left as is.
    Conflict { existing: String },
}

/// The parsed package manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    doc: JsonDocument,
}

impl PackageManifest {
    /// Load `package.json` from the tree root.
    pub fn load<T: Tree + ?Sized>(tree: &T) -> Result<Self> {
        let text = tree
            .read(PACKAGE_FILE)
            .with_context(|| format!("failed to read {}", PACKAGE_FILE))?;
        Ok(PackageManifest {
            doc: JsonDocument::parse(PACKAGE_FILE, &text)?,
        })
    }

    /// Parse a manifest from text.
    pub fn parse(text: &str) -> Result<Self, TransformError> {
        Ok(PackageManifest {
            doc: JsonDocument::parse(PACKAGE_FILE, text)?,
        })
    }

    /// Write the manifest back.
    pub fn save<T: Tree + ?Sized>(&self, tree: &mut T) -> Result<()> {
        tree.write(PACKAGE_FILE, self.doc.text())
            .with_context(|| format!("failed to write {}", PACKAGE_FILE))
    }

    /// The underlying document.
    pub fn document(&self) -> &Map<String, Value> {
        self.doc.root()
    }

    /// Pinned version of a runtime dependency.
    pub fn dependency_version(&self, name: &str) -> Option<&str> {
        object_at(self.doc.root(), DEPENDENCIES)
            .and_then(|deps| deps.get(name))
            .and_then(Value::as_str)
    }

    /// Insert a runtime dependency unless an entry already exists.
    ///
    /// New keys are placed at their alphabetical position; existing keys
    /// never move and the rest of the file is left as written.
    pub fn insert_dependency(&mut self, name: &str, version: &str) -> Result<InsertOutcome> {
        if let Some(existing) = self.dependency_version(name) {
            return Ok(if existing == version {
                InsertOutcome::Unchanged
            } else {
                InsertOutcome::Conflict {
                    existing: existing.to_string(),
                }
            });
        }

        self.doc.set(
            &[DEPENDENCIES, name],
            Value::String(version.to_string()),
            Placement::Sorted,
        )?;
        Ok(InsertOutcome::Inserted)
    }
}
