//! Workspace configuration (`angular.json`).
//!
//! The workspace maps project names to project definitions. Each project
//! has a root directory and named build targets whose `options` object is
//! free-form; only the handful of keys this crate reads or writes are
//! given typed accessors.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::error::TransformError;
use super::json::{object_at, JsonDocument, Placement};
use super::project_root::ProjectRoot;
use super::tree::Tree;

/// Workspace configuration file name.
pub const WORKSPACE_FILE: &str = "angular.json";

/// Hidden workspace configuration file name, used when the primary one is absent.
pub const WORKSPACE_FILE_ALIAS: &str = ".angular.json";

/// Find the workspace configuration file in a tree.
pub fn find_workspace_file<T: Tree + ?Sized>(tree: &T) -> Option<&'static str> {
    [WORKSPACE_FILE, WORKSPACE_FILE_ALIAS]
        .into_iter()
        .find(|candidate| tree.exists(candidate))
}

/// The parsed workspace configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    doc: JsonDocument,
}

/// Read-only view of one project.
#[derive(Debug, Clone)]
pub struct ProjectView<'a> {
    name: String,
    definition: &'a Map<String, Value>,
}

impl WorkspaceConfig {
    /// Load the workspace configuration from a tree.
    pub fn load<T: Tree + ?Sized>(tree: &T) -> Result<Self> {
        let path = find_workspace_file(tree).ok_or(TransformError::WorkspaceNotFound)?;
        let text = tree.read(path)?;
        let doc = JsonDocument::parse(path, &text)?;
        tracing::debug!("loaded workspace configuration from {}", path);
        Ok(WorkspaceConfig { doc })
    }

    /// Parse a workspace configuration from text.
    pub fn parse(path: &str, text: &str) -> Result<Self, TransformError> {
        Ok(WorkspaceConfig {
            doc: JsonDocument::parse(path, text)?,
        })
    }

    /// Write the configuration back to the file it came from.
    pub fn save<T: Tree + ?Sized>(&self, tree: &mut T) -> Result<()> {
        tree.write(self.doc.path(), self.doc.text())
            .with_context(|| format!("failed to write {}", self.doc.path()))
    }

    /// Tree path of the configuration file.
    pub fn path(&self) -> &str {
        self.doc.path()
    }

    /// The underlying document.
    pub fn document(&self) -> &Map<String, Value> {
        self.doc.root()
    }

    /// Names of all projects, in declaration order.
    pub fn project_names(&self) -> Vec<String> {
        object_at(self.doc.root(), "projects")
            .map(|projects| projects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The workspace-level `defaultProject`, if declared.
    pub fn default_project(&self) -> Option<&str> {
        self.doc.root().get("defaultProject").and_then(Value::as_str)
    }

    /// Choose the project to operate on.
    ///
    /// An explicit request wins, then `defaultProject`, then the only
    /// project of the workspace.
    pub fn select_project(&self, requested: Option<&str>) -> Result<String, TransformError> {
        if let Some(name) = requested.or(self.default_project()) {
            return self.project(name).map(|view| view.name().to_string());
        }

        match self.project_names().as_slice() {
            [only] => Ok(only.clone()),
            names => Err(TransformError::ProjectRequired {
                available: names.to_vec(),
            }),
        }
    }

    /// Look up a project.
    pub fn project(&self, name: &str) -> Result<ProjectView<'_>, TransformError> {
        let definition = object_at(self.doc.root(), "projects")
            .and_then(|projects| object_at(projects, name))
            .ok_or_else(|| TransformError::ProjectNotFound {
                project: name.to_string(),
                available: self.project_names(),
            })?;
        Ok(ProjectView {
            name: name.to_string(),
            definition,
        })
    }

    /// Set one option of `projects.<project>.<targets>.<target>.options`.
    ///
    /// The project and the target must exist; the `options` object is
    /// created when the target has none. Only the changed member is
    /// rewritten. Returns whether the file text changed.
    pub fn set_target_option(
        &mut self,
        project: &str,
        target: &str,
        option: &str,
        value: Value,
    ) -> Result<bool> {
        let view = self.project(project)?;
        view.target_options(target)?;
        let targets_key = target_map_key(view.definition);

        self.doc.set(
            &["projects", project, targets_key, target, "options", option],
            value,
            Placement::Last,
        )
    }
}

impl<'a> ProjectView<'a> {
    /// Project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized project root.
    pub fn root(&self) -> ProjectRoot {
        ProjectRoot::parse(
            self.definition
                .get("root")
                .and_then(Value::as_str)
                .unwrap_or(""),
        )
    }

    /// Declared `projectType`, if any.
    pub fn project_type(&self) -> Option<&'a str> {
        self.definition.get("projectType").and_then(Value::as_str)
    }

    /// Names of the project's targets, in declaration order.
    pub fn target_names(&self) -> Vec<String> {
        target_map(self.definition)
            .map(|targets| targets.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Options of a target. A target without `options` yields an empty map.
    pub fn target_options(&self, target: &str) -> Result<TargetOptions, TransformError> {
        let definition = target_map(self.definition)
            .and_then(|targets| object_at(targets, target))
            .ok_or_else(|| TransformError::TargetNotFound {
                project: self.name.clone(),
                target: target.to_string(),
                available: self.target_names(),
            })?;

        Ok(TargetOptions {
            options: object_at(definition, "options").cloned().unwrap_or_default(),
        })
    }
}

/// Snapshot of a target's `options` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetOptions {
    options: Map<String, Value>,
}

impl TargetOptions {
    /// A string option.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// A boolean option.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(Value::as_bool)
    }

    /// `serviceWorker`
    pub fn service_worker(&self) -> Option<bool> {
        self.get_bool("serviceWorker")
    }

    /// `ngswConfigPath`
    pub fn ngsw_config_path(&self) -> Option<&str> {
        self.get_str("ngswConfigPath")
    }

    /// `resourcesOutputPath`, ignoring blank values.
    pub fn resources_output_path(&self) -> Option<&str> {
        self.get_str("resourcesOutputPath")
            .filter(|path| !path.trim().is_empty())
    }

    /// Application entry point: `main`, or `browser` for the application builder.
    pub fn entry_point(&self) -> Option<&str> {
        self.get_str("main").or_else(|| self.get_str("browser"))
    }
}

// Older workspaces call the target map `targets` instead of `architect`.
fn target_map(definition: &Map<String, Value>) -> Option<&Map<String, Value>> {
    object_at(definition, "architect").or_else(|| object_at(definition, "targets"))
}

fn target_map_key(definition: &Map<String, Value>) -> &'static str {
    if object_at(definition, "architect").is_some() {
        "architect"
    } else {
        "targets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::MemoryTree;

    const WORKSPACE: &str = r#"{
  "$schema": "./node_modules/@angular/cli/lib/config/schema.json",
  "version": 1,
  "newProjectRoot": "projects",
  "projects": {
    "bar": {
      "projectType": "application",
      "root": "projects/bar",
      "sourceRoot": "projects/bar/src",
      "prefix": "app",
      "architect": {
        "build": {
          "builder": "@angular-devkit/build-angular:browser",
          "options": {
            "outputPath": "dist/bar",
            "main": "projects/bar/src/main.ts"
          }
        },
        "test": {
          "builder": "@angular-devkit/build-angular:karma"
        }
      }
    },
    "lib": {
      "projectType": "library",
      "root": "projects/lib",
      "targets": {
        "build": {}
      }
    }
  }
}
"#;

    fn workspace() -> WorkspaceConfig {
        WorkspaceConfig::parse("angular.json", WORKSPACE).unwrap()
    }

    #[test]
    fn test_project_lookup() {
        let ws = workspace();
        assert_eq!(ws.project_names(), vec!["bar", "lib"]);

        let bar = ws.project("bar").unwrap();
        assert_eq!(bar.root(), ProjectRoot::parse("projects/bar"));
        assert_eq!(bar.project_type(), Some("application"));
        assert_eq!(bar.target_names(), vec!["build", "test"]);

        let options = bar.target_options("build").unwrap();
        assert_eq!(options.entry_point(), Some("projects/bar/src/main.ts"));
        assert_eq!(options.resources_output_path(), None);
    }

    #[test]
    fn test_select_project() {
        let ws = workspace();
        assert_eq!(ws.select_project(Some("lib")).unwrap(), "lib");
        assert!(matches!(
            ws.select_project(Some("nope")),
            Err(TransformError::ProjectNotFound { .. })
        ));
        assert_eq!(
            ws.select_project(None),
            Err(TransformError::ProjectRequired {
                available: vec!["bar".to_string(), "lib".to_string()],
            })
        );

        let single = WorkspaceConfig::parse("angular.json", r#"{"projects": {"only": {}}}"#).unwrap();
        assert_eq!(single.select_project(None).unwrap(), "only");

        let with_default = WorkspaceConfig::parse(
            "angular.json",
            r#"{"defaultProject": "b", "projects": {"a": {}, "b": {}}}"#,
        )
        .unwrap();
        assert_eq!(with_default.select_project(None).unwrap(), "b");
    }

    #[test]
    fn test_missing_project() {
        let err = workspace().project("baz").unwrap_err();
        assert_eq!(
            err,
            TransformError::ProjectNotFound {
                project: "baz".to_string(),
                available: vec!["bar".to_string(), "lib".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_target() {
        let ws = workspace();
        let err = ws.project("bar").unwrap().target_options("serve").unwrap_err();
        assert_eq!(
            err,
            TransformError::TargetNotFound {
                project: "bar".to_string(),
                target: "serve".to_string(),
                available: vec!["build".to_string(), "test".to_string()],
            }
        );
    }

    #[test]
    fn test_target_without_options() {
        let ws = workspace();
        let options = ws.project("bar").unwrap().target_options("test").unwrap();
        assert_eq!(options, TargetOptions::default());
    }

    #[test]
    fn test_legacy_targets_key() {
        let mut ws = workspace();
        assert_eq!(ws.project("lib").unwrap().target_names(), vec!["build"]);

        assert!(ws.set_target_option("lib", "build", "flag", Value::Bool(true)).unwrap());
        let options = ws.project("lib").unwrap().target_options("build").unwrap();
        assert_eq!(options.get_bool("flag"), Some(true));
    }

    #[test]
    fn test_set_target_option_creates_options() {
        let mut ws = workspace();
        ws.set_target_option("bar", "test", "watch", Value::Bool(false)).unwrap();

        let test = &ws.document()["projects"]["bar"]["architect"]["test"];
        assert_eq!(test["options"]["watch"], Value::Bool(false));
        assert_eq!(test["builder"], "@angular-devkit/build-angular:karma");
        assert!(ws.document()["projects"]["bar"].get("targets").is_none());
    }

    #[test]
    fn test_set_target_option_requires_target() {
        let mut ws = workspace();
        let err = ws
            .set_target_option("bar", "deploy", "watch", Value::Bool(false))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TransformError>(),
            Some(TransformError::TargetNotFound { .. })
        ));
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let mut tree = MemoryTree::new().with_file("angular.json", WORKSPACE);
        let ws = WorkspaceConfig::load(&tree).unwrap();
        ws.save(&mut tree).unwrap();
        assert_eq!(tree.read("angular.json").unwrap(), WORKSPACE);
    }

    #[test]
    fn test_load_falls_back_to_hidden_file() {
        let tree = MemoryTree::new().with_file(".angular.json", WORKSPACE);
        let ws = WorkspaceConfig::load(&tree).unwrap();
        assert_eq!(ws.path(), ".angular.json");
    }

    #[test]
    fn test_load_without_workspace() {
        let err = WorkspaceConfig::load(&MemoryTree::new()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TransformError>(),
            Some(&TransformError::WorkspaceNotFound)
        );
    }
}
