//! Test fixtures for common test scenarios.
//!
//! Builds the tree a freshly generated workspace would have: a workspace
//! configuration, a package manifest, and any number of applications,
//! each with an entry point and a root `@NgModule`.

use serde_json::{json, Map, Value};

use crate::core::json::to_string_with_indent;
use crate::core::tree::MemoryTree;

/// Framework version pinned by generated workspaces.
pub const CORE_VERSION: &str = "^17.0.0";

/// Root module as generated for a new application.
pub const APP_MODULE: &str = r#"import { NgModule } from '@angular/core';
import { BrowserModule } from '@angular/platform-browser';

import { AppComponent } from './app.component';

@NgModule({
  declarations: [
    AppComponent
  ],
  imports: [
    BrowserModule
  ],
  providers: [],
  bootstrap: [AppComponent]
})
export class AppModule { }
"#;

/// Entry point as generated for a new application.
pub const MAIN_TS: &str = r#"import { platformBrowserDynamic } from '@angular/platform-browser-dynamic';

import { AppModule } from './app/app.module';


platformBrowserDynamic().bootstrapModule(AppModule)
  .catch(err => console.error(err));
"#;

const APP_COMPONENT: &str = r#"import { Component } from '@angular/core';

@Component({
  selector: 'app-root',
  templateUrl: './app.component.html',
  styleUrls: ['./app.component.css']
})
export class AppComponent {
  title = 'app';
}
"#;

/// Fixture for one application project.
#[derive(Debug, Clone)]
pub struct ApplicationFixture {
    /// Project name.
    pub name: String,
    /// Project root; `None` places it under the workspace's new project root.
    pub root: Option<String>,
    /// `projectType` of the project.
    pub project_type: String,
    /// `resourcesOutputPath` build option.
    pub resources_output_path: Option<String>,
    /// Content of `src/app/app.module.ts`.
    pub module_source: String,
    /// Content of `src/main.ts`.
    pub main_source: String,
}

impl ApplicationFixture {
    /// An application placed under `projects/<name>`.
    pub fn new(name: impl Into<String>) -> Self {
        ApplicationFixture {
            name: name.into(),
            root: None,
            project_type: "application".to_string(),
            resources_output_path: None,
            module_source: APP_MODULE.to_string(),
            main_source: MAIN_TS.to_string(),
        }
    }

    /// Place the application at the workspace root.
    pub fn at_root(mut self) -> Self {
        self.root = Some(String::new());
        self
    }

    /// Set the `projectType`.
    pub fn with_project_type(mut self, project_type: impl Into<String>) -> Self {
        self.project_type = project_type.into();
        self
    }

    /// Set the `resourcesOutputPath` build option.
    pub fn with_resources_output_path(mut self, path: impl Into<String>) -> Self {
        self.resources_output_path = Some(path.into());
        self
    }

    /// Replace the root module source.
    pub fn with_module_source(mut self, source: impl Into<String>) -> Self {
        self.module_source = source.into();
        self
    }

    fn root_in(&self, new_project_root: &str) -> String {
        match &self.root {
            Some(root) => root.clone(),
            None => format!("{}/{}", new_project_root, self.name),
        }
    }

    fn project_definition(&self, root: &str) -> Value {
        let prefixed = |path: &str| {
            if root.is_empty() {
                path.to_string()
            } else {
                format!("{}/{}", root, path)
            }
        };

        let mut options = Map::new();
        options.insert("outputPath".to_string(), json!(format!("dist/{}", self.name)));
        options.insert("index".to_string(), json!(prefixed("src/index.html")));
        options.insert("main".to_string(), json!(prefixed("src/main.ts")));
        options.insert("polyfills".to_string(), json!(["zone.js"]));
        options.insert("tsConfig".to_string(), json!(prefixed("tsconfig.app.json")));
        options.insert(
            "assets".to_string(),
            json!([prefixed("src/favicon.ico"), prefixed("src/assets")]),
        );
        options.insert("styles".to_string(), json!([prefixed("src/styles.css")]));
        options.insert("scripts".to_string(), json!([]));
        if let Some(ref resources) = self.resources_output_path {
            options.insert("resourcesOutputPath".to_string(), json!(resources));
        }

        json!({
            "projectType": self.project_type,
            "root": root,
            "sourceRoot": prefixed("src"),
            "prefix": "app",
            "architect": {
                "build": {
                    "builder": "@angular-devkit/build-angular:browser",
                    "options": options,
                    "configurations": {
                        "production": {
                            "outputHashing": "all"
                        },
                        "development": {
                            "buildOptimizer": false,
                            "optimization": false,
                            "sourceMap": true
                        }
                    },
                    "defaultConfiguration": "production"
                },
                "serve": {
                    "builder": "@angular-devkit/build-angular:dev-server",
                    "defaultConfiguration": "development"
                },
                "test": {
                    "builder": "@angular-devkit/build-angular:karma",
                    "options": {
                        "polyfills": ["zone.js", "zone.js/testing"],
                        "tsConfig": prefixed("tsconfig.spec.json")
                    }
                }
            }
        })
    }
}

/// Fixture for a whole workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceFixture {
    /// Directory new projects are created in.
    pub new_project_root: String,
    /// Pinned `@angular/core` version; `None` leaves it out of package.json.
    pub core_version: Option<String>,
    /// Applications in the workspace.
    pub apps: Vec<ApplicationFixture>,
}

impl Default for WorkspaceFixture {
    fn default() -> Self {
        WorkspaceFixture::new()
    }
}

impl WorkspaceFixture {
    /// A workspace with `newProjectRoot: "projects"` and no projects.
    pub fn new() -> Self {
        WorkspaceFixture {
            new_project_root: "projects".to_string(),
            core_version: Some(CORE_VERSION.to_string()),
            apps: Vec::new(),
        }
    }

    /// Pin `@angular/core` to `version`.
    pub fn with_core_version(mut self, version: impl Into<String>) -> Self {
        self.core_version = Some(version.into());
        self
    }

    /// Leave `@angular/core` out of the package manifest.
    pub fn without_core(mut self) -> Self {
        self.core_version = None;
        self
    }

    /// Add an application.
    pub fn with_app(mut self, app: ApplicationFixture) -> Self {
        self.apps.push(app);
        self
    }

    /// Content of `angular.json`.
    pub fn workspace_json(&self) -> String {
        let mut projects = Map::new();
        for app in &self.apps {
            let root = app.root_in(&self.new_project_root);
            projects.insert(app.name.clone(), app.project_definition(&root));
        }

        let workspace = json!({
            "$schema": "./node_modules/@angular/cli/lib/config/schema.json",
            "version": 1,
            "newProjectRoot": self.new_project_root,
            "projects": projects
        });
        pretty(&workspace)
    }

    /// Content of `package.json`.
    pub fn package_json(&self) -> String {
        let mut dependencies = Map::new();
        let framework = self.core_version.clone().unwrap_or_else(|| CORE_VERSION.to_string());
        dependencies.insert("@angular/animations".to_string(), json!(framework));
        dependencies.insert("@angular/common".to_string(), json!(framework));
        if let Some(ref core) = self.core_version {
            dependencies.insert("@angular/core".to_string(), json!(core));
        }
        dependencies.insert("@angular/platform-browser".to_string(), json!(framework));
        dependencies.insert("rxjs".to_string(), json!("~7.8.0"));
        dependencies.insert("zone.js".to_string(), json!("~0.14.2"));

        let package = json!({
            "name": "workspace",
            "version": "0.0.0",
            "scripts": {
                "ng": "ng",
                "build": "ng build"
            },
            "private": true,
            "dependencies": dependencies,
            "devDependencies": {
                "@angular/cli": framework,
                "typescript": "~5.2.2"
            }
        });
        pretty(&package)
    }

    /// All files of the workspace as `(path, content)` pairs.
    pub fn files(&self) -> Vec<(String, String)> {
        let mut files = vec![
            ("angular.json".to_string(), self.workspace_json()),
            ("package.json".to_string(), self.package_json()),
        ];

        for app in &self.apps {
            let root = app.root_in(&self.new_project_root);
            let src = if root.is_empty() {
                "src".to_string()
            } else {
                format!("{}/src", root)
            };
            files.push((format!("{}/main.ts", src), app.main_source.clone()));
            files.push((format!("{}/app/app.module.ts", src), app.module_source.clone()));
            files.push((format!("{}/app/app.component.ts", src), APP_COMPONENT.to_string()));
            files.push((
                format!("{}/index.html", src),
                "<!doctype html>\n<html lang=\"en\">\n<body>\n  <app-root></app-root>\n</body>\n</html>\n"
                    .to_string(),
            ));
        }
        files
    }

    /// Build the workspace as an in-memory tree.
    pub fn build(&self) -> MemoryTree {
        self.files()
            .into_iter()
            .fold(MemoryTree::new(), |tree, (path, content)| tree.with_file(&path, content))
    }
}

fn pretty(value: &Value) -> String {
    let mut text = to_string_with_indent(value, "  ").unwrap_or_default();
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::Tree;

    #[test]
    fn test_nested_application_layout() {
        let tree = WorkspaceFixture::new().with_app(ApplicationFixture::new("bar")).build();
        assert!(tree.exists("angular.json"));
        assert!(tree.exists("package.json"));
        assert!(tree.exists("projects/bar/src/main.ts"));
        assert!(tree.exists("projects/bar/src/app/app.module.ts"));

        let ws: Value = serde_json::from_str(&tree.read("angular.json").unwrap()).unwrap();
        assert_eq!(ws["projects"]["bar"]["root"], "projects/bar");
        assert_eq!(
            ws["projects"]["bar"]["architect"]["build"]["options"]["main"],
            "projects/bar/src/main.ts"
        );
    }

    #[test]
    fn test_root_application_layout() {
        let tree = WorkspaceFixture::new()
            .with_app(ApplicationFixture::new("foo").at_root())
            .build();
        assert!(tree.exists("src/main.ts"));
        assert!(tree.exists("src/app/app.module.ts"));

        let ws: Value = serde_json::from_str(&tree.read("angular.json").unwrap()).unwrap();
        assert_eq!(ws["projects"]["foo"]["root"], "");
        assert_eq!(ws["projects"]["foo"]["sourceRoot"], "src");
    }

    #[test]
    fn test_package_without_core() {
        let fixture = WorkspaceFixture::new().without_core();
        let pkg: Value = serde_json::from_str(&fixture.package_json()).unwrap();
        assert!(pkg["dependencies"].get("@angular/core").is_none());
        assert!(pkg["dependencies"].get("@angular/common").is_some());
    }
}
