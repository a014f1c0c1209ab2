//! Registers the service worker in the application's root module.
//!
//! The root module is found by following the build target's entry point
//! to its `bootstrapModule(...)` call. The registration is appended to the
//! `imports` array of that module's `@NgModule` metadata, and the symbols
//! it references are imported.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::error::TransformError;
use crate::core::tree::{join_path, normalize_path, parent_dir, Tree};
use crate::core::workspace::WorkspaceConfig;
use crate::source::{add_import, apply_edits, find_bootstrap_module, find_module_imports, SourceFile};

/// Module providing the registration call.
pub const WORKER_MODULE: &str = "ServiceWorkerModule";

/// Import specifier of [`WORKER_MODULE`].
pub const WORKER_MODULE_SPECIFIER: &str = "@angular/service-worker";

/// Dev-mode check used by the registration.
pub const DEV_MODE_CHECK: &str = "isDevMode";

/// Import specifier of [`DEV_MODE_CHECK`].
pub const CORE_SPECIFIER: &str = "@angular/core";

/// The registration expression, with a two-space inner indent.
pub const REGISTRATION: &str = "ServiceWorkerModule.register('ngsw-worker.js', {
  enabled: !isDevMode(),
  // Register the ServiceWorker as soon as the application is stable
  // or after 30 seconds (whichever comes first).
  registrationStrategy: 'registerWhenStable:30000'
})";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Registered,
    /// The `imports` array already held a `ServiceWorkerModule` element.
    AlreadyRegistered,
}

/// Result of registering the service worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Root module source that was edited.
    pub module_path: String,
    pub outcome: RegistrationOutcome,
    /// Symbols newly imported into the module.
    pub imports_added: Vec<String>,
}

/// A module source after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub text: String,
    pub outcome: RegistrationOutcome,
    pub imports_added: Vec<String>,
}

/// Insert the registration and its imports into a module source.
///
/// Running it again on its own output changes nothing.
pub fn insert_registration(path: &str, text: &str) -> Result<Registration> {
    let file = SourceFile::parse(path, text)?;
    let imports = find_module_imports(&file)?;

    let mut edits = Vec::new();
    let mut imports_added = Vec::new();

    let outcome = if imports.contains_element(&file, WORKER_MODULE) {
        RegistrationOutcome::AlreadyRegistered
    } else {
        edits.push(imports.append(&file, REGISTRATION));
        if let Some(edit) = add_import(&file, DEV_MODE_CHECK, CORE_SPECIFIER) {
            edits.push(edit);
            imports_added.push(DEV_MODE_CHECK.to_string());
        }
        RegistrationOutcome::Registered
    };

    if let Some(edit) = add_import(&file, WORKER_MODULE, WORKER_MODULE_SPECIFIER) {
        edits.push(edit);
        imports_added.insert(0, WORKER_MODULE.to_string());
    }

    let text = apply_edits(file.text(), &edits)
        .with_context(|| format!("failed to edit {}", path))?;

    Ok(Registration {
        text,
        outcome,
        imports_added,
    })
}

/// Locate the root module of `project` and register the service worker in it.
pub fn register_service_worker<T: Tree + ?Sized>(
    tree: &mut T,
    project: &str,
    target: &str,
) -> Result<BootstrapReport> {
    let module_path = root_module_path(tree, project, target)?;
    let original = tree
        .read(&module_path)
        .with_context(|| format!("failed to read root module {}", module_path))?;

    let registration = insert_registration(&module_path, &original)?;
    if registration.text != original {
        tree.write(&module_path, &registration.text)?;
    }

    match registration.outcome {
        RegistrationOutcome::Registered => {
            tracing::info!("registered {} in {}", WORKER_MODULE, module_path)
        }
        RegistrationOutcome::AlreadyRegistered => {
            tracing::debug!("{} already registered in {}", WORKER_MODULE, module_path)
        }
    }

    Ok(BootstrapReport {
        module_path,
        outcome: registration.outcome,
        imports_added: registration.imports_added,
    })
}

/// Follow the entry point's `bootstrapModule(...)` call to the module file.
fn root_module_path<T: Tree + ?Sized>(tree: &T, project: &str, target: &str) -> Result<String> {
    let workspace = WorkspaceConfig::load(tree)?;
    let options = workspace.project(project)?.target_options(target)?;

    let main = options
        .entry_point()
        .map(normalize_path)
        .ok_or_else(|| TransformError::MissingBuildOption {
            project: project.to_string(),
            target: target.to_string(),
            option: "main".to_string(),
        })?;

    let text = tree
        .read(&main)
        .with_context(|| format!("failed to read entry point {}", main))?;
    let entry = SourceFile::parse(&main, text)?;
    let bootstrap = find_bootstrap_module(&entry)?;

    if !bootstrap.specifier.starts_with('.') {
        return Err(TransformError::malformed(
            &main,
            format!(
                "`{}` is imported from `{}`, which is not a relative path",
                bootstrap.symbol, bootstrap.specifier
            ),
        )
        .into());
    }

    let base = join_path(parent_dir(&main), &bootstrap.specifier);
    let candidates = if base.ends_with(".ts") {
        vec![base]
    } else {
        vec![format!("{}.ts", base), format!("{}/index.ts", base)]
    };

    let resolved = candidates.iter().find(|path| tree.exists(path)).cloned();
    tracing::debug!("root module of {}: {:?}", project, resolved);

    resolved.ok_or_else(|| {
        TransformError::malformed(
            &main,
            format!(
                "cannot find `{}` (looked for {})",
                bootstrap.specifier,
                candidates.join(", ")
            ),
        )
        .into()
    })
}
