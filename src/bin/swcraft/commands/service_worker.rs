//! `swcraft service-worker` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::ServiceWorkerArgs;
use crate::GlobalOptions;
use swcraft::core::tree::{ChangeKind, HostTree};
use swcraft::core::workspace::WorkspaceConfig;
use swcraft::ops::bootstrap::RegistrationOutcome;
use swcraft::ops::dependency::DependencyOutcome;
use swcraft::ops::ngsw_config::ConfigOutcome;
use swcraft::ops::service_worker::{
    add_service_worker_staged, ServiceWorkerOptions, StagedRun, DEFAULT_TARGET,
};
use swcraft::util::context::is_workspace_root;
use swcraft::util::diagnostic::suggestions;
use swcraft::util::{Diagnostic, GlobalContext, Shell, Status};
use swcraft::TransformError;

pub fn execute(args: ServiceWorkerArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = GlobalContext::new()?;

    let root = workspace_root(&ctx, args.path)?;
    let config = ctx.config(&root);
    let mut tree = HostTree::new(&root);

    let workspace = WorkspaceConfig::load(&tree)?;
    let requested = args.project.or(config.defaults.project.clone());
    let project = workspace.select_project(requested.as_deref())?;
    let target = args
        .target
        .or(config.defaults.target.clone())
        .unwrap_or_else(|| DEFAULT_TARGET.to_string());

    let opts = ServiceWorkerOptions {
        project,
        target,
        overwrite_config: args.overwrite_config || config.overwrite_manifest(),
    };

    tracing::debug!("workspace root: {}", root.display());
    let run = add_service_worker_staged(&mut tree, &opts, args.dry_run)?;

    if shell.is_json() {
        emit_json(shell, &run);
    } else {
        print_human(shell, &run);
    }

    Ok(())
}

/// `--path` if given, otherwise the nearest enclosing workspace.
fn workspace_root(ctx: &GlobalContext, path: Option<PathBuf>) -> Result<PathBuf, TransformError> {
    match path {
        Some(path) if is_workspace_root(&path) => Ok(path),
        Some(_) => Err(TransformError::WorkspaceNotFound),
        None => ctx.find_workspace_root(),
    }
}

fn print_human(shell: &Shell, run: &StagedRun) {
    let report = &run.report;

    for change in &run.changes {
        match (change.kind, run.committed) {
            (ChangeKind::Created, true) => shell.status(Status::Created, &change.path),
            (ChangeKind::Modified, true) => shell.status(Status::Updated, &change.path),
            (ChangeKind::Created, false) => shell.note(format!("would create {}", change.path)),
            (ChangeKind::Modified, false) => shell.note(format!("would update {}", change.path)),
        }
    }

    if report.build_config.unchanged {
        shell.verbose_status(
            Status::Skipped,
            format!(
                "{}:{} already has the service worker enabled",
                report.project, report.target
            ),
        );
    }

    match &report.dependency.outcome {
        DependencyOutcome::Added => {}
        DependencyOutcome::AlreadyPresent => shell.verbose_status(
            Status::Skipped,
            format!("{} is already a dependency", report.dependency.package),
        ),
        DependencyOutcome::Conflict { existing } => shell.diagnostic(
            &Diagnostic::warning(format!(
                "{} is pinned to {} while @angular/core is at {}; left unchanged",
                report.dependency.package, existing, report.dependency.version
            ))
            .with_location("package.json")
            .with_suggestion(suggestions::ALIGN_VERSIONS),
        ),
    }

    if report.bootstrap.outcome == RegistrationOutcome::AlreadyRegistered {
        shell.status(
            Status::Skipped,
            format!(
                "{} already registers the service worker",
                report.bootstrap.module_path
            ),
        );
    }

    if report.ngsw_config.outcome == ConfigOutcome::Kept {
        shell.status(
            Status::Skipped,
            format!(
                "{} exists (use --overwrite-config to replace it)",
                report.ngsw_config.path
            ),
        );
    }

    if run.committed {
        if report.needs_install() {
            shell.note(format!(
                "run `npm install` to fetch {}@{}",
                report.dependency.package, report.dependency.version
            ));
        }
        shell.finished(format!("service worker for `{}`", report.project));
    } else if run.changes.is_empty() {
        shell.note("dry run: nothing to change");
    }
}

fn emit_json(shell: &Shell, run: &StagedRun) {
    for change in &run.changes {
        shell.json_event(&serde_json::json!({
            "reason": "file-changed",
            "path": change.path,
            "kind": change.kind,
            "dry_run": !run.committed,
        }));
    }

    shell.json_event(&serde_json::json!({
        "reason": "service-worker-added",
        "dry_run": !run.committed,
        "needs_install": run.report.needs_install(),
        "report": run.report,
    }));
}
