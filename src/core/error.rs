//! Transformation error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic, SourceDiagnostic};

/// The text of a source file and the byte range an error points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSnippet {
    pub text: String,
    pub offset: usize,
    pub length: usize,
}

/// A structural problem that makes the workspace incompatible with the
/// service worker transformation.
///
/// None of these are retried: they describe the project, not a transient
/// condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("could not find a workspace configuration (angular.json)")]
    WorkspaceNotFound,

    #[error("failed to parse `{path}`: {message}")]
    InvalidJson { path: String, message: String },

    #[error("project `{project}` does not exist in the workspace")]
    ProjectNotFound {
        project: String,
        available: Vec<String>,
    },

    #[error("no project selected and the workspace has {} projects", .available.len())]
    ProjectRequired { available: Vec<String> },

    #[error("target `{target}` does not exist for project `{project}`")]
    TargetNotFound {
        project: String,
        target: String,
        available: Vec<String>,
    },

    #[error("service worker requires a project type of \"application\", but `{project}` is a \"{project_type}\"")]
    UnsupportedProject {
        project: String,
        project_type: String,
    },

    #[error("target `{target}` of project `{project}` has no `{option}` option")]
    MissingBuildOption {
        project: String,
        target: String,
        option: String,
    },

    #[error("dependency `{package}` is missing from package.json")]
    MissingDependency { package: String },

    #[error("malformed source `{path}`: {reason}")]
    MalformedSource {
        path: String,
        reason: String,
        snippet: Option<SourceSnippet>,
    },
}

impl TransformError {
    /// Shorthand for a malformed source error.
    pub fn malformed(path: &str, reason: impl Into<String>) -> Self {
        TransformError::MalformedSource {
            path: path.to_string(),
            reason: reason.into(),
            snippet: None,
        }
    }

    /// The error with the offending code attached, when it points into a
    /// source file.
    pub fn source_diagnostic(&self) -> Option<SourceDiagnostic> {
        match self {
            TransformError::MalformedSource {
                path,
                reason,
                snippet: Some(snippet),
            } => Some(SourceDiagnostic::new(
                path,
                snippet.text.clone(),
                snippet.offset,
                snippet.length,
                reason.clone(),
            )
            .with_help(suggestions::MALFORMED_MODULE)),
            _ => None,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            TransformError::WorkspaceNotFound => Diagnostic::error(self.to_string())
                .with_suggestion(suggestions::NO_WORKSPACE),

            TransformError::InvalidJson { path, message } => {
                Diagnostic::error(format!("`{}` is not a valid JSON object", path))
                    .with_location(path)
                    .with_context(message.clone())
            }

            TransformError::ProjectNotFound { project, available } => {
                let mut diag = Diagnostic::error(self.to_string()).with_location("angular.json");
                if !available.is_empty() {
                    diag = diag.with_context(format!("available projects: {}", available.join(", ")));
                }
                diag.with_suggestion(format!(
                    "Pass one of the workspace projects with `--project`, not `{}`",
                    project
                ))
            }

            TransformError::ProjectRequired { available } => {
                let mut diag = Diagnostic::error(self.to_string()).with_location("angular.json");
                if !available.is_empty() {
                    diag = diag.with_context(format!("available projects: {}", available.join(", ")));
                }
                diag.with_suggestion(suggestions::CHOOSE_PROJECT)
            }

            TransformError::TargetNotFound {
                project,
                target,
                available,
            } => {
                let mut diag = Diagnostic::error(self.to_string()).with_location("angular.json");
                if !available.is_empty() {
                    diag = diag.with_context(format!(
                        "targets of `{}`: {}",
                        project,
                        available.join(", ")
                    ));
                }
                diag.with_suggestion(format!(
                    "Pick an existing target with `--target` instead of `{}`",
                    target
                ))
            }

            TransformError::UnsupportedProject { project, .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(format!(
                    "Set `projectType` of `{}` to \"application\" or choose an application project",
                    project
                ))
            }

            TransformError::MissingBuildOption { option, .. } => Diagnostic::error(self.to_string())
                .with_location("angular.json")
                .with_suggestion(format!(
                    "Add the `{}` option pointing at the application entry point",
                    option
                )),

            TransformError::MissingDependency { package } => Diagnostic::error(self.to_string())
                .with_location("package.json")
                .with_context(format!(
                    "the service worker package is pinned to the version of `{}`",
                    package
                ))
                .with_suggestion(suggestions::MISSING_FRAMEWORK),

            TransformError::MalformedSource { path, reason, .. } => {
                Diagnostic::error(format!("cannot register the service worker in `{}`", path))
                    .with_location(path)
                    .with_context(reason.clone())
                    .with_suggestion(suggestions::MALFORMED_MODULE)
            }
        }
    }
}
