//! User-friendly diagnostic messages.
//!
//! Every error shown to the user carries the root cause, where it was
//! found, and what to do about it.

use std::fmt;
use std::path::PathBuf;

use miette::{Diagnostic as MietteDiagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no workspace configuration is found.
    pub const NO_WORKSPACE: &str =
        "Run swcraft from inside an Angular workspace, or pass `--path <workspace>`";

    /// Suggestion when the framework core package is not a dependency.
    pub const MISSING_FRAMEWORK: &str =
        "Install the framework first: `npm install @angular/core`";

    /// Suggestion when the application module cannot be edited.
    pub const MALFORMED_MODULE: &str =
        "Make sure the module declares `@NgModule({ imports: [...] })`, then re-run";

    /// Suggestion when a dependency is pinned to another version.
    pub const ALIGN_VERSIONS: &str =
        "Align the version with `@angular/core` in package.json, then run the package manager";

    /// Suggestion when several projects exist and none was chosen.
    pub const CHOOSE_PROJECT: &str = "Pass `--project <name>` or set `defaults.project` in .swcraft/config.toml";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Problem in a source file, rendered with the offending code underlined.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("cannot register the service worker in `{path}`")]
#[diagnostic(code(swcraft::source::malformed))]
pub struct SourceDiagnostic {
    pub path: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{reason}")]
    pub span: SourceSpan,
    pub reason: String,
    #[help]
    pub help: Option<String>,
}

impl SourceDiagnostic {
    pub fn new(path: &str, text: String, offset: usize, length: usize, reason: String) -> Self {
        SourceDiagnostic {
            path: path.to_string(),
            src: NamedSource::new(path, text),
            span: (offset, length).into(),
            reason,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render with the source snippet.
    pub fn render(&self, color: bool) -> String {
        let theme = if color {
            GraphicalTheme::unicode()
        } else {
            GraphicalTheme::unicode_nocolor()
        };
        let handler = GraphicalReportHandler::new_themed(theme).with_width(200);

        let mut output = String::new();
        match handler.render_report(&mut output, self) {
            Ok(()) => output,
            Err(_) => format!("error: {}\n  = {}\n", self, self.reason),
        }
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

/// Print a source diagnostic to stderr.
pub fn emit_source(diagnostic: &SourceDiagnostic, color: bool) {
    eprint!("{}", diagnostic.render(color));
}
