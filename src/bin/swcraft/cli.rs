//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use swcraft::util::ColorChoice;

/// swcraft - adds a service worker to an Angular workspace
#[derive(Parser)]
#[command(name = "swcraft")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enable the service worker for a project
    ServiceWorker(ServiceWorkerArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ServiceWorkerArgs {
    /// Project to add the service worker to
    #[arg(long, env = "SWCRAFT_PROJECT")]
    pub project: Option<String>,

    /// Build target to enable the service worker in [default: build]
    #[arg(long, env = "SWCRAFT_TARGET")]
    pub target: Option<String>,

    /// Workspace directory (defaults to the nearest directory with angular.json)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Replace an existing ngsw-config.json
    #[arg(long)]
    pub overwrite_config: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
