//! swcraft CLI - adds a service worker to an Angular workspace

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use swcraft::util::{diagnostic, Shell};
use swcraft::TransformError;

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
}

fn main() {
    let cli = Cli::parse();
    let global_opts = GlobalOptions {
        shell: Shell::from_flags(
            cli.quiet,
            cli.verbose,
            cli.color,
            cli.message_format == MessageFormat::Json,
        ),
    };

    if let Err(e) = run(cli, &global_opts) {
        report_error(&e, &global_opts.shell);
        std::process::exit(1);
    }
}

fn run(cli: Cli, global_opts: &GlobalOptions) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("swcraft=debug")
    } else if cli.quiet || cli.message_format == MessageFormat::Json {
        EnvFilter::new("swcraft=error")
    } else {
        EnvFilter::new("swcraft=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::ServiceWorker(args) => commands::service_worker::execute(args, global_opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, as a diagnostic when the cause is a known transformation error.
fn report_error(e: &anyhow::Error, shell: &Shell) {
    if shell.is_json() {
        shell.error(format!("{:#}", e));
        return;
    }

    let Some(cause) = e.downcast_ref::<TransformError>() else {
        eprintln!("error: {:#}", e);
        return;
    };

    // Keep the outer context ("failed to ...") visible.
    let context = (e.chain().count() > 1).then(|| e.to_string());
    match cause.source_diagnostic() {
        Some(report) => {
            diagnostic::emit_source(&report, shell.use_color());
            if let Some(context) = context {
                eprintln!("  = {}", context);
            }
        }
        None => {
            let mut diag = cause.to_diagnostic();
            if let Some(context) = context {
                diag = diag.with_context(context);
            }
            diagnostic::emit(&diag, shell.use_color());
        }
    }
}
