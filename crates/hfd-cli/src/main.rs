//! # hfd CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hfd_cli::apps::{run_deploy, run_list, run_remove, run_update, DeployArgs, RemoveArgs};
use hfd_cli::inspect::{run_render, run_resolve, RenderArgs, ResolveArgs};

/// HTML Fast Deploy CLI
///
/// Manage the applications in an apps root directory and inspect how
/// `/apps/...` requests resolve, without a running server.
#[derive(Parser, Debug)]
#[command(name = "hfd", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Apps root directory.
    #[arg(long, env = "HFD_APPS_DIR", default_value = "apps", global = true)]
    apps_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List deployed applications, newest first.
    List,

    /// Deploy a new application from an .html file or a .zip bundle.
    Deploy(DeployArgs),

    /// Replace an existing application's content.
    Update(DeployArgs),

    /// Delete an application.
    Remove(RemoveArgs),

    /// Show which application and file a request path is served from.
    Resolve(ResolveArgs),

    /// Print an application's root document as the server sends it.
    Render(RenderArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(apps_dir = %cli.apps_dir.display(), "hfd starting");

    let apps_dir = cli.apps_dir.as_path();
    let result = match &cli.command {
        Commands::List => run_list(apps_dir),
        Commands::Deploy(args) => run_deploy(args, apps_dir),
        Commands::Update(args) => run_update(args, apps_dir),
        Commands::Remove(args) => run_remove(args, apps_dir),
        Commands::Resolve(args) => run_resolve(args, apps_dir),
        Commands::Render(args) => run_render(args, apps_dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
