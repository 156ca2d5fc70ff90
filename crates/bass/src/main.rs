//! Bass CLI - static site generator.
//!
//! Provides commands for:
//! - `create`: Create a new project
//! - `build`: Build the site into the output directory
//! - `serve`: Build the site and serve it, rebuilding on change

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CreateArgs, ServeArgs};
use output::Output;

/// Bass - static site generator.
#[derive(Parser)]
#[command(name = "bass", version, about)]
struct Cli {
    /// Show debug messages.
    #[arg(short, long, global = true)]
    debug: bool,

    /// Show progress messages.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project.
    Create(CreateArgs),
    /// Build the site.
    Build(BuildArgs),
    /// Build the site and start the development server.
    Serve(ServeArgs),
}

impl Cli {
    /// Log filter: `--debug`, then `--verbose`, then `RUST_LOG` (default `warn`).
    fn filter(&self) -> EnvFilter {
        if self.debug {
            EnvFilter::new("debug")
        } else if self.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(cli.filter())
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Create(args) => args.execute(),
        Commands::Build(args) => args.execute(),
        Commands::Serve(args) => tokio::runtime::Runtime::new()
            .map_err(error::CliError::from)
            .and_then(|rt| rt.block_on(args.execute())),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
