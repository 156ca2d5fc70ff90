//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod create;
pub(crate) mod serve;

use std::path::PathBuf;

use bass_config::{CliSettings, Config};
use clap::Args;

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use create::CreateArgs;
pub(crate) use serve::ServeArgs;

/// Project options shared by `build` and `serve`.
#[derive(Args, Debug)]
pub(crate) struct ProjectArgs {
    /// Path to configuration file (default: auto-discover bass.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input directory (overrides config).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layout directory (overrides config).
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// URL prefix of the generated pages (overrides config).
    #[arg(long)]
    root_url: Option<String>,
}

impl ProjectArgs {
    /// Load the configuration with these options applied on top.
    pub(crate) fn load_config(
        self,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            input: self.input,
            output: self.output,
            layout: self.layout,
            root_url: self.root_url,
            host,
            port,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}
