//! `bass create` command implementation.

use std::path::PathBuf;

use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// Project directory; must be empty or missing.
    #[arg(default_value = ".")]
    dir: PathBuf,
}

impl CreateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        bass_site::create_project(&self.dir)?;
        Output::new().success(&format!("Project created in {}", self.dir.display()));
        Ok(())
    }
}
