//! `bass serve` command implementation.

use bass_layout::TemplateTypes;
use bass_server::{ServerConfig, run_server};
use bass_site::Project;
use clap::Args;

use super::ProjectArgs;
use super::build::build_site;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeArgs {
    /// Build the site once, then serve it until Ctrl-C.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.project.load_config(self.host, self.port)?;
        let project = Project::from_config(&config);

        let tree = build_site(&project)?;
        output.success(&format!("Site built: {} nodes", tree.len()));
        output.info(&format!(
            "Serving {} on http://{}:{}/",
            project.settings().output.display(),
            config.server.host,
            config.server.port
        ));

        run_server(ServerConfig::from_config(&config), project, TemplateTypes::default()).await?;
        Ok(())
    }
}
