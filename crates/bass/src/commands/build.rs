//! `bass build` command implementation.

use bass_layout::{TemplateSet, TemplateTypes};
use bass_site::{Project, SiteTree, verify_project};
use clap::Args;

use super::ProjectArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    project: ProjectArgs,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.project.load_config(None, None)?;
        let project = Project::from_config(&config);

        output.info(&format!("Input: {}", project.settings().input.display()));
        output.info(&format!("Output: {}", project.settings().output.display()));

        let tree = build_site(&project)?;
        output.success(&format!("Site built: {} nodes", tree.len()));
        Ok(())
    }
}

/// Verify the project, load its templates and build it.
pub(crate) fn build_site(project: &Project) -> Result<SiteTree, CliError> {
    verify_project(project.settings())?;
    let layout = TemplateSet::load(&project.settings().layout, &TemplateTypes::default())?;
    Ok(project.rebuild(&layout)?)
}
