//! CLI error types.

use bass_config::ConfigError;
use bass_layout::LayoutError;
use bass_server::ServerError;
use bass_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Layout(#[from] LayoutError),

    #[error("{0}")]
    Server(#[from] ServerError),
}
