//! Server error type.

use bass_layout::LayoutError;
use bass_site::SiteError;

/// Error running the development server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("Cannot bind to {address}: {source}")]
    Bind {
        /// Address as `host:port`.
        address: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
    /// Templates could not be loaded for a rebuild.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// A rebuild failed.
    #[error(transparent)]
    Site(#[from] SiteError),
    /// The rebuild task panicked or was cancelled.
    #[error("Rebuild task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
