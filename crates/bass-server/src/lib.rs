//! Development HTTP server for Bass sites.
//!
//! The server serves the output directory of a project. Before answering a
//! request for a page (a path ending in `.html` or `/`) it checks whether a
//! file under the input or layout directory changed since the last build and
//! rebuilds the site if so. Requests for other files never wait for a rebuild.
//!
//! # Quick Start
//!
//! ```no_run
//! use bass_config::Config;
//! use bass_layout::TemplateTypes;
//! use bass_server::{ServerConfig, run_server};
//! use bass_site::Project;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None, None)?;
//!     let project = Project::from_config(&config);
//!     run_server(ServerConfig::from_config(&config), project, TemplateTypes::default()).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (bass-server)
//!                        │
//!                        ├─► rebuild middleware ──► SiteMonitor ──► Project::rebuild
//!                        │                              (spawn_blocking)
//!                        │
//!                        └─► ServeDir (output directory)
//! ```

mod app;
mod error;
mod monitor;
mod state;

use std::sync::Arc;

use bass_layout::TemplateTypes;
use bass_site::Project;
use tokio::sync::Mutex;

pub use error::ServerError;

use monitor::SiteMonitor;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host name or address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Server configuration from the `[server]` section.
    #[must_use]
    pub fn from_config(config: &bass_config::Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
        }
    }
}

/// Serve the output directory of `project` until Ctrl-C.
///
/// The site is expected to be built already; it is rebuilt when the input or
/// layout directory changes. Rebuild errors are logged and the previous
/// output keeps being served.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(
    config: ServerConfig,
    project: Project,
    types: TemplateTypes,
) -> Result<(), ServerError> {
    let output = project.settings().output.clone();
    let monitor = SiteMonitor::new(Arc::new(project), types);
    let state = Arc::new(AppState {
        monitor: Mutex::new(monitor),
        output,
    });
    let app = app::create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %address, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
