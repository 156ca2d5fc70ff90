//! Application state.
//!
//! Shared state for the router and middleware.

use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::monitor::SiteMonitor;

/// Application state shared across all requests.
pub(crate) struct AppState {
    /// Change monitor; locking it serializes rebuilds.
    pub(crate) monitor: Mutex<SiteMonitor>,
    /// Directory served to clients.
    pub(crate) output: PathBuf,
}
