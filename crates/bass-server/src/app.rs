//! Router construction.
//!
//! Serves the output directory behind the rebuild middleware.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(&state.output))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(state, rebuild_if_changed)),
        )
}

/// Whether a request path names a page rather than an asset.
fn is_page_request(path: &str) -> bool {
    path.ends_with(".html") || path.ends_with('/')
}

/// Rebuild the site before serving a page if its sources changed.
async fn rebuild_if_changed(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if is_page_request(request.uri().path()) {
        let mut monitor = state.monitor.lock().await;
        if let Err(e) = monitor.refresh().await {
            tracing::error!(error = %e, "Rebuild failed");
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::time::SystemTime;

    use axum::body::{Body, to_bytes};
    use axum::http::{self, StatusCode};
    use bass_config::Config;
    use bass_layout::TemplateTypes;
    use bass_site::Project;
    use pretty_assertions::assert_eq;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use super::*;
    use crate::monitor::SiteMonitor;

    fn state_for(dir: &Path, timestamp: SystemTime) -> Arc<AppState> {
        bass_site::create_project(dir).unwrap();
        fs::write(dir.join("input").join("index.md"), "title: Home\n---\nHello").unwrap();
        fs::write(dir.join("output").join("style.css"), "body {}").unwrap();
        let project = Project::from_config(&Config::default_with_base(dir));
        let monitor = SiteMonitor::new(Arc::new(project), TemplateTypes::default())
            .with_timestamp(timestamp);
        Arc::new(AppState {
            monitor: Mutex::new(monitor),
            output: dir.join("output"),
        })
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let request = http::Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_is_page_request() {
        assert!(is_page_request("/"));
        assert!(is_page_request("/blog/index.html"));
        assert!(is_page_request("/blog/"));
        assert!(!is_page_request("/style.css"));
        assert!(!is_page_request("/blog"));
    }

    #[tokio::test]
    async fn test_page_request_rebuilds() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(state_for(dir.path(), SystemTime::UNIX_EPOCH));

        let (status, body) = get(router, "/index.html").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello"));
    }

    #[tokio::test]
    async fn test_asset_request_does_not_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(state_for(dir.path(), SystemTime::UNIX_EPOCH));

        let (status, body) = get(router, "/style.css").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body {}");
        assert!(!dir.path().join("output").join("index.html").exists());
    }

    #[tokio::test]
    async fn test_unchanged_site_is_not_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let future = SystemTime::now() + std::time::Duration::from_secs(3600);
        let router = create_router(state_for(dir.path(), future));

        let (status, _) = get(router, "/index.html").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
