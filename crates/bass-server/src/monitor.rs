//! Rebuild-on-change for the development server.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use bass_layout::{TemplateSet, TemplateTypes};
use bass_site::Project;

use crate::error::ServerError;

/// Watches the input and layout directories of a project by modification time.
pub(crate) struct SiteMonitor {
    project: Arc<Project>,
    types: TemplateTypes,
    checklist: Vec<PathBuf>,
    timestamp: SystemTime,
}

impl SiteMonitor {
    /// Monitor `project`, treating the current time as the last build.
    pub(crate) fn new(project: Arc<Project>, types: TemplateTypes) -> Self {
        let settings = project.settings();
        let checklist = vec![settings.input.clone(), settings.layout.clone()];
        Self {
            project,
            types,
            checklist,
            timestamp: SystemTime::now(),
        }
    }

    /// Replace the time of the last build.
    #[cfg(test)]
    pub(crate) fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Rebuild the site if a watched file changed since the last build.
    ///
    /// Returns whether a rebuild happened. A failed rebuild still counts as
    /// the last build, so it is retried only after a further change.
    pub(crate) async fn refresh(&mut self) -> Result<bool, ServerError> {
        let project = Arc::clone(&self.project);
        let types = self.types.clone();
        let checklist = self.checklist.clone();
        let since = self.timestamp;
        let started = SystemTime::now();

        let outcome = tokio::task::spawn_blocking(move || {
            if !changed(&checklist, since) {
                return None;
            }
            tracing::info!("Rebuilding site");
            Some(rebuild(&project, &types))
        })
        .await?;

        match outcome {
            None => Ok(false),
            Some(result) => {
                self.timestamp = started;
                result.map(|()| true)
            }
        }
    }
}

fn rebuild(project: &Project, types: &TemplateTypes) -> Result<(), ServerError> {
    let layout = TemplateSet::load(&project.settings().layout, types)?;
    let tree = project.rebuild(&layout)?;
    tracing::info!(nodes = tree.len(), "Site rebuilt");
    Ok(())
}

/// Whether any file under the `checklist` directories is newer than `since`.
fn changed(checklist: &[PathBuf], since: SystemTime) -> bool {
    checklist.iter().any(|dir| newer_than(dir, since))
}

fn newer_than(dir: &Path, since: SystemTime) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "Cannot read directory");
        return false;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if metadata.is_dir() {
            if newer_than(&path, since) {
                return true;
            }
        } else if metadata.modified().is_ok_and(|modified| modified > since) {
            tracing::debug!(path = %path.display(), "File has changed");
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bass_config::Config;

    use super::*;

    fn project_in(dir: &Path) -> Project {
        bass_site::create_project(dir).unwrap();
        fs::write(dir.join("input").join("index.md"), "title: Home\n---\nHello").unwrap();
        Project::from_config(&Config::default_with_base(dir))
    }

    #[test]
    fn test_changed_detects_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("page.md"), "x").unwrap();

        let checklist = vec![dir.path().to_path_buf()];
        assert!(changed(&checklist, SystemTime::UNIX_EPOCH));
        assert!(!changed(&checklist, SystemTime::now() + Duration::from_secs(3600)));
    }

    #[test]
    fn test_changed_ignores_missing_directory() {
        let checklist = vec![PathBuf::from("/nonexistent/input")];
        assert!(!changed(&checklist, SystemTime::UNIX_EPOCH));
    }

    #[tokio::test]
    async fn test_refresh_rebuilds_once() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_in(dir.path());
        let mut monitor = SiteMonitor::new(Arc::new(project), TemplateTypes::default())
            .with_timestamp(SystemTime::UNIX_EPOCH);

        assert!(monitor.refresh().await.unwrap());
        assert!(dir.path().join("output").join("index.html").is_file());

        monitor.timestamp = SystemTime::now() + Duration::from_secs(3600);
        assert!(!monitor.refresh().await.unwrap());
    }

    #[tokio::test]
    async fn test_refresh_failure_updates_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_in(dir.path());
        fs::remove_file(dir.path().join("layout").join("default.html")).unwrap();
        fs::write(dir.path().join("layout").join("other.html"), "x").unwrap();
        let mut monitor = SiteMonitor::new(Arc::new(project), TemplateTypes::default())
            .with_timestamp(SystemTime::UNIX_EPOCH);

        let err = monitor.refresh().await.unwrap_err();
        assert!(matches!(err, ServerError::Layout(_)));
        assert!(monitor.timestamp > SystemTime::UNIX_EPOCH);
    }
}
