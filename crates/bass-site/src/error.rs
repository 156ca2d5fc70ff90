//! Error types for site building and rendering.

use std::path::PathBuf;

use crate::metadata::MetadataError;

/// Error raised while building or rendering a site.
///
/// Every variant aborts the current build or render pass.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// A required project directory does not exist.
    #[error("Directory missing in project: {}", .0.display())]
    MissingDirectory(PathBuf),
    /// A new project was requested in a directory that has content.
    #[error("Directory is not empty: {}", .0.display())]
    NotEmpty(PathBuf),
    /// Filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory the operation was applied to.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Front matter could not be parsed or normalized.
    #[error("Invalid metadata in {path}: {source}")]
    Metadata {
        /// Page path relative to the input directory.
        path: String,
        /// Underlying error.
        #[source]
        source: MetadataError,
    },
    /// A page refers to a skin that has no template.
    #[error("Template '{skin}' for page {path} not available")]
    MissingTemplate {
        /// Requested template name.
        skin: String,
        /// Page path relative to the input directory.
        path: String,
    },
    /// A template failed to render.
    #[error("Template '{skin}' failed: {message}")]
    Template {
        /// Template name.
        skin: String,
        /// Error reported by the template engine.
        message: String,
    },
    /// An ignore pattern is not a valid glob.
    #[error("Invalid ignore pattern '{pattern}': {message}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Parser message.
        message: String,
    },
    /// A page operation was applied to a folder or asset.
    #[error("Node '{0}' is not a page")]
    NotAPage(String),
    /// A handler needs templates but was fired outside of rendering.
    #[error("No templates available while handling '{0}'")]
    NoLayout(String),
}

impl SiteError {
    /// Build a mapper from [`std::io::Error`] that records `path`.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
