//! Template seam between the site tree and a template engine.

use crate::error::SiteError;
use crate::tree::{NodeId, SiteTree};

/// Named templates that turn a node into HTML.
///
/// Implemented by the template set loaded from the layout directory; tests
/// use small in-memory implementations.
pub trait Layout: Send + Sync {
    /// Whether a template called `skin` exists.
    fn contains(&self, skin: &str) -> bool;

    /// Render `node` of `tree` with the template `skin`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::MissingTemplate`] for an unknown skin and
    /// [`SiteError::Template`] if the template fails.
    fn render(&self, skin: &str, tree: &SiteTree, node: NodeId) -> Result<String, SiteError>;
}
