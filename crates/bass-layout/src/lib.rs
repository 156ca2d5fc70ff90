//! Templates for rendering Bass pages.
//!
//! A [`TemplateSet`] is loaded from the layout directory of a project. Every
//! regular file whose suffix is a registered [`TemplateTypes`] entry becomes
//! a template named after the file stem, so `layout/post.html` renders pages
//! with `skin: post`. A `default` template is required.
//!
//! Templates are [minijinja] templates with HTML auto-escaping. They see two
//! variables:
//!
//! - `this`: the node being rendered (see [`bass_site::NodeView`])
//! - `site`: site-wide values (`root_url`)
//!
//! Converted page text is HTML, so templates print it with the `safe`
//! filter: `{{ this.content | safe }}`.

mod types;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use bass_site::{Layout, NodeId, NodeView, SiteError, SiteTree, split_extension};
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Output, State, Value, context, escape_formatter};

pub use types::TemplateTypes;

/// Name of the template every layout must provide.
pub const DEFAULT_TEMPLATE_NAME: &str = "default";

/// Error loading a template set.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The layout directory could not be read.
    #[error("Cannot read layout directory {}: {source}", path.display())]
    Io {
        /// Layout directory.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// No usable `default` template was found.
    #[error("There is no default template in {}", .0.display())]
    NoDefaultTemplate(PathBuf),
}

/// Compiled templates keyed by name.
pub struct TemplateSet {
    env: Environment<'static>,
    names: BTreeSet<String>,
}

impl std::fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateSet").field("names", &self.names).finish()
    }
}

impl TemplateSet {
    /// Load the templates in `dir` (not recursive).
    ///
    /// Files that fail to compile are logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails if `dir` cannot be read or there is no `default` template.
    pub fn load(dir: &Path, types: &TemplateTypes) -> Result<Self, LayoutError> {
        let io_error = |source| LayoutError::Io {
            path: dir.to_path_buf(),
            source,
        };
        tracing::debug!(dir = %dir.display(), "Scanning for templates");
        tracing::debug!(types = %types.iter().collect::<Vec<_>>().join(" "), "Template types");

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io_error)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(io_error)?;
        paths.sort();

        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_formatter(html_formatter);
        let mut names = BTreeSet::new();

        for path in paths {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let (name, suffix) = split_extension(&file_name);
            if !path.is_file() || !types.contains(suffix.trim_start_matches('.')) {
                continue;
            }

            let source = match fs::read_to_string(&path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "Cannot read template");
                    continue;
                }
            };
            match env.add_template_owned(name.to_owned(), source) {
                Ok(()) => {
                    tracing::debug!(name = %name, file = %file_name, "Template loaded");
                    names.insert(name.to_owned());
                }
                Err(e) => {
                    tracing::warn!(name = %name, file = %file_name, error = %e, "Error in template");
                }
            }
        }

        if !names.contains(DEFAULT_TEMPLATE_NAME) {
            return Err(LayoutError::NoDefaultTemplate(dir.to_path_buf()));
        }
        Ok(Self { env, names })
    }

    /// Names of the loaded templates.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Layout for TemplateSet {
    fn contains(&self, skin: &str) -> bool {
        self.names.contains(skin)
    }

    fn render(&self, skin: &str, tree: &SiteTree, node: NodeId) -> Result<String, SiteError> {
        let template = self
            .env
            .get_template(skin)
            .map_err(|_| SiteError::MissingTemplate {
                skin: skin.to_owned(),
                path: tree.node(node).path.clone(),
            })?;
        template
            .render(context! {
                this => NodeView::new(tree, node),
                site => context! { root_url => tree.root_url() },
            })
            .map_err(|e| SiteError::Template {
                skin: skin.to_owned(),
                message: e.to_string(),
            })
    }
}

/// Escape strings for HTML without touching `/`, so URLs print as written.
fn html_formatter(
    out: &mut Output<'_>,
    state: &State<'_, '_>,
    value: &Value,
) -> Result<(), Error> {
    if matches!(state.auto_escape(), AutoEscape::Html)
        && !value.is_safe()
        && let Some(text) = value.as_str()
    {
        return out
            .write_str(&escape_html(text))
            .map_err(|_| Error::new(ErrorKind::WriteFailure, "cannot write template output"));
    }
    escape_formatter(out, state, value)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
