//! Registry of template file suffixes.

use std::collections::BTreeSet;

/// File suffixes recognized as templates.
///
/// Defaults to `html` with the aliases `jinja` and `j2`.
#[derive(Clone, Debug)]
pub struct TemplateTypes {
    suffixes: BTreeSet<String>,
}

impl Default for TemplateTypes {
    fn default() -> Self {
        let mut types = Self::empty();
        types.add("html");
        types.alias("html", "jinja");
        types.alias("html", "j2");
        types
    }
}

impl TemplateTypes {
    /// Registry without any suffix.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            suffixes: BTreeSet::new(),
        }
    }

    /// Register `suffix`; does nothing if it is already known.
    pub fn add(&mut self, suffix: &str) {
        if self.suffixes.insert(suffix.to_owned()) {
            tracing::debug!(suffix = %suffix, "Define new template type");
        } else {
            tracing::debug!(suffix = %suffix, "Cannot redefine template type");
        }
    }

    /// Register `to` as another suffix for the template type `from`.
    ///
    /// Does nothing if `to` is already known or `from` is not.
    pub fn alias(&mut self, from: &str, to: &str) {
        if self.suffixes.contains(to) {
            tracing::debug!(suffix = %to, "Cannot redefine template type");
        } else if self.suffixes.contains(from) {
            tracing::debug!(suffix = %to, from = %from, "Template type copied");
            self.suffixes.insert(to.to_owned());
        } else {
            tracing::debug!(suffix = %from, "No template type");
        }
    }

    /// Whether `suffix` is a template suffix.
    #[must_use]
    pub fn contains(&self, suffix: &str) -> bool {
        self.suffixes.contains(suffix)
    }

    /// All suffixes, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }
}
