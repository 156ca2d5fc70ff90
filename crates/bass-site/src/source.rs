//! Page source files.
//!
//! A page source is UTF-8 text split by lines consisting of `---`:
//!
//! ```text
//! title: Hello        <- front matter (YAML)
//! ---
//! Short teaser.       <- preview (only with two or more separators)
//! ---
//! Full text.          <- content
//! ```
//!
//! Without a separator the whole file is content. With one, the parts are
//! front matter and content. With more, the third and later parts are
//! joined back together as content. A `---` line at the very top of the file
//! opens the front matter and is dropped.

use std::path::Path;

use crate::error::SiteError;

const SEPARATOR: &str = "---";

/// Parts of a page source file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageSource {
    /// Raw YAML front matter.
    pub front_matter: String,
    /// Raw preview text.
    pub preview: String,
    /// Raw content text.
    pub content: String,
}

impl PageSource {
    /// Split source text into its parts.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n");
        let body = normalized
            .strip_prefix("---\n")
            .unwrap_or(&normalized);

        let mut parts: Vec<Vec<&str>> = vec![Vec::new()];
        for line in body.split('\n') {
            if line == SEPARATOR {
                parts.push(Vec::new());
            } else if let Some(last) = parts.last_mut() {
                last.push(line);
            }
        }
        let mut parts: Vec<String> = parts.into_iter().map(|lines| lines.join("\n")).collect();

        match parts.len() {
            1 => Self {
                content: parts.remove(0),
                ..Self::default()
            },
            2 => {
                let content = parts.remove(1);
                Self {
                    front_matter: parts.remove(0),
                    preview: String::new(),
                    content,
                }
            }
            _ => {
                let content = parts[2..].join("\n---\n");
                parts.truncate(2);
                let preview = parts.remove(1);
                Self {
                    front_matter: parts.remove(0),
                    preview,
                    content,
                }
            }
        }
    }

    /// Read and split the source file at `path`.
    pub fn read(path: &Path) -> Result<Self, SiteError> {
        let text = std::fs::read_to_string(path).map_err(SiteError::io(path))?;
        Ok(Self::parse(&text))
    }
}
