//! Markup converters for Bass pages.
//!
//! A [`Converter`] turns the raw text of a page (its preview and its
//! content) into an HTML fragment. Converters are keyed by file extension;
//! [`default_converters`] returns the set every site starts with:
//!
//! | Extension | Converter            |
//! |-----------|----------------------|
//! | `md`      | [`MarkdownConverter`] |
//! | `html`    | [`HtmlConverter`]     |
//! | `txt`     | [`TextConverter`]     |
//!
//! # Example
//!
//! ```
//! use bass_markup::{Converter, MarkdownConverter};
//!
//! let html = MarkdownConverter::new().convert("**Bold** text");
//! assert_eq!(html, "<p><strong>Bold</strong> text</p>\n");
//! ```

mod markdown;
mod text;

use std::sync::Arc;

pub use markdown::MarkdownConverter;
pub use text::{HtmlConverter, TextConverter};

/// Converts page markup to HTML.
pub trait Converter: Send + Sync {
    /// Convert `text` to an HTML fragment.
    fn convert(&self, text: &str) -> String;
}

impl<F> Converter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn convert(&self, text: &str) -> String {
        self(text)
    }
}

/// Converters available out of the box, keyed by file extension.
#[must_use]
pub fn default_converters() -> Vec<(&'static str, Arc<dyn Converter>)> {
    vec![
        ("md", Arc::new(MarkdownConverter::new())),
        ("html", Arc::new(HtmlConverter)),
        ("txt", Arc::new(TextConverter)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_converter_extensions() {
        let extensions: Vec<_> = default_converters().into_iter().map(|(ext, _)| ext).collect();
        assert_eq!(extensions, vec!["md", "html", "txt"]);
    }

    #[test]
    fn test_closure_is_converter() {
        let upper = |text: &str| text.to_uppercase();
        assert_eq!(upper.convert("abc"), "ABC");
    }
}
