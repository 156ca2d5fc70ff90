//! Markdown to HTML conversion with pulldown-cmark.

use pulldown_cmark::{Options, Parser, html};

use crate::Converter;

/// Markdown converter.
///
/// GitHub Flavored Markdown extensions (tables, strikethrough, task lists)
/// are enabled by default, footnotes and definition lists always.
#[derive(Clone, Debug)]
pub struct MarkdownConverter {
    gfm: bool,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Create a converter with GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let base = Options::ENABLE_FOOTNOTES | Options::ENABLE_DEFINITION_LIST;
        if self.gfm {
            base | Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            base
        }
    }
}

impl Converter for MarkdownConverter {
    fn convert(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, self.parser_options());
        let mut output = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_paragraph_and_heading() {
        let html = MarkdownConverter::new().convert("# Title\n\nSome *text*.");
        assert_eq!(html, "<h1>Title</h1>\n<p>Some <em>text</em>.</p>\n");
    }

    #[test]
    fn test_table_with_gfm() {
        let html = MarkdownConverter::new().convert("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_table_without_gfm() {
        let html = MarkdownConverter::new()
            .with_gfm(false)
            .convert("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_link_kept_verbatim() {
        let html = MarkdownConverter::new().convert("[intro](idref:intro)");
        assert_eq!(html, "<p><a href=\"idref:intro\">intro</a></p>\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(MarkdownConverter::new().convert(""), "");
    }
}
