//! Pass-through and plain-text converters.

use std::sync::LazyLock;

use regex::Regex;

use crate::Converter;

static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

/// Pages that are already HTML.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlConverter;

impl Converter for HtmlConverter {
    fn convert(&self, text: &str) -> String {
        text.to_owned()
    }
}

/// Plain text: every run of blank lines starts a new paragraph.
///
/// The text is not escaped.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextConverter;

impl Converter for TextConverter {
    fn convert(&self, text: &str) -> String {
        format!("<p>{}</p>", PARAGRAPH_BREAK.replace_all(text, "</p><p>"))
    }
}
