//! Page metadata: front matter parsing and completion.
//!
//! Front matter is the YAML block at the top of a page source. It is kept
//! as a raw [`FrontMatter`] mapping on the page until a page processor runs
//! [`MetaNormalizer::complete`], which produces a [`PageMeta`] where every
//! standard field is present:
//!
//! - `title`: derived from the file name when missing
//! - `tags`: a list (a string is split on whitespace or a configured delimiter)
//! - `skin`: `"default"` when missing
//! - `id`: empty when missing
//! - `date`, `time`, `datetime`: reconciled by [`fix_date_time`]
//!
//! Any other keys are passed through untouched in [`PageMeta::extra`].

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Raw front matter as parsed from YAML.
pub type FrontMatter = Mapping;

/// Template used when a page does not name one.
pub const DEFAULT_SKIN: &str = "default";

/// Keys with dedicated fields in [`PageMeta`].
const STANDARD_KEYS: [&str; 7] = ["title", "tags", "skin", "id", "date", "time", "datetime"];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Error type for metadata operations.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// YAML parsing error.
    #[error("{0}")]
    Parse(String),
    /// Front matter is valid YAML but not a mapping.
    #[error("front matter must be a mapping of keys to values")]
    NotAMapping,
    /// A standard field has a value of the wrong type.
    #[error("field '{field}' {message}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Normalized page metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageMeta {
    /// Page title.
    pub title: String,
    /// Tags in front matter order, without duplicates.
    pub tags: Vec<String>,
    /// Template name.
    pub skin: String,
    /// Identifier for `idref:` links (empty if none).
    pub id: String,
    /// Publication date.
    pub date: NaiveDate,
    /// Publication time.
    pub time: NaiveTime,
    /// `date` and `time` combined.
    pub datetime: NaiveDateTime,
    /// All other front matter keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Parse front matter from YAML content.
///
/// Empty content (or an explicit YAML `null`) yields an empty mapping.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or is not a mapping.
pub fn parse_front_matter(content: &str) -> Result<FrontMatter, MetadataError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(FrontMatter::new());
    }

    let value: Value = serde_yaml::from_str(trimmed)
        .map_err(|e| MetadataError::Parse(format!("Invalid YAML: {e}")))?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(FrontMatter::new()),
        _ => Err(MetadataError::NotAMapping),
    }
}

/// Completes raw front matter into [`PageMeta`].
#[derive(Clone, Debug, Default)]
pub struct MetaNormalizer {
    tag_separator: Option<String>,
}

impl MetaNormalizer {
    /// Create a normalizer that splits tag strings on whitespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split tag strings on `separator` instead of whitespace.
    ///
    /// An empty separator keeps whitespace splitting.
    #[must_use]
    pub fn with_tag_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        self.tag_separator = (!separator.is_empty()).then_some(separator);
        self
    }

    /// Complete metadata for the page at `source_path`.
    ///
    /// `created` is the creation time of the source file; it supplies the
    /// date and time when the front matter has neither.
    ///
    /// # Errors
    ///
    /// Returns an error if a standard field has an unusable value.
    pub fn complete(
        &self,
        raw: &FrontMatter,
        source_path: &str,
        created: NaiveDateTime,
    ) -> Result<PageMeta, MetadataError> {
        let title = match field(raw, "title") {
            Some(value) => scalar_to_string(value, "title")?,
            None => title_from_path(source_path),
        };
        let tags = match field(raw, "tags") {
            Some(value) => self.parse_tags(value)?,
            None => Vec::new(),
        };
        let skin = match field(raw, "skin") {
            Some(value) => scalar_to_string(value, "skin")?,
            None => DEFAULT_SKIN.to_owned(),
        };
        let id = match field(raw, "id") {
            Some(value) => scalar_to_string(value, "id")?,
            None => String::new(),
        };

        let date = field(raw, "date").map(parse_date).transpose()?;
        let time = field(raw, "time").map(parse_time).transpose()?;
        let datetime = field(raw, "datetime").map(parse_datetime).transpose()?;
        let (date, time, datetime) = fix_date_time(date, time, datetime, created);

        let extra = raw
            .iter()
            .filter_map(|(key, value)| {
                let key = key.as_str()?;
                (!STANDARD_KEYS.contains(&key)).then(|| (key.to_owned(), value.clone()))
            })
            .collect();

        Ok(PageMeta {
            title,
            tags,
            skin,
            id,
            date,
            time,
            datetime,
            extra,
        })
    }

    fn parse_tags(&self, value: &Value) -> Result<Vec<String>, MetadataError> {
        let tags: Vec<String> = match value {
            Value::String(text) => match &self.tag_separator {
                Some(sep) => text.split(sep.as_str()).map(str::trim).map(str::to_owned).collect(),
                None => text.split_whitespace().map(str::to_owned).collect(),
            },
            Value::Sequence(items) => items
                .iter()
                .map(|item| scalar_to_string(item, "tags"))
                .collect::<Result<_, _>>()?,
            _ => {
                return Err(MetadataError::InvalidField {
                    field: "tags",
                    message: "must be a string or a list".to_owned(),
                });
            }
        };

        let mut unique = Vec::with_capacity(tags.len());
        for tag in tags {
            if !tag.is_empty() && !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        Ok(unique)
    }
}

/// Reconcile `date`, `time` and `datetime` into three consistent values.
///
/// - A `datetime` fills in a missing `date`, and a missing `time` if it
///   carries one.
/// - Once both `date` and `time` are known, `datetime` is their combination.
/// - With only a `date`, the time is midnight.
/// - Otherwise all three come from `created`.
#[must_use]
pub fn fix_date_time(
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    datetime: Option<(NaiveDate, Option<NaiveTime>)>,
    created: NaiveDateTime,
) -> (NaiveDate, NaiveTime, NaiveDateTime) {
    let (date, time) = match datetime {
        Some((dt_date, dt_time)) => (date.or(Some(dt_date)), time.or(dt_time)),
        None => (date, time),
    };

    match (date, time) {
        (Some(date), Some(time)) => (date, time, date.and_time(time)),
        (Some(date), None) => (date, NaiveTime::MIN, date.and_time(NaiveTime::MIN)),
        _ => (created.date(), created.time(), created),
    }
}

/// Derive a title from a file name: `my-First_post.md` becomes `My first post`.
#[must_use]
pub fn title_from_path(source_path: &str) -> String {
    let stem = Path::new(source_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let spaced = stem.replace(['-', '_'], " ");

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Look up a key, treating an explicit `null` as absent.
fn field<'a>(raw: &'a FrontMatter, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

fn scalar_to_string(value: &Value, field: &'static str) -> Result<String, MetadataError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(MetadataError::InvalidField {
            field,
            message: "must be a single value".to_owned(),
        }),
    }
}

fn as_text<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, MetadataError> {
    value.as_str().map(str::trim).ok_or(MetadataError::InvalidField {
        field,
        message: "must be a string".to_owned(),
    })
}

fn parse_date(value: &Value) -> Result<NaiveDate, MetadataError> {
    let text = as_text(value, "date")?;
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| MetadataError::InvalidField {
        field: "date",
        message: format!("'{text}' is not a YYYY-MM-DD date: {e}"),
    })
}

fn parse_time(value: &Value) -> Result<NaiveTime, MetadataError> {
    let text = as_text(value, "time")?;
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .ok_or_else(|| MetadataError::InvalidField {
            field: "time",
            message: format!("'{text}' is not a HH:MM[:SS] time"),
        })
}

/// Parse a `datetime` value; a plain date carries no time component.
fn parse_datetime(value: &Value) -> Result<(NaiveDate, Option<NaiveTime>), MetadataError> {
    let text = as_text(value, "datetime")?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        let naive = dt.naive_local();
        return Ok((naive.date(), Some(naive.time())));
    }
    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Ok((naive.date(), Some(naive.time())));
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(|date| (date, None))
        .map_err(|_| MetadataError::InvalidField {
            field: "datetime",
            message: format!("'{text}' is not a date or date-time"),
        })
}
