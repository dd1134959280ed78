//! Typed value extractors
//!
//! One extractor per type tag. All of them are pure except relations, which
//! are handed back to the caller as [`Extracted::Relation`] so the resolver
//! can fetch the referenced rows.
//!
//! Blank text counts as absent: a present-but-empty database field is as
//! missing as an unset one.

use notionbib_core::{DateRange, FieldValue, RelationValue, TextSegment, TypedValue};

/// Result of dispatching one typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<'a> {
    /// Value is final; `None` means absent
    Ready(Option<FieldValue>),

    /// Value needs relation resolution
    Relation(&'a RelationValue),
}

impl Extracted<'_> {
    /// The ready value, treating unresolved relations as absent
    pub fn into_ready(self) -> Option<FieldValue> {
        match self {
            Self::Ready(value) => value,
            Self::Relation(_) => None,
        }
    }
}

/// Dispatch a typed value to its extractor
///
/// `companion` is only read for URLs: the retrieval-date property that turns
/// a bare URL into a `{ value, date }` composite.
pub fn extract<'a>(value: &'a TypedValue, companion: Option<&TypedValue>) -> Extracted<'a> {
    let ready = match value {
        TypedValue::RichText(segments) => rich_text(segments),
        TypedValue::Select(option) => select(option.as_deref()),
        TypedValue::Title(segments) => title(segments),
        TypedValue::Url(url) => self::url(url.as_deref(), companion),
        TypedValue::Number(number) => self::number(number.as_ref()),
        TypedValue::Date(date) => self::date(date.as_ref()),
        TypedValue::Relation(relation) => return Extracted::Relation(relation),
        TypedValue::Unsupported(tag) => {
            tracing::debug!(tag = %tag, "skipping unsupported property type");
            None
        }
    };

    Extracted::Ready(ready)
}

fn non_blank(text: &str) -> Option<FieldValue> {
    if text.is_empty() {
        None
    } else {
        Some(FieldValue::text(text))
    }
}

/// First segment's content
pub fn rich_text(segments: &[TextSegment]) -> Option<FieldValue> {
    segments.first().and_then(|s| non_blank(&s.plain_text))
}

/// Selected option's display name
pub fn select(option: Option<&str>) -> Option<FieldValue> {
    option.and_then(non_blank)
}

/// First segment with non-empty content
pub fn title(segments: &[TextSegment]) -> Option<FieldValue> {
    segments
        .iter()
        .find(|s| !s.plain_text.is_empty())
        .map(|s| FieldValue::text(&s.plain_text))
}

/// URL, paired with the companion retrieval date when it has one
pub fn url(url: Option<&str>, companion: Option<&TypedValue>) -> Option<FieldValue> {
    let url = url.filter(|u| !u.is_empty())?;

    let date = companion
        .and_then(|c| extract(c, None).into_ready())
        .and_then(|d| match d {
            FieldValue::Text(text) => Some(text),
            FieldValue::Number(n) => Some(n.to_string()),
            _ => None,
        });

    match date {
        Some(date) => Some(FieldValue::Url {
            value: url.to_string(),
            date,
        }),
        None => Some(FieldValue::text(url)),
    }
}

pub fn number(number: Option<&serde_json::Number>) -> Option<FieldValue> {
    number.cloned().map(FieldValue::Number)
}

/// Start of the date range
pub fn date(date: Option<&DateRange>) -> Option<FieldValue> {
    date.and_then(|d| non_blank(&d.start))
}
