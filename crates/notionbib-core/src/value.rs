//! Typed property values and database rows
//!
//! A row is a schema-less property bag: every property carries its own type
//! tag. `TypedValue` closes the set of tags the exporter understands, so
//! extraction is an exhaustive match instead of a lookup table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a database row (a Notion page id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        RowId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One segment of a rich text or title property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    pub plain_text: String,
}

impl TextSegment {
    pub fn new(plain_text: impl Into<String>) -> Self {
        Self {
            plain_text: plain_text.into(),
        }
    }
}

/// Payload of a date property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Start date (ISO 8601, as delivered by the database)
    pub start: String,

    /// Optional end date for ranges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// How the rows referenced by a relation property are interpreted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// References to person rows, rendered as an author name list
    Authors,

    /// Reference to a containing work, rendered as a nested record
    Parent,

    /// Relation id not recognized; carries the raw id
    Unknown(String),
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authors => write!(f, "authors"),
            Self::Parent => write!(f, "parent"),
            Self::Unknown(id) => write!(f, "unknown({})", id),
        }
    }
}

/// A relation property: foreign row references plus their interpretation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationValue {
    pub refs: Vec<RowId>,
    pub kind: RelationKind,

    /// The source listed only part of the references
    #[serde(default)]
    pub truncated: bool,
}

impl RelationValue {
    pub fn new(kind: RelationKind, refs: Vec<RowId>) -> Self {
        Self {
            refs,
            kind,
            truncated: false,
        }
    }

    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }
}

/// A typed property payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    /// Ordered rich text segments
    RichText(Vec<TextSegment>),

    /// Display name of the selected option, if any
    Select(Option<String>),

    /// Ordered title segments
    Title(Vec<TextSegment>),

    /// Bare URL, possibly unset
    Url(Option<String>),

    /// Numeric value, possibly unset
    Number(Option<serde_json::Number>),

    /// Date payload, possibly unset
    Date(Option<DateRange>),

    /// References to other rows
    Relation(RelationValue),

    /// A type tag the exporter does not read (formula, checkbox, ...)
    Unsupported(String),
}

impl TypedValue {
    /// Rich text made of a single segment
    pub fn rich_text(text: impl Into<String>) -> Self {
        Self::RichText(vec![TextSegment::new(text)])
    }

    /// Title made of a single segment
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title(vec![TextSegment::new(text)])
    }

    pub fn select(name: impl Into<String>) -> Self {
        Self::Select(Some(name.into()))
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(Some(url.into()))
    }

    pub fn date(start: impl Into<String>) -> Self {
        Self::Date(Some(DateRange {
            start: start.into(),
            end: None,
        }))
    }

    pub fn number(n: impl Into<serde_json::Number>) -> Self {
        Self::Number(Some(n.into()))
    }

    pub fn relation(kind: RelationKind, refs: impl IntoIterator<Item = RowId>) -> Self {
        Self::Relation(RelationValue::new(kind, refs.into_iter().collect()))
    }
}

/// One database row with its named, typed properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub properties: HashMap<String, TypedValue>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: RowId::new(id),
            properties: HashMap::new(),
        }
    }

    /// Add a property (builder style)
    pub fn with_property(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Look up a property by its source field name
    pub fn property(&self, name: &str) -> Option<&TypedValue> {
        self.properties.get(name)
    }
}
