//! Output records (Hayagriva entries)

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::value::RowId;

/// A value extracted for one target key
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Plain text
    Text(String),

    /// Numeric passthrough
    Number(serde_json::Number),

    /// Ordered list of names
    List(Vec<String>),

    /// URL with its retrieval date
    Url { value: String, date: String },

    /// Nested record resolved from a relation
    Record(FieldMap),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Number(number) => number.serialize(serializer),
            Self::List(items) => items.serialize(serializer),
            Self::Url { value, date } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("value", value)?;
                map.serialize_entry("date", date)?;
                map.end()
            }
            Self::Record(fields) => fields.serialize(serializer),
        }
    }
}

/// Target key to value map that keeps insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; an existing key is replaced in place
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A top-level bibliography entry
///
/// Serializes as a single-entry mapping `key -> fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    /// Identifying key (citation key)
    pub key: String,

    /// Row the record was built from
    pub row_id: RowId,

    /// Extracted fields in table order
    pub fields: FieldMap,
}

impl OutputRecord {
    pub fn new(key: impl Into<String>, row_id: RowId, fields: FieldMap) -> Self {
        Self {
            key: key.into(),
            row_id,
            fields,
        }
    }
}

impl Serialize for OutputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.fields)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_map_keeps_insertion_order() {
        let mut fields = FieldMap::new();
        fields.insert("type", FieldValue::text("article"));
        fields.insert("title", FieldValue::text("Title"));
        fields.insert("date", FieldValue::text("2020-01-01"));
        fields.insert("title", FieldValue::text("Better title"));

        let keys: Vec<&str> = fields.keys().collect();
        assert_eq!(keys, vec!["type", "title", "date"]);
        assert_eq!(fields.get("title").and_then(FieldValue::as_text), Some("Better title"));
    }

    #[test]
    fn record_serializes_under_its_key() {
        let mut fields = FieldMap::new();
        fields.insert("title", FieldValue::text("Notes"));
        fields.insert(
            "url",
            FieldValue::Url {
                value: "https://example.org".to_string(),
                date: "2024-01-01".to_string(),
            },
        );

        let record = OutputRecord::new("lovelace1843", RowId::new("row-1"), fields);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "lovelace1843": {
                    "title": "Notes",
                    "url": { "value": "https://example.org", "date": "2024-01-01" }
                }
            })
        );
    }
}
