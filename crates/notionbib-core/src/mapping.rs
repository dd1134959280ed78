//! Field mapping table: which source field feeds which Hayagriva key
//!
//! The table is ordered. Output records list their keys in table order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::ConfigError;

/// Declarative rule mapping one source field to one target key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Hayagriva key written to the output
    #[serde(rename = "target")]
    pub target_key: String,

    /// Database property name read from the row
    #[serde(rename = "source")]
    pub source_key: String,

    /// Missing value emits a diagnostic
    #[serde(default)]
    pub mandatory: bool,

    /// Wrap text values in quote delimiters
    #[serde(default)]
    pub escape: bool,

    /// Companion retrieval-date property (URL fields only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_companion: Option<String>,
}

impl FieldMapping {
    /// Create an optional, unescaped mapping
    pub fn new(target_key: impl Into<String>, source_key: impl Into<String>) -> Self {
        Self {
            target_key: target_key.into(),
            source_key: source_key.into(),
            mandatory: false,
            escape: false,
            date_companion: None,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn escaped(mut self) -> Self {
        self.escape = true;
        self
    }

    pub fn with_date_companion(mut self, source_key: impl Into<String>) -> Self {
        self.date_companion = Some(source_key.into());
        self
    }
}

/// Ordered list of field mappings with unique source keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    mappings: Vec<FieldMapping>,
}

impl FieldTable {
    /// Build a table, rejecting duplicate source keys
    pub fn new(mappings: Vec<FieldMapping>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for mapping in &mappings {
            if !seen.insert(mapping.source_key.as_str()) {
                return Err(ConfigError::DuplicateSourceKey(mapping.source_key.clone()));
            }
        }

        Ok(Self { mappings })
    }

    /// The Hayagriva table for the bibliography database
    pub fn hayagriva() -> Self {
        Self {
            mappings: vec![
                FieldMapping::new("type", "Type").mandatory(),
                FieldMapping::new("ISSN", "Issn"),
                FieldMapping::new("title", "Title").mandatory(),
                FieldMapping::new("doi", "DOI").escaped(),
                FieldMapping::new("author", "Autoren").mandatory(),
                FieldMapping::new("date", "Datum").mandatory(),
                FieldMapping::new("publisher", "Verlag"),
                FieldMapping::new("issue", "Issue"),
                FieldMapping::new("isbn", "ISBN"),
                FieldMapping::new("volume", "Volume"),
                FieldMapping::new("organization", "Organisation"),
                FieldMapping::new("url", "URL").with_date_companion("Abrufdatum"),
                FieldMapping::new("location", "Ort"),
                FieldMapping::new("parent", "Parent"),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Find the mapping reading a given source field
    pub fn by_source(&self, source_key: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.source_key == source_key)
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::hayagriva()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hayagriva_table_order_and_flags() {
        let table = FieldTable::hayagriva();
        let targets: Vec<&str> = table.iter().map(|m| m.target_key.as_str()).collect();

        assert_eq!(targets.first(), Some(&"type"));
        assert_eq!(targets.last(), Some(&"parent"));
        assert_eq!(table.len(), 14);

        let mandatory: Vec<&str> = table
            .iter()
            .filter(|m| m.mandatory)
            .map(|m| m.target_key.as_str())
            .collect();
        assert_eq!(mandatory, vec!["type", "title", "author", "date"]);

        assert!(table.by_source("DOI").unwrap().escape);
        assert_eq!(
            table.by_source("URL").unwrap().date_companion.as_deref(),
            Some("Abrufdatum")
        );
    }

    #[test]
    fn duplicate_source_keys_rejected() {
        let result = FieldTable::new(vec![
            FieldMapping::new("title", "Title"),
            FieldMapping::new("short-title", "Title"),
        ]);

        assert!(matches!(result, Err(ConfigError::DuplicateSourceKey(key)) if key == "Title"));
    }

    #[test]
    fn mapping_from_toml() {
        let mapping: FieldMapping = toml::from_str(
            r#"
            target = "url"
            source = "Link"
            date_companion = "Accessed"
            "#,
        )
        .unwrap();

        assert_eq!(mapping.target_key, "url");
        assert!(!mapping.mandatory);
        assert_eq!(mapping.date_companion.as_deref(), Some("Accessed"));
    }
}
