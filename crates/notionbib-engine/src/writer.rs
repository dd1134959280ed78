//! Document writer
//!
//! Renders records as one YAML mapping: a top-level entry per record key,
//! fields in table order, URL composites and parent records as nested
//! mappings.

use notionbib_core::OutputRecord;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::path::PathBuf;

/// Errors that can occur when writing the document
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to render document: {0}")]
    Render(#[from] serde_yaml::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persists an ordered collection of records
pub trait DocumentWriter {
    fn write(&self, records: &[OutputRecord]) -> Result<(), WriteError>;
}

/// Records viewed as a single mapping document
struct Document<'a>(&'a [OutputRecord]);

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for record in self.0 {
            map.serialize_entry(&record.key, &record.fields)?;
        }
        map.end()
    }
}

/// Render records as a YAML document
pub fn render_yaml(records: &[OutputRecord]) -> Result<String, WriteError> {
    if records.is_empty() {
        return Ok(String::new());
    }

    Ok(serde_yaml::to_string(&Document(records))?)
}

/// Writes the YAML document to a file
#[derive(Debug, Clone)]
pub struct YamlFileWriter {
    path: PathBuf,
}

impl YamlFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentWriter for YamlFileWriter {
    fn write(&self, records: &[OutputRecord]) -> Result<(), WriteError> {
        let yaml = render_yaml(records)?;

        std::fs::write(&self.path, yaml).map_err(|source| WriteError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), records = records.len(), "wrote document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notionbib_core::{FieldMap, FieldValue, RowId};
    use pretty_assertions::assert_eq;

    fn record(key: &str, fields: Vec<(&str, FieldValue)>) -> OutputRecord {
        let mut map = FieldMap::new();
        for (k, v) in fields {
            map.insert(k, v);
        }
        OutputRecord::new(key, RowId::new(format!("row-{}", key)), map)
    }

    #[test]
    fn renders_records_in_order_with_nested_mappings() {
        let mut parent = FieldMap::new();
        parent.insert("type", FieldValue::text("book"));
        parent.insert("title", FieldValue::text("Collected Works"));

        let records = vec![
            record(
                "zeta",
                vec![
                    ("type", FieldValue::text("article")),
                    ("author", FieldValue::List(vec!["Lovelace, Ada".to_string()])),
                    (
                        "url",
                        FieldValue::Url {
                            value: "https://example.org".to_string(),
                            date: "2024-01-01".to_string(),
                        },
                    ),
                    ("parent", FieldValue::Record(parent)),
                ],
            ),
            record("alpha", vec![("volume", FieldValue::Number(3.into()))]),
        ];

        let yaml = render_yaml(&records).unwrap();
        let expected = "\
zeta:
  type: article
  author:
  - Lovelace, Ada
  url:
    value: https://example.org
    date: 2024-01-01
  parent:
    type: book
    title: Collected Works
alpha:
  volume: 3
";
        assert_eq!(yaml, expected);
    }

    #[test]
    fn empty_document() {
        assert_eq!(render_yaml(&[]).unwrap(), "");
    }

    #[test]
    fn writes_file() {
        let path = std::env::temp_dir().join(format!("notionbib-writer-{}.yml", std::process::id()));
        let writer = YamlFileWriter::new(&path);

        writer
            .write(&[record("k", vec![("title", FieldValue::text("T"))])])
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "k:\n  title: T\n");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let writer = YamlFileWriter::new("/nonexistent-dir/for/notionbib/out.yml");
        let result = writer.write(&[record("k", vec![])]);
        assert!(matches!(result, Err(WriteError::Io { .. })));
    }
}
