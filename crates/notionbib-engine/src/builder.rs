//! Record builder
//!
//! Walks the field table in order, extracts each present property and applies
//! the mandatory and escape rules. Top-level records are keyed by the key
//! field; nested records (built for parent relations) are returned unwrapped.

use notionbib_core::{Diagnostic, DiagnosticCode, FieldMap, FieldValue, OutputRecord, Row, TypedValue};
use notionbib_source::RowSource;
use std::future::Future;
use std::pin::Pin;

use crate::context::{BuildScope, ExportSettings};
use crate::extract::{extract, Extracted};
use crate::resolver::RelationResolver;

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A top-level record together with the diagnostics raised while building it
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRecord {
    pub record: OutputRecord,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds output records from rows
pub struct RecordBuilder<'a> {
    source: &'a dyn RowSource,
    settings: &'a ExportSettings,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(source: &'a dyn RowSource, settings: &'a ExportSettings) -> Self {
        Self { source, settings }
    }

    /// Build a top-level record
    ///
    /// The key is derived first so every diagnostic can name it.
    pub async fn build(&self, row: &Row) -> BuiltRecord {
        let mut scope = BuildScope::new(row.id.clone(), &self.settings.severity);

        let key = self.record_key(row, &mut scope).await;
        scope.set_record_key(key.clone());

        let fields = self.build_fields(row, &mut scope).await;

        tracing::debug!(record = %key, fields = fields.len(), "built record");

        BuiltRecord {
            record: OutputRecord::new(key, row.id.clone(), fields),
            diagnostics: scope.into_diagnostics(),
        }
    }

    /// Build a nested record inside an existing scope
    pub async fn build_nested(&self, row: &Row, scope: &mut BuildScope<'_>) -> FieldMap {
        scope.enter_row(row.id.clone());
        let fields = self.build_fields(row, scope).await;
        scope.leave_row();
        fields
    }

    async fn record_key(&self, row: &Row, scope: &mut BuildScope<'_>) -> String {
        let key_field = &self.settings.key_field;

        let key = match row.property(key_field) {
            Some(value) => {
                scope.enter_field(key_field);
                let key = self.extract_value(value, None, scope).await;
                scope.leave_field();
                key.and_then(key_text)
            }
            None => None,
        };

        match key {
            Some(key) => key,
            None => {
                let fallback = row.id.to_string();
                scope.report(
                    Diagnostic::new(
                        DiagnosticCode::MissingRecordKey,
                        fallback.clone(),
                        format!(
                            "Row {} has no value in key field '{}', using the row id",
                            row.id, key_field
                        ),
                    )
                    .with_field(key_field.clone())
                    .with_row(row.id.clone()),
                );
                fallback
            }
        }
    }

    /// Extract every mapped field of a row
    ///
    /// Boxed because relation resolution can build nested records.
    pub(crate) fn build_fields<'s, 'x: 's>(
        &'s self,
        row: &'s Row,
        scope: &'s mut BuildScope<'x>,
    ) -> BoxFuture<'s, FieldMap>
    where
        'a: 's,
    {
        Box::pin(async move {
            let mut fields = FieldMap::new();

            for mapping in self.settings.table.iter() {
                // Not on this row at all: nothing to report
                let Some(value) = row.property(&mapping.source_key) else {
                    continue;
                };

                let companion = mapping
                    .date_companion
                    .as_deref()
                    .and_then(|name| row.property(name));

                scope.enter_field(&mapping.target_key);

                let mut extracted = self.extract_value(value, companion, scope).await;
                if mapping.escape {
                    extracted = extracted.map(escape);
                }

                match extracted {
                    Some(value) => fields.insert(mapping.target_key.clone(), value),
                    None if mapping.mandatory => {
                        let diagnostic = Diagnostic::missing_mandatory(scope.record_key(), scope.field_path())
                            .with_row(row.id.clone());
                        scope.report(diagnostic);
                    }
                    None => {}
                }

                scope.leave_field();
            }

            fields
        })
    }

    async fn extract_value(
        &self,
        value: &TypedValue,
        companion: Option<&TypedValue>,
        scope: &mut BuildScope<'_>,
    ) -> Option<FieldValue> {
        match extract(value, companion) {
            Extracted::Ready(value) => value,
            Extracted::Relation(relation) => {
                RelationResolver::new(self.source, self.settings)
                    .resolve(relation, scope)
                    .await
            }
        }
    }
}

/// Wrap text in quote delimiters
fn escape(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(text) => FieldValue::Text(format!("\"{}\"", text)),
        other => other,
    }
}

/// Render an extracted key value as a record key
fn key_text(value: FieldValue) -> Option<String> {
    match value {
        FieldValue::Text(text) => Some(text),
        FieldValue::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
