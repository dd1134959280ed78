//! Row pipeline: database rows in, ordered records out
//!
//! Rows are processed one after another, each fully resolved (including its
//! relation fetches) before the next starts. Output order is row order.

use notionbib_core::{Diagnostic, DiagnosticCode, OutputRecord, Report, Row};
use notionbib_source::{DatabaseId, FetchError, RowSource};
use std::collections::HashSet;

use crate::builder::RecordBuilder;
use crate::context::{emit, ExportSettings};

/// Errors that abort an export run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to query database {database}: {source}")]
    Query {
        database: String,
        #[source]
        source: FetchError,
    },
}

/// Result of one export run
#[derive(Debug, Clone, Default)]
pub struct Export {
    /// Records in row order
    pub records: Vec<OutputRecord>,

    /// Diagnostics in the order they were raised
    pub diagnostics: Vec<Diagnostic>,

    /// Rows returned by the query
    pub rows: usize,

    /// Rows dropped because their key was already taken
    pub skipped: usize,
}

impl Export {
    /// Summarize the run as a report
    pub fn report(&self) -> Report {
        Report::from_diagnostics(self.diagnostics.clone()).with_counts(
            self.rows,
            self.records.len(),
            self.skipped,
        )
    }
}

/// Drives record building over all rows of a database
pub struct Pipeline<'a> {
    source: &'a dyn RowSource,
    settings: &'a ExportSettings,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn RowSource, settings: &'a ExportSettings) -> Self {
        Self { source, settings }
    }

    /// Query the database and build every row
    ///
    /// A failed query aborts the run; everything after that degrades to
    /// diagnostics.
    pub async fn run(&self, database: &DatabaseId, page_size: u32) -> Result<Export, PipelineError> {
        let rows = self
            .source
            .query_rows(database, page_size)
            .await
            .map_err(|source| PipelineError::Query {
                database: database.to_string(),
                source,
            })?;

        tracing::info!(
            %database,
            rows = rows.len(),
            source = self.source.name(),
            "fetched database rows"
        );

        Ok(self.build_rows(&rows).await)
    }

    /// Build top-level records for already fetched rows
    pub async fn build_rows(&self, rows: &[Row]) -> Export {
        let builder = RecordBuilder::new(self.source, self.settings);
        let mut export = Export {
            rows: rows.len(),
            ..Export::default()
        };
        let mut keys = HashSet::new();

        for row in rows {
            let built = builder.build(row).await;
            export.diagnostics.extend(built.diagnostics);

            let record = built.record;
            if !keys.insert(record.key.clone()) {
                let diagnostic = Diagnostic::new(
                    DiagnosticCode::DuplicateRecordKey,
                    record.key.clone(),
                    format!(
                        "Duplicate key {}: row {} skipped, an earlier row already uses it",
                        record.key, record.row_id
                    ),
                )
                .with_row(record.row_id.clone());
                emit(&self.settings.severity, &mut export.diagnostics, diagnostic);
                export.skipped += 1;
                continue;
            }

            export.records.push(record);
        }

        tracing::info!(
            records = export.records.len(),
            skipped = export.skipped,
            diagnostics = export.diagnostics.len(),
            "built records"
        );

        export
    }
}
