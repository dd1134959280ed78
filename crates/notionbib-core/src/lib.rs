//! notionbib core
//!
//! Domain model shared by the source, engine and CLI crates: typed row
//! values, the field mapping table, output records, diagnostics, config and
//! the export report. Diagnostic codes are part of the public API.

pub mod value;
pub mod mapping;
pub mod record;
pub mod diagnostic;
pub mod report;
pub mod config;

pub use value::{Row, RowId, TypedValue, TextSegment, DateRange, RelationKind, RelationValue};
pub use mapping::{FieldMapping, FieldTable};
pub use record::{FieldMap, FieldValue, OutputRecord};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use report::{Report, ReportSummary, REPORT_VERSION};
pub use config::{Config, ConfigError, SeverityThreshold, RelationIds, AuthorFields, NotionConfig};
