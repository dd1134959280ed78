//! notionbib engine - Record building and document output
//!
//! This crate turns database rows into bibliography records:
//! - Property extraction per value type
//! - Record building against the field table
//! - Relation resolution (author lists, nested parent records)
//! - The row pipeline and the YAML document writer

pub mod builder;
pub mod context;
pub mod extract;
pub mod pipeline;
pub mod resolver;
pub mod writer;

pub use builder::{BuiltRecord, RecordBuilder};
pub use context::{BuildScope, ExportSettings};
pub use extract::{extract, Extracted};
pub use pipeline::{Export, Pipeline, PipelineError};
pub use resolver::{format_author, RelationResolver};
pub use writer::{render_yaml, DocumentWriter, WriteError, YamlFileWriter};
