//! Relation resolver
//!
//! The relation kind picks the strategy:
//! - `Authors`: fetch every referenced person row and render
//!   `"Last, First"` names, in reference order
//! - `Parent`: fetch the first referenced row and build it as a nested,
//!   unwrapped record
//! - `Unknown`: absent, nothing is fetched
//!
//! Fetches run one at a time and are never cached. A failed fetch only costs
//! that row's contribution.

use notionbib_core::{
    Diagnostic, DiagnosticCode, FieldMap, FieldValue, RelationKind, RelationValue, Row, RowId,
};
use notionbib_source::{FetchError, RowSource};

use crate::builder::RecordBuilder;
use crate::context::{BuildScope, ExportSettings};
use crate::extract::extract;

/// Resolves relation properties by fetching the referenced rows
pub struct RelationResolver<'a> {
    source: &'a dyn RowSource,
    settings: &'a ExportSettings,
}

impl<'a> RelationResolver<'a> {
    pub fn new(source: &'a dyn RowSource, settings: &'a ExportSettings) -> Self {
        Self { source, settings }
    }

    /// Resolve a relation into an author list or a nested record
    pub async fn resolve(
        &self,
        relation: &RelationValue,
        scope: &mut BuildScope<'_>,
    ) -> Option<FieldValue> {
        let first = relation.refs.first()?;

        match &relation.kind {
            RelationKind::Authors => {
                let names = self.resolve_authors(&relation.refs, scope).await;
                if relation.truncated {
                    let diagnostic = Diagnostic::new(
                        DiagnosticCode::RelationTruncated,
                        scope.record_key(),
                        format!(
                            "Relation at {}: {} lists only the first {} references, the rest are missing",
                            scope.record_key(),
                            scope.field_path(),
                            relation.refs.len()
                        ),
                    )
                    .with_field(scope.field_path());
                    scope.report(diagnostic);
                }
                Some(FieldValue::List(names))
            }
            RelationKind::Parent => self.resolve_parent(first, scope).await.map(FieldValue::Record),
            RelationKind::Unknown(id) => {
                tracing::debug!(relation_id = %id, field = %scope.field_path(), "ignoring unrecognized relation");
                None
            }
        }
    }

    async fn resolve_authors(&self, refs: &[RowId], scope: &mut BuildScope<'_>) -> Vec<String> {
        let mut names = Vec::with_capacity(refs.len());

        for id in refs {
            match self.source.fetch_row(id).await {
                Ok(row) => {
                    if let Some(name) = self.author_name(&row) {
                        names.push(name);
                    } else {
                        tracing::debug!(row = %id, "author row has no name, skipping");
                    }
                }
                Err(err) => self.fetch_failed(id, &err, scope),
            }
        }

        names
    }

    fn author_name(&self, row: &Row) -> Option<String> {
        let text = |name: &str| {
            row.property(name)
                .and_then(|value| extract(value, None).into_ready())
                .and_then(|value| match value {
                    FieldValue::Text(text) => Some(text),
                    _ => None,
                })
        };

        let first = text(&self.settings.authors.first_name);
        let last = text(&self.settings.authors.last_name);

        format_author(first.as_deref(), last.as_deref())
    }

    async fn resolve_parent(&self, id: &RowId, scope: &mut BuildScope<'_>) -> Option<FieldMap> {
        if scope.is_building(id) {
            let diagnostic = Diagnostic::new(
                DiagnosticCode::RelationCycle,
                scope.record_key(),
                format!(
                    "Relation at {}: {} refers back to row {} which is already being built",
                    scope.record_key(),
                    scope.field_path(),
                    id
                ),
            )
            .with_field(scope.field_path())
            .with_row(id.clone());
            scope.report(diagnostic);
            return None;
        }

        if scope.depth() > self.settings.max_relation_depth {
            let diagnostic = Diagnostic::new(
                DiagnosticCode::RelationDepthExceeded,
                scope.record_key(),
                format!(
                    "Relation at {}: {} not resolved, nesting limit of {} reached",
                    scope.record_key(),
                    scope.field_path(),
                    self.settings.max_relation_depth
                ),
            )
            .with_field(scope.field_path())
            .with_row(id.clone());
            scope.report(diagnostic);
            return None;
        }

        let row = match self.source.fetch_row(id).await {
            Ok(row) => row,
            Err(err) => {
                self.fetch_failed(id, &err, scope);
                return None;
            }
        };

        let builder = RecordBuilder::new(self.source, self.settings);
        Some(builder.build_nested(&row, scope).await)
    }

    fn fetch_failed(&self, id: &RowId, err: &FetchError, scope: &mut BuildScope<'_>) {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::RelationFetchFailed,
            scope.record_key(),
            format!(
                "Could not fetch row {} for {}: {} ({})",
                id,
                scope.record_key(),
                scope.field_path(),
                err
            ),
        )
        .with_field(scope.field_path())
        .with_row(id.clone());
        scope.report(diagnostic);
    }
}

/// Render an author as `"Last, First"`, `"Last"` or `"First"`
pub fn format_author(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let first = first.filter(|s| !s.is_empty());
    let last = last.filter(|s| !s.is_empty());

    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{}, {}", last, first)),
        (None, Some(last)) => Some(last.to_string()),
        (Some(first), None) => Some(first.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_formats() {
        assert_eq!(format_author(Some("Ada"), Some("Lovelace")), Some("Lovelace, Ada".to_string()));
        assert_eq!(format_author(None, Some("Turing")), Some("Turing".to_string()));
        assert_eq!(format_author(Some(""), Some("Turing")), Some("Turing".to_string()));
        assert_eq!(format_author(Some("Grace"), None), Some("Grace".to_string()));
        assert_eq!(format_author(None, None), None);
    }
}
