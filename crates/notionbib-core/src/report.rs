//! Export report (report.json)

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, Severity};

/// Version of the report.json layout; bump on breaking changes
pub const REPORT_VERSION: u32 = 1;

/// Row, record and diagnostic counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub rows: usize,
    pub records: usize,

    /// Rows dropped for a duplicate key
    pub skipped: usize,

    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

/// Outcome of one export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub version: u32,

    /// RFC 3339, UTC
    pub timestamp: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,

    pub summary: ReportSummary,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Build a report, tallying diagnostics by severity
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let mut summary = ReportSummary::default();
        for diagnostic in &diagnostics {
            match diagnostic.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warn => summary.warnings += 1,
                Severity::Info => summary.info += 1,
            }
        }

        Self {
            version: REPORT_VERSION,
            timestamp: chrono::Utc::now().to_rfc3339(),
            database_id: None,
            summary,
            diagnostics,
        }
    }

    pub fn with_counts(mut self, rows: usize, records: usize, skipped: usize) -> Self {
        self.summary.rows = rows;
        self.summary.records = records;
        self.summary.skipped = skipped;
        self
    }

    pub fn with_database(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = Some(database_id.into());
        self
    }

    /// Whether any diagnostic reaches the given severity
    pub fn fails_at(&self, threshold: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= threshold)
    }

    /// Write the report as pretty-printed JSON
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;

    #[test]
    fn counts_by_severity() {
        let diagnostics = vec![
            Diagnostic::missing_mandatory("a", "title"),
            Diagnostic::new(DiagnosticCode::DuplicateRecordKey, "a", "Duplicate key"),
            Diagnostic::new(DiagnosticCode::RelationDepthExceeded, "b", "Too deep"),
        ];

        let report = Report::from_diagnostics(diagnostics).with_counts(3, 2, 1);
        assert_eq!(report.version, REPORT_VERSION);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(report.summary.info, 1);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(report.diagnostics.len(), 3);
    }

    #[test]
    fn fail_threshold() {
        let empty = Report::from_diagnostics(Vec::new());
        assert!(!empty.fails_at(Severity::Info));

        let report = Report::from_diagnostics(vec![Diagnostic::missing_mandatory("a", "date")]);
        assert!(report.fails_at(Severity::Info));
        assert!(report.fails_at(Severity::Warn));
        assert!(!report.fails_at(Severity::Error));
    }

    #[test]
    fn saved_report_is_json() {
        let path = std::env::temp_dir().join(format!("notionbib-report-{}.json", std::process::id()));
        let report = Report::from_diagnostics(vec![Diagnostic::missing_mandatory("k", "title")])
            .with_database("db-1");

        report.save_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["database_id"], "db-1");
        assert_eq!(json["summary"]["warnings"], 1);
        assert_eq!(json["diagnostics"][0]["code"], "MISSING_MANDATORY_FIELD");
        std::fs::remove_file(&path).ok();
    }
}
