//! Diagnostic codes and export warnings
//!
//! Diagnostic codes are stable strings: they appear in JSON reports and in
//! `[severity.overrides]` config tables. Add new codes, never rename.

use serde::{Deserialize, Serialize};

use crate::value::RowId;

/// Diagnostic code registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Record fields
    /// A mandatory field is present on the row but extracted to nothing
    MissingMandatoryField,

    /// The record key field is missing or empty; the row id is used instead
    MissingRecordKey,

    /// Two rows produced the same record key; the later one is skipped
    DuplicateRecordKey,

    // Relations
    /// A referenced row could not be fetched
    RelationFetchFailed,

    /// A nested record references a row already being built
    RelationCycle,

    /// Nested record resolution stopped at the configured depth
    RelationDepthExceeded,

    /// The source cut the reference list short; some rows are missing
    RelationTruncated,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingMandatoryField => "MISSING_MANDATORY_FIELD",
            Self::MissingRecordKey => "MISSING_RECORD_KEY",
            Self::DuplicateRecordKey => "DUPLICATE_RECORD_KEY",
            Self::RelationFetchFailed => "RELATION_FETCH_FAILED",
            Self::RelationCycle => "RELATION_CYCLE",
            Self::RelationDepthExceeded => "RELATION_DEPTH_EXCEEDED",
            Self::RelationTruncated => "RELATION_TRUNCATED",
        }
    }

    /// Severity used when config does not override it
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::DuplicateRecordKey => Severity::Error,
            Self::RelationDepthExceeded => Severity::Info,
            _ => Severity::Warn,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - the record is written with a gap
    Warn,

    /// Error - the record is incomplete or dropped
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{}' (expected info, warn or error)", other)),
        }
    }
}

/// A non-fatal export warning attributed to a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Key of the top-level record being built
    pub record_key: String,

    /// Target key the diagnostic is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Row involved (e.g. the referenced row that failed to fetch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<RowId>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity
    pub fn new(code: DiagnosticCode, record_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            record_key: record_key.into(),
            field: None,
            row_id: None,
        }
    }

    /// A mandatory field that extracted to nothing
    pub fn missing_mandatory(record_key: impl Into<String>, field: impl Into<String>) -> Self {
        let record_key = record_key.into();
        let field = field.into();
        let message = format!("Missing mandatory field at {}: {}", record_key, field);

        Self::new(DiagnosticCode::MissingMandatoryField, record_key, message).with_field(field)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_row(mut self, row_id: RowId) -> Self {
        self.row_id = Some(row_id);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_code_stability() {
        assert_eq!(DiagnosticCode::MissingMandatoryField.as_str(), "MISSING_MANDATORY_FIELD");
        assert_eq!(DiagnosticCode::RelationFetchFailed.as_str(), "RELATION_FETCH_FAILED");
    }

    #[test]
    fn missing_mandatory_names_key_and_field() {
        let diag = Diagnostic::missing_mandatory("turing1936", "author");

        assert_eq!(diag.code, DiagnosticCode::MissingMandatoryField);
        assert_eq!(diag.severity, Severity::Warn);
        assert_eq!(diag.record_key, "turing1936");
        assert_eq!(diag.field.as_deref(), Some("author"));
        assert_eq!(diag.message, "Missing mandatory field at turing1936: author");
    }

    #[test]
    fn diagnostic_serialization() {
        let diag = Diagnostic::new(DiagnosticCode::RelationFetchFailed, "key", "fetch failed")
            .with_row(RowId::new("abc"));

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("RELATION_FETCH_FAILED"));
        assert!(json.contains("\"warn\""));
        assert!(json.contains("\"row_id\":\"abc\""));
        assert!(!json.contains("\"field\""));
    }

    #[test]
    fn severity_parsing_and_order() {
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warn);
        assert!("fatal".parse::<Severity>().is_err());
        assert!(Severity::Error > Severity::Warn);
        assert!(Severity::Warn > Severity::Info);
    }
}
