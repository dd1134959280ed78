//! Export settings and per-record build scope

use notionbib_core::{
    AuthorFields, Config, ConfigError, Diagnostic, FieldTable, RowId, SeverityThreshold,
};

/// Everything the record builder needs from configuration
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Field mapping table
    pub table: FieldTable,

    /// Property holding the record key
    pub key_field: String,

    /// Person row property names
    pub authors: AuthorFields,

    /// How many nested records a parent chain may produce
    pub max_relation_depth: usize,

    /// Severity overrides applied to every diagnostic
    pub severity: SeverityThreshold,
}

impl ExportSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            table: config.field_table()?,
            key_field: config.key_field.clone(),
            authors: config.authors.clone(),
            max_relation_depth: config.max_relation_depth,
            severity: config.severity.clone(),
        })
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            table: FieldTable::hayagriva(),
            key_field: "Key".to_string(),
            authors: AuthorFields::default(),
            max_relation_depth: 1,
            severity: SeverityThreshold::default(),
        }
    }
}

/// State carried while one top-level record is built
///
/// Tracks the rows currently under construction (for the cycle and depth
/// guards), the target key path (for diagnostics in nested records) and the
/// diagnostics collected so far.
#[derive(Debug)]
pub struct BuildScope<'s> {
    record_key: String,
    chain: Vec<RowId>,
    path: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    severity: &'s SeverityThreshold,
}

impl<'s> BuildScope<'s> {
    pub fn new(root: RowId, severity: &'s SeverityThreshold) -> Self {
        Self {
            record_key: root.to_string(),
            chain: vec![root],
            path: Vec::new(),
            diagnostics: Vec::new(),
            severity,
        }
    }

    pub fn record_key(&self) -> &str {
        &self.record_key
    }

    pub fn set_record_key(&mut self, key: impl Into<String>) {
        self.record_key = key.into();
    }

    /// Number of rows currently under construction
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    pub fn is_building(&self, id: &RowId) -> bool {
        self.chain.contains(id)
    }

    pub(crate) fn enter_row(&mut self, id: RowId) {
        self.chain.push(id);
    }

    pub(crate) fn leave_row(&mut self) {
        self.chain.pop();
    }

    pub(crate) fn enter_field(&mut self, target_key: &str) {
        self.path.push(target_key.to_string());
    }

    pub(crate) fn leave_field(&mut self) {
        self.path.pop();
    }

    /// Dotted target key path, e.g. `parent.title`
    pub fn field_path(&self) -> String {
        self.path.join(".")
    }

    /// Record a diagnostic and log it
    pub fn report(&mut self, diagnostic: Diagnostic) {
        emit(self.severity, &mut self.diagnostics, diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Apply the severity override, log, and collect a diagnostic
pub(crate) fn emit(
    severity: &SeverityThreshold,
    diagnostics: &mut Vec<Diagnostic>,
    diagnostic: Diagnostic,
) {
    let level = severity.get_severity(diagnostic.code, diagnostic.severity);
    let diagnostic = diagnostic.with_severity(level);

    tracing::warn!(
        code = %diagnostic.code,
        severity = %diagnostic.severity,
        record = %diagnostic.record_key,
        "{}",
        diagnostic.message
    );

    diagnostics.push(diagnostic);
}
