//! Configuration schema (notionbib.toml)
//!
//! Secrets are not part of this file. The access token and, by default, the
//! database id come from the environment; see the CLI.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::diagnostic::{DiagnosticCode, Severity};
use crate::mapping::{FieldMapping, FieldTable};
use crate::value::RelationKind;

/// Severity threshold overrides for specific diagnostic codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of diagnostic code to severity override
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for a diagnostic code, or default
    pub fn get_severity(&self, code: DiagnosticCode, default: Severity) -> Severity {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }

    /// Set severity override for a code
    pub fn set_override(&mut self, code: DiagnosticCode, severity: Severity) {
        self.overrides.insert(code.as_str().to_string(), severity);
    }
}

/// Relation property ids and the interpretation they select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationIds {
    /// Property id of the author relation
    pub authors: String,

    /// Property id of the parent-work relation
    pub parent: String,
}

impl Default for RelationIds {
    fn default() -> Self {
        Self {
            authors: "LX_z".to_string(),
            parent: "%3BhNN".to_string(),
        }
    }
}

impl RelationIds {
    /// Map a relation property id to its kind
    pub fn classify(&self, property_id: &str) -> RelationKind {
        if property_id == self.authors {
            RelationKind::Authors
        } else if property_id == self.parent {
            RelationKind::Parent
        } else {
            RelationKind::Unknown(property_id.to_string())
        }
    }
}

/// Property names read from person rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorFields {
    pub first_name: String,
    pub last_name: String,
}

impl Default for AuthorFields {
    fn default() -> Self {
        Self {
            first_name: "Vorname".to_string(),
            last_name: "Nachname".to_string(),
        }
    }
}

/// Notion API connection settings (non-secret)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionConfig {
    /// API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Value of the `Notion-Version` header
    #[serde(default = "default_notion_version")]
    pub notion_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.notion.com".to_string()
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            notion_version: default_notion_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_page_size() -> u32 {
    100
}

fn default_output() -> PathBuf {
    PathBuf::from("hayagriva.yml")
}

fn default_key_field() -> String {
    "Key".to_string()
}

fn default_max_relation_depth() -> usize {
    1
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database to export (overridden by NOTION_DB_ID / --database)
    #[serde(default)]
    pub database_id: Option<String>,

    /// Rows requested per query page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Output document path
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Property holding the record key
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// How many nested records a parent chain may produce
    #[serde(default = "default_max_relation_depth")]
    pub max_relation_depth: usize,

    /// Exit with failure when a diagnostic reaches this severity
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Relation property ids
    #[serde(default)]
    pub relations: RelationIds,

    /// Person row property names
    #[serde(default)]
    pub authors: AuthorFields,

    /// Severity thresholds
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Replacement field table (defaults to the Hayagriva table)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldMapping>>,

    /// Notion API settings
    #[serde(default)]
    pub notion: NotionConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_id: None,
            page_size: default_page_size(),
            output: default_output(),
            key_field: default_key_field(),
            max_relation_depth: default_max_relation_depth(),
            fail_on: None,
            relations: RelationIds::default(),
            authors: AuthorFields::default(),
            severity: SeverityThreshold::default(),
            fields: None,
            notion: NotionConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.page_size == 0 || config.page_size > 100 {
            return Err(ConfigError::InvalidValue(format!(
                "page_size must be between 1 and 100, got {}",
                config.page_size
            )));
        }

        // Surface duplicate source keys at load time
        config.field_table()?;

        Ok(config)
    }

    /// The field table in effect
    pub fn field_table(&self) -> Result<FieldTable, ConfigError> {
        match &self.fields {
            Some(fields) => FieldTable::new(fields.clone()),
            None => Ok(FieldTable::hayagriva()),
        }
    }

    /// Output path resolved against the project root
    pub fn output_path(&self) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            self.project_root.join(&self.output)
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Field table maps source field '{0}' more than once")]
    DuplicateSourceKey(String),
}
