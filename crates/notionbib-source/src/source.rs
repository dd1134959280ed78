//! Row source trait for fetching database rows

use notionbib_core::{Row, RowId};
use std::fmt;

/// Identifies a database to query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseId(pub String);

impl DatabaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when fetching rows
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Source of database rows
///
/// `query_rows` is the row-list fetch used once per export; `fetch_row` is
/// the single-page fetch used to resolve relation references.
#[async_trait::async_trait]
pub trait RowSource: Send + Sync {
    /// Get the source name (e.g., "Notion", "Mock")
    fn name(&self) -> &'static str;

    /// Fetch every row of a database, in database order
    async fn query_rows(&self, database: &DatabaseId, page_size: u32) -> Result<Vec<Row>, FetchError>;

    /// Fetch one row by id
    async fn fetch_row(&self, id: &RowId) -> Result<Row, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_id() {
        let db = DatabaseId::new("0f3c");
        assert_eq!(db.as_str(), "0f3c");
        assert_eq!(db.to_string(), "0f3c");
    }

    #[test]
    fn fetch_error_messages() {
        let err = FetchError::ApiError {
            status: 400,
            message: "validation_error".to_string(),
        };
        assert_eq!(err.to_string(), "API error (400): validation_error");
        assert_eq!(
            FetchError::RateLimited { retry_after: 3 }.to_string(),
            "Rate limited, retry after 3s"
        );
    }
}
