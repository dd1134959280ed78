//! Mock row source for testing
//!
//! Serves rows from memory without touching the network. It's useful for:
//! - Unit testing record building and relation resolution
//! - Asserting how many page fetches a code path performs
//! - Simulating failures for single pages or the whole query
//!
//! ## Usage
//!
//! ```rust,ignore
//! let source = MockSourceBuilder::new()
//!     .with_database_row(article)      // returned by query_rows, in order
//!     .with_page(author)               // reachable only through fetch_row
//!     .with_page_error("gone", FetchError::NotFound("gone".into()))
//!     .build();
//!
//! let rows = source.query_rows(&DatabaseId::new("db"), 100).await?;
//! assert_eq!(source.fetch_count(), 0);
//! ```

use notionbib_core::{Row, RowId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::source::{DatabaseId, FetchError, RowSource};

/// Mock row source for testing
///
/// Clones share state, including the fetch counter.
#[derive(Clone)]
pub struct MockSource {
    /// Rows returned by `query_rows`, in order
    database_rows: Arc<RwLock<Vec<Row>>>,

    /// Every row reachable through `fetch_row`
    pages: Arc<RwLock<HashMap<RowId, Row>>>,

    /// Errors to return for specific pages
    page_errors: Arc<RwLock<HashMap<RowId, FetchError>>>,

    /// Error to return from `query_rows`
    query_error: Option<FetchError>,

    /// Number of `fetch_row` calls made
    fetches: Arc<AtomicUsize>,
}

impl MockSource {
    /// Create a new mock source with no rows
    pub fn new() -> Self {
        MockSourceBuilder::new().build()
    }

    /// Add a database row (also fetchable as a page)
    pub async fn add_database_row(&self, row: Row) {
        self.pages.write().await.insert(row.id.clone(), row.clone());
        self.database_rows.write().await.push(row);
    }

    /// Add a page that is not part of the queried database
    pub async fn add_page(&self, row: Row) {
        self.pages.write().await.insert(row.id.clone(), row);
    }

    /// Fail fetches of one page with the given error
    pub async fn add_page_error(&self, id: &RowId, error: FetchError) {
        self.page_errors.write().await.insert(id.clone(), error);
    }

    /// Number of `fetch_row` calls made so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Reset the fetch counter
    pub fn reset_fetch_count(&self) {
        self.fetches.store(0, Ordering::SeqCst);
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RowSource for MockSource {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn query_rows(&self, _database: &DatabaseId, _page_size: u32) -> Result<Vec<Row>, FetchError> {
        if let Some(error) = &self.query_error {
            return Err(error.clone());
        }

        Ok(self.database_rows.read().await.clone())
    }

    async fn fetch_row(&self, id: &RowId) -> Result<Row, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        // Check for configured errors first
        if let Some(error) = self.page_errors.read().await.get(id) {
            return Err(error.clone());
        }

        self.pages
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}

/// Builder for a MockSource with predefined rows
///
/// ```rust,ignore
/// let source = MockSourceBuilder::new()
///     .with_database_row(article)
///     .with_page(author)
///     .build();
/// ```
pub struct MockSourceBuilder {
    database_rows: Vec<Row>,
    pages: HashMap<RowId, Row>,
    page_errors: HashMap<RowId, FetchError>,
    query_error: Option<FetchError>,
}

impl MockSourceBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            database_rows: Vec::new(),
            pages: HashMap::new(),
            page_errors: HashMap::new(),
            query_error: None,
        }
    }

    /// Add a database row (also fetchable as a page)
    pub fn with_database_row(mut self, row: Row) -> Self {
        self.pages.insert(row.id.clone(), row.clone());
        self.database_rows.push(row);
        self
    }

    /// Add a page that is not part of the queried database
    pub fn with_page(mut self, row: Row) -> Self {
        self.pages.insert(row.id.clone(), row);
        self
    }

    /// Fail fetches of one page with the given error
    pub fn with_page_error(mut self, id: impl Into<String>, error: FetchError) -> Self {
        self.page_errors.insert(RowId::new(id), error);
        self
    }

    /// Fail the database query
    pub fn with_query_error(mut self, error: FetchError) -> Self {
        self.query_error = Some(error);
        self
    }

    /// Build the MockSource
    pub fn build(self) -> MockSource {
        MockSource {
            database_rows: Arc::new(RwLock::new(self.database_rows)),
            pages: Arc::new(RwLock::new(self.pages)),
            page_errors: Arc::new(RwLock::new(self.page_errors)),
            query_error: self.query_error,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Default for MockSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
