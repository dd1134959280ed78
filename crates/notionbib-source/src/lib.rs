//! Row sources for the bibliography export
//!
//! The engine reads rows only through the [`RowSource`] trait:
//! - [`NotionClient`] talks to the Notion REST API
//! - [`MockSource`] serves rows from memory for tests and demos
//!
//! ## Example
//!
//! ```rust,ignore
//! use notionbib_source::{DatabaseId, NotionClient, RowSource};
//!
//! let client = NotionClient::new(&token, &config.notion, config.relations.clone())?;
//! let rows = client.query_rows(&DatabaseId::new(db_id), config.page_size).await?;
//! ```

pub mod source;
pub mod wire;
pub mod notion;
pub mod mock;

pub use source::{RowSource, DatabaseId, FetchError};
pub use notion::NotionClient;
pub use mock::{MockSource, MockSourceBuilder};
