//! Notion API row source
//!
//! Queries a database with `POST /v1/databases/{id}/query`, following
//! `next_cursor` until the result set is exhausted, and fetches single pages
//! with `GET /v1/pages/{id}`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = NotionClient::new(token, &config.notion, config.relations.clone())?;
//! let rows = client.query_rows(&DatabaseId::new(db_id), 100).await?;
//! ```

use notionbib_core::{NotionConfig, RelationIds, Row, RowId};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use crate::source::{DatabaseId, FetchError, RowSource};
use crate::wire::{Page, QueryResponse};

/// Notion API client
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    relations: RelationIds,
}

impl NotionClient {
    /// Create a client authenticated with an integration token
    pub fn new(
        token: &str,
        config: &NotionConfig,
        relations: RelationIds,
    ) -> Result<Self, FetchError> {
        if token.trim().is_empty() {
            return Err(FetchError::ConfigError("Notion token is empty".to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| FetchError::ConfigError(format!("invalid token: {}", e)))?;
        auth.set_sensitive(true);

        let version = HeaderValue::from_str(&config.notion_version)
            .map_err(|e| FetchError::ConfigError(format!("invalid Notion-Version: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Notion-Version", version);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::NetworkError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            relations,
        })
    }

    /// Query one page of database results
    async fn query_page(
        &self,
        database: &DatabaseId,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<QueryResponse, FetchError> {
        let url = format!("{}/v1/databases/{}/query", self.base_url, database);

        let mut body = json!({ "page_size": page_size });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }

        tracing::debug!(%database, ?cursor, "querying database");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        handle_response(response, database.as_str()).await
    }

    fn decode(&self, page: Page) -> Result<Row, FetchError> {
        let id = page.id.clone();
        page.into_row(&self.relations)
            .map_err(|e| FetchError::InvalidResponse(format!("page {}: {}", id, e)))
    }
}

fn network_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::NetworkError(format!("request timed out: {}", e))
    } else {
        FetchError::NetworkError(e.to_string())
    }
}

/// Check the HTTP status and parse the JSON body
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
    subject: &str,
) -> Result<T, FetchError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(FetchError::RateLimited { retry_after });
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(FetchError::AuthenticationError(
            "Notion rejected the token (check NOTION_TOKEN)".to_string(),
        ));
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound(format!(
            "{} (is it shared with the integration?)",
            subject
        )));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| FetchError::InvalidResponse(e.to_string()))
}

#[async_trait::async_trait]
impl RowSource for NotionClient {
    fn name(&self) -> &'static str {
        "Notion"
    }

    async fn query_rows(&self, database: &DatabaseId, page_size: u32) -> Result<Vec<Row>, FetchError> {
        let mut rows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.query_page(database, page_size, cursor.as_deref()).await?;
            for result in page.results {
                rows.push(self.decode(result)?);
            }

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(%database, rows = rows.len(), "database query complete");
        Ok(rows)
    }

    async fn fetch_row(&self, id: &RowId) -> Result<Row, FetchError> {
        let url = format!("{}/v1/pages/{}", self.base_url, id);

        tracing::debug!(page = %id, "fetching page");

        let response = self.client.get(&url).send().await.map_err(network_error)?;
        let page: Page = handle_response(response, id.as_str()).await?;

        self.decode(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_rejected() {
        let result = NotionClient::new("  ", &NotionConfig::default(), RelationIds::default());
        assert!(matches!(result, Err(FetchError::ConfigError(_))));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let config = NotionConfig {
            api_base_url: "http://localhost:8080/".to_string(),
            ..NotionConfig::default()
        };
        let client = NotionClient::new("secret_abc", &config, RelationIds::default()).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn source_name() {
        let client =
            NotionClient::new("secret_abc", &NotionConfig::default(), RelationIds::default()).unwrap();
        assert_eq!(client.name(), "Notion");
    }
}
