//! Integration tests for row sources
//!
//! Tests talking to the real Notion API are marked with `#[ignore]` and need
//! credentials:
//!
//! ```bash
//! NOTION_TOKEN=secret_... NOTION_DB_ID=... \
//! cargo test -p notionbib-source --test integration_tests -- --ignored
//! ```

mod fixtures;

use notionbib_core::{Config, RelationIds, RelationKind, RowId, TypedValue};
use notionbib_source::wire::{Page, QueryResponse};
use notionbib_source::{DatabaseId, FetchError, MockSourceBuilder, NotionClient, RowSource};
use pretty_assertions::assert_eq;

// =============================================================================
// Wire format decoding
// =============================================================================

#[test]
fn test_decode_article_page() {
    let page: Page = serde_json::from_value(fixtures::article_page()).unwrap();
    let row = page.into_row(&RelationIds::default()).unwrap();

    assert_eq!(row.property("Key"), Some(&TypedValue::title("turing1936")));
    assert_eq!(row.property("Type"), Some(&TypedValue::select("article")));
    assert_eq!(row.property("Volume"), Some(&TypedValue::number(42)));
    assert_eq!(row.property("Abrufdatum"), Some(&TypedValue::date("2024-01-01")));
    assert_eq!(
        row.property("Autoren"),
        Some(&TypedValue::relation(
            RelationKind::Authors,
            vec![RowId::new("8c1f1a6e-0000-4000-8000-00000000a001")]
        ))
    );
    assert_eq!(
        row.property("Parent"),
        Some(&TypedValue::relation(RelationKind::Parent, vec![]))
    );
    assert_eq!(
        row.property("Erstellt"),
        Some(&TypedValue::Unsupported("created_time".to_string()))
    );
}

#[test]
fn test_decode_with_custom_relation_ids() {
    let ids = RelationIds {
        authors: "%3BhNN".to_string(),
        parent: "LX_z".to_string(),
    };
    let page: Page = serde_json::from_value(fixtures::article_page()).unwrap();
    let row = page.into_row(&ids).unwrap();

    match row.property("Autoren") {
        Some(TypedValue::Relation(relation)) => assert_eq!(relation.kind, RelationKind::Parent),
        other => panic!("expected relation, got {:?}", other),
    }
}

#[test]
fn test_decode_paginated_response() {
    let body = fixtures::query_response(
        vec![fixtures::article_page(), fixtures::author_page()],
        Some("next-page"),
    );
    let response: QueryResponse = serde_json::from_value(body).unwrap();

    assert_eq!(response.results.len(), 2);
    assert!(response.has_more);
    assert_eq!(response.next_cursor.as_deref(), Some("next-page"));
}

// =============================================================================
// Mock source (no credentials required)
// =============================================================================

#[tokio::test]
async fn test_mock_source_serves_decoded_pages() {
    let ids = RelationIds::default();
    let article: Page = serde_json::from_value(fixtures::article_page()).unwrap();
    let author: Page = serde_json::from_value(fixtures::author_page()).unwrap();

    let source = MockSourceBuilder::new()
        .with_database_row(article.into_row(&ids).unwrap())
        .with_page(author.into_row(&ids).unwrap())
        .build();

    let rows = source.query_rows(&DatabaseId::new("db"), 100).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(source.fetch_count(), 0);

    let author = source
        .fetch_row(&RowId::new("8c1f1a6e-0000-4000-8000-00000000a001"))
        .await
        .unwrap();
    assert_eq!(author.property("Vorname"), Some(&TypedValue::rich_text("Alan")));
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_mock_source_missing_page() {
    let source = MockSourceBuilder::new().build();
    let result = source.fetch_row(&RowId::new("missing")).await;

    match result {
        Err(FetchError::NotFound(msg)) => assert!(msg.contains("missing")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

// =============================================================================
// Notion API (credentials required)
// =============================================================================

#[tokio::test]
#[ignore]
async fn test_notion_query_live_database() {
    let (Ok(token), Ok(db)) = (std::env::var("NOTION_TOKEN"), std::env::var("NOTION_DB_ID")) else {
        eprintln!("NOTION_TOKEN / NOTION_DB_ID not set, skipping");
        return;
    };

    let config = Config::default();
    let client = NotionClient::new(&token, &config.notion, config.relations.clone()).unwrap();

    let rows = client.query_rows(&DatabaseId::new(db), 10).await.unwrap();
    if let Some(row) = rows.first() {
        let fetched = client.fetch_row(&row.id).await.unwrap();
        assert_eq!(fetched.id, row.id);
    }
}

#[tokio::test]
#[ignore]
async fn test_notion_rejects_bad_token() {
    let config = Config::default();
    let client = NotionClient::new("secret_invalid", &config.notion, config.relations.clone()).unwrap();

    let result = client.query_rows(&DatabaseId::new("00000000000000000000000000000000"), 1).await;
    assert!(matches!(result, Err(FetchError::AuthenticationError(_))));
}
