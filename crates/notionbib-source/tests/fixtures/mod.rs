//! Notion API payload fixtures
//!
//! Shapes follow the 2022-06-28 API version: every property carries an `id`,
//! a `type` tag and a payload stored under the tag name.

use serde_json::{json, Value};

/// A bibliography row with every mapped property populated
pub fn article_page() -> Value {
    json!({
        "object": "page",
        "id": "8c1f1a6e-0000-4000-8000-000000000001",
        "archived": false,
        "properties": {
            "Key": { "id": "title", "type": "title", "title": [
                { "type": "text", "text": { "content": "turing1936" }, "plain_text": "turing1936" }
            ]},
            "Type": { "id": "t%3Ab", "type": "select", "select": { "id": "1", "name": "article", "color": "blue" } },
            "Title": { "id": "Xn%5D", "type": "rich_text", "rich_text": [
                { "type": "text", "plain_text": "On Computable Numbers" }
            ]},
            "DOI": { "id": "d0i", "type": "rich_text", "rich_text": [
                { "type": "text", "plain_text": "10.1112/plms/s2-42.1.230" }
            ]},
            "Autoren": { "id": "LX_z", "type": "relation", "relation": [
                { "id": "8c1f1a6e-0000-4000-8000-00000000a001" }
            ], "has_more": false },
            "Datum": { "id": "dat", "type": "date", "date": { "start": "1936-11-12", "end": null, "time_zone": null } },
            "Volume": { "id": "vol", "type": "number", "number": 42 },
            "URL": { "id": "url", "type": "url", "url": "https://example.org/turing" },
            "Abrufdatum": { "id": "abr", "type": "date", "date": { "start": "2024-01-01", "end": null } },
            "Parent": { "id": "%3BhNN", "type": "relation", "relation": [], "has_more": false },
            "Erstellt": { "id": "c", "type": "created_time", "created_time": "2024-01-01T00:00:00.000Z" }
        }
    })
}

/// A person row referenced by the author relation
pub fn author_page() -> Value {
    json!({
        "object": "page",
        "id": "8c1f1a6e-0000-4000-8000-00000000a001",
        "properties": {
            "Vorname": { "id": "v", "type": "rich_text", "rich_text": [{ "plain_text": "Alan" }] },
            "Nachname": { "id": "title", "type": "title", "title": [{ "plain_text": "Turing" }] }
        }
    })
}

/// A query response wrapping the given pages
pub fn query_response(pages: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "object": "list",
        "results": pages,
        "has_more": next_cursor.is_some(),
        "next_cursor": next_cursor,
        "type": "page_or_database",
        "page_or_database": {}
    })
}
