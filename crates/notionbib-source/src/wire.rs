//! Notion API wire format
//!
//! Pages arrive as JSON objects whose `properties` map each property name to
//! `{ "id": ..., "type": <tag>, <tag>: <payload> }`. Decoding turns them into
//! core rows, classifying relation properties by their property id.

use notionbib_core::{DateRange, RelationIds, RelationValue, Row, RowId, TextSegment, TypedValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Response of `POST /v1/databases/{id}/query`
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,

    #[serde(default)]
    pub has_more: bool,

    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A page object (one database row)
#[derive(Debug, Deserialize)]
pub struct Page {
    pub id: String,

    #[serde(default)]
    pub properties: HashMap<String, Property>,
}

/// One property of a page, payload kept raw until decoded
#[derive(Debug, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RichTextItem {
    #[serde(default)]
    plain_text: String,
}

#[derive(Debug, Deserialize)]
struct SelectOption {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DateValue {
    start: String,

    #[serde(default)]
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    id: String,
}

/// Take the payload stored under `key`, treating missing or null as default
fn payload<T: DeserializeOwned + Default>(
    payload: &mut Map<String, Value>,
    key: &str,
) -> Result<T, serde_json::Error> {
    match payload.remove(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value),
    }
}

fn segments(items: Vec<RichTextItem>) -> Vec<TextSegment> {
    items.into_iter().map(|item| TextSegment::new(item.plain_text)).collect()
}

impl Property {
    /// Decode the raw payload into a typed value
    pub fn decode(mut self, relations: &RelationIds) -> Result<TypedValue, serde_json::Error> {
        let body = &mut self.payload;

        let value = match self.kind.as_str() {
            "rich_text" => TypedValue::RichText(segments(payload(body, "rich_text")?)),
            "title" => TypedValue::Title(segments(payload(body, "title")?)),
            "select" => {
                let option: Option<SelectOption> = payload(body, "select")?;
                TypedValue::Select(option.map(|o| o.name))
            }
            "url" => TypedValue::Url(payload(body, "url")?),
            "number" => TypedValue::Number(payload(body, "number")?),
            "date" => {
                let date: Option<DateValue> = payload(body, "date")?;
                TypedValue::Date(date.map(|d| DateRange {
                    start: d.start,
                    end: d.end,
                }))
            }
            "relation" => {
                let refs: Vec<PageRef> = payload(body, "relation")?;
                let relation = RelationValue::new(
                    relations.classify(&self.id),
                    refs.into_iter().map(|r| RowId::new(r.id)).collect(),
                );
                if body.get("has_more").and_then(Value::as_bool).unwrap_or(false) {
                    tracing::warn!(
                        property_id = %self.id,
                        listed = relation.refs.len(),
                        "relation has more references than the page object lists"
                    );
                    TypedValue::Relation(relation.truncated())
                } else {
                    TypedValue::Relation(relation)
                }
            }
            other => TypedValue::Unsupported(other.to_string()),
        };

        Ok(value)
    }
}

impl Page {
    /// Decode a page into a row
    pub fn into_row(self, relations: &RelationIds) -> Result<Row, serde_json::Error> {
        let mut properties = HashMap::with_capacity(self.properties.len());
        for (name, property) in self.properties {
            properties.insert(name, property.decode(relations)?);
        }

        Ok(Row {
            id: RowId::new(self.id),
            properties,
        })
    }
}
