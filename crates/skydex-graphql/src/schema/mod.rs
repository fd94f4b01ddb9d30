//! GraphQL object types.
//!
//! The teacher's `schema` module builds an `async_graphql::dynamic::Schema`
//! from an introspected Postgres `SchemaCache` — a different table per
//! request, discovered at runtime. This engine's domain is one fixed-shape
//! `record` table, so there is nothing to introspect: the object types
//! below are ordinary static `async-graphql` types instead, which is the
//! one place this crate's structure deliberately departs from the
//! teacher's.

use async_graphql::{Json, Object, SimpleObject};
use chrono::{DateTime, Utc};
use skydex_core::Record;
use skydex_query::Value;

/// Wraps [`Record`] so an `async-graphql` object type can be defined for
/// it from this crate — `Record` is a foreign type here, so the object
/// impl has to live on a local newtype rather than on `Record` directly.
pub struct RecordNode(pub Record);

#[Object(name = "Record")]
impl RecordNode {
    async fn uri(&self) -> &str {
        &self.0.uri
    }

    async fn cid(&self) -> &str {
        &self.0.cid
    }

    async fn did(&self) -> &str {
        &self.0.did
    }

    async fn collection(&self) -> &str {
        &self.0.collection
    }

    async fn rkey(&self) -> &str {
        &self.0.rkey
    }

    async fn indexed_at(&self) -> DateTime<Utc> {
        self.0.indexed_at
    }

    /// The record's raw JSON body, returned verbatim as a `JSON` scalar —
    /// its shape is collection-dependent and not something this schema
    /// can type statically.
    async fn json(&self) -> Json<serde_json::Value> {
        Json(self.0.json.clone())
    }
}

#[derive(SimpleObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(SimpleObject)]
pub struct RecordEdge {
    pub node: RecordNode,
    pub cursor: String,
}

/// A Relay-style connection over `records`. `total_count` is only
/// populated when the caller asked for it — computing it costs an extra
/// `COUNT(*)` query, so [`crate::resolver::QueryRoot`] only runs it on
/// request.
#[derive(SimpleObject)]
pub struct RecordConnection {
    pub edges: Vec<RecordEdge>,
    pub page_info: PageInfo,
    pub total_count: Option<i64>,
}

/// The notifications feed has its own fixed sort and a simpler
/// (`rkey`, `uri`) cursor, so it is exposed as a plain list plus a single
/// `next_cursor` rather than a full Relay connection.
#[derive(SimpleObject)]
pub struct NotificationsConnection {
    pub records: Vec<RecordNode>,
    pub next_cursor: Option<String>,
}

#[derive(SimpleObject)]
pub struct AggregateBucket {
    pub values: Vec<String>,
    pub count: i64,
}

/// Render a bind [`Value`] the way it appears in an aggregate bucket's
/// `values` list — every variant stringified since GraphQL has to return
/// one scalar type per list element and the caller already knows what
/// they grouped by.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Integer(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringify_value_covers_every_variant() {
        assert_eq!(stringify_value(&Value::text("x")), "x");
        assert_eq!(stringify_value(&Value::Integer(5)), "5");
        assert_eq!(stringify_value(&Value::Boolean(true)), "true");
        assert_eq!(stringify_value(&Value::Null), "null");
    }
}
