//! The GraphQL query root: `records`, `notifications`, `aggregate`.

use async_graphql::{Context, Object};
use skydex_query::{
    Aggregator, CountOrder, CursorCodec, GroupByField, NotificationsPageQuery, PageArgs, PageQuery, PageQueryInput,
    SortDirection, SortField, SortSpec,
};

use crate::context::GraphQLContext;
use crate::error::GraphQLError;
use crate::input::{build_sort_spec, CountOrderInput, GroupByFieldInput, OrderByInput, RecordFilterInput};
use crate::schema::{stringify_value, AggregateBucket, NotificationsConnection, PageInfo, RecordConnection, RecordEdge, RecordNode};

fn default_sort() -> SortSpec {
    SortSpec::new(vec![SortField {
        name: "indexed_at".to_string(),
        direction: SortDirection::Descending,
    }])
}

fn clamp_non_negative(n: i32) -> u32 {
    n.max(0) as u32
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// A paginated, filtered, sorted page of records from one collection.
    #[allow(clippy::too_many_arguments)]
    async fn records(
        &self,
        ctx: &Context<'_>,
        collection: String,
        filter: Option<RecordFilterInput>,
        order_by: Option<Vec<OrderByInput>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        with_total_count: Option<bool>,
    ) -> async_graphql::Result<RecordConnection> {
        let gql_ctx = ctx.data::<GraphQLContext>()?;
        let where_clause = filter.as_ref().and_then(RecordFilterInput::to_where_clause);
        let sort = build_sort_spec(order_by).unwrap_or_else(default_sort);

        let page = PageArgs {
            first: first.map(clamp_non_negative),
            after,
            last: last.map(clamp_non_negative),
            before,
        };

        let result = PageQuery::run(
            gql_ctx.db.as_ref(),
            PageQueryInput {
                collection: &collection,
                where_clause: where_clause.as_ref(),
                sort: Some(sort.clone()),
                page,
                with_total_count: with_total_count.unwrap_or(false),
            },
        )
        .await
        .map_err(GraphQLError::from)?;

        // the engine only returns an aggregate `next_cursor`; each edge's
        // own cursor is recomputed here from the same sort it queried with.
        let edges = result
            .records
            .iter()
            .map(|record| {
                let cursor = CursorCodec::encode(&CursorCodec::project(record, &sort), &record.cid);
                RecordEdge {
                    node: RecordNode(record.clone()),
                    cursor,
                }
            })
            .collect();

        Ok(RecordConnection {
            edges,
            page_info: PageInfo {
                has_next_page: result.has_next_page,
                has_previous_page: result.has_previous_page,
                end_cursor: result.next_cursor,
            },
            total_count: result.total_count,
        })
    }

    /// Records mentioning `for_did` authored by someone else, newest first.
    async fn notifications(
        &self,
        ctx: &Context<'_>,
        for_did: String,
        collections: Option<Vec<String>>,
        limit: Option<i32>,
        after: Option<String>,
    ) -> async_graphql::Result<NotificationsConnection> {
        let gql_ctx = ctx.data::<GraphQLContext>()?;
        let collections = collections.unwrap_or_default();
        let limit = limit.map(clamp_non_negative).unwrap_or(50);

        let page = NotificationsPageQuery::run(gql_ctx.db.as_ref(), &for_did, &collections, limit, after.as_deref())
            .await
            .map_err(GraphQLError::from)?;

        Ok(NotificationsConnection {
            records: page.records.into_iter().map(RecordNode).collect(),
            next_cursor: page.next_cursor,
        })
    }

    /// Grouped counts over one collection.
    async fn aggregate(
        &self,
        ctx: &Context<'_>,
        collection: String,
        group_by: Vec<GroupByFieldInput>,
        filter: Option<RecordFilterInput>,
        order: Option<CountOrderInput>,
        limit: Option<i32>,
    ) -> async_graphql::Result<Vec<AggregateBucket>> {
        let gql_ctx = ctx.data::<GraphQLContext>()?;
        let dialect = gql_ctx.db.dialect();
        let where_clause = filter.as_ref().and_then(RecordFilterInput::to_where_clause);
        let group_fields: Vec<GroupByField> = group_by.into_iter().map(Into::into).collect();
        let order: CountOrder = order.map(Into::into).unwrap_or(CountOrder::Descending);
        let limit = limit.map(clamp_non_negative).unwrap_or(20);

        let (sql, binds) = Aggregator::build(&collection, &group_fields, where_clause.as_ref(), order, limit, dialect);
        tracing::debug!(sql = %sql, "executing Aggregator");

        let rows = gql_ctx
            .db
            .fetch_aggregate_rows(&sql, &binds, group_fields.len())
            .await
            .map_err(GraphQLError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| AggregateBucket {
                values: row.values.iter().map(stringify_value).collect(),
                count: row.count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{EmptyMutation, EmptySubscription, Schema};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use skydex_core::Record;
    use skydex_query::{AggregateResult, Dialect, QueryError, Value};
    use std::sync::Arc;

    struct FakeDb {
        dialect: Dialect,
        rows: Vec<Record>,
    }

    #[async_trait]
    impl skydex_query::DbHandle for FakeDb {
        fn dialect(&self) -> Dialect {
            self.dialect
        }

        async fn fetch_records(&self, _sql: &str, _binds: &[Value]) -> Result<Vec<Record>, QueryError> {
            Ok(self.rows.clone())
        }

        async fn fetch_count(&self, _sql: &str, _binds: &[Value]) -> Result<i64, QueryError> {
            Ok(self.rows.len() as i64)
        }

        async fn fetch_aggregate_rows(
            &self,
            _sql: &str,
            _binds: &[Value],
            _group_count: usize,
        ) -> Result<Vec<AggregateResult>, QueryError> {
            Ok(vec![AggregateResult {
                values: vec![Value::text("did:plc:abc")],
                count: 3,
            }])
        }
    }

    fn record(n: u32) -> Record {
        Record {
            uri: format!("at://did:plc:abc/app.bsky.feed.post/{n}"),
            cid: format!("bafy{n}"),
            did: "did:plc:abc".to_string(),
            collection: "app.bsky.feed.post".to_string(),
            json: json!({"lang": "en"}),
            indexed_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
            rkey: n.to_string(),
        }
    }

    fn test_schema(rows: Vec<Record>) -> Schema<QueryRoot, EmptyMutation, EmptySubscription> {
        let db: Arc<dyn skydex_query::DbHandle> = Arc::new(FakeDb {
            dialect: Dialect::Sqlite,
            rows,
        });
        Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
            .data(GraphQLContext::new(db))
            .finish()
    }

    #[tokio::test]
    async fn records_query_returns_edges_with_cursors() {
        let schema = test_schema((0..3).map(record).collect());
        let query = r#"{ records(collection: "app.bsky.feed.post", first: 2) { edges { cursor node { uri } } pageInfo { hasNextPage } } }"#;
        let result = schema.execute(query).await;
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let data = result.data.into_json().unwrap();
        let edges = data["records"]["edges"].as_array().unwrap();
        assert_eq!(edges.len(), 3);
        assert!(!edges[0]["cursor"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_query_with_filter_executes() {
        let schema = test_schema(vec![record(1)]);
        let query = r#"{ records(collection: "app.bsky.feed.post", filter: { did: { eq: "did:plc:abc" } }) { edges { node { did } } } }"#;
        let result = schema.execute(query).await;
        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }

    #[tokio::test]
    async fn notifications_query_returns_records() {
        let schema = test_schema(vec![record(1)]);
        let query = r#"{ notifications(forDid: "did:plc:xyz") { records { uri } nextCursor } }"#;
        let result = schema.execute(query).await;
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let data = result.data.into_json().unwrap();
        assert_eq!(data["notifications"]["records"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn aggregate_query_returns_buckets() {
        let schema = test_schema(vec![]);
        let query = r#"{ aggregate(collection: "app.bsky.feed.post", groupBy: [{ field: "did" }]) { values count } }"#;
        let result = schema.execute(query).await;
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let data = result.data.into_json().unwrap();
        assert_eq!(data["aggregate"][0]["count"], 3);
    }
}
