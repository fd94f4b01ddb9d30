//! The top-level paginated-read orchestrator.

use skydex_core::Record;
use tracing::debug;

use crate::cursor::{CursorCodec, DecodedCursor};
use crate::cursor_predicate::CursorPredicate;
use crate::db::DbHandle;
use crate::error::QueryError;
use crate::field::FieldResolver;
use crate::order::{OrderBuilder, SortDirection, SortField, SortSpec};
use crate::value::Value;
use crate::where_builder::{IndexAllocator, WhereBuilder};
use crate::where_clause::WhereClause;

/// Forward or backward pagination arguments. When both `first` and `last`
/// are supplied, `first` wins (mirrors Relay-style connection arguments).
#[derive(Clone, Debug, Default)]
pub struct PageArgs {
    pub first: Option<u32>,
    pub after: Option<String>,
    pub last: Option<u32>,
    pub before: Option<String>,
}

const DEFAULT_PAGE_SIZE: u32 = 50;

enum Direction {
    Forward { limit: u32, cursor: Option<String> },
    Backward { limit: u32, cursor: Option<String> },
}

impl PageArgs {
    fn resolve(&self) -> Direction {
        if let Some(first) = self.first {
            return Direction::Forward {
                limit: first,
                cursor: self.after.clone(),
            };
        }
        if let Some(last) = self.last {
            return Direction::Backward {
                limit: last,
                cursor: self.before.clone(),
            };
        }
        Direction::Forward {
            limit: DEFAULT_PAGE_SIZE,
            cursor: None,
        }
    }
}

/// Everything [`PageQuery::run`] needs beyond the database handle.
pub struct PageQueryInput<'a> {
    pub collection: &'a str,
    pub where_clause: Option<&'a WhereClause>,
    pub sort: Option<SortSpec>,
    pub page: PageArgs,
    pub with_total_count: bool,
}

/// One page of results plus Relay-style pagination metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct PageResult {
    pub records: Vec<Record>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_count: Option<i64>,
}

/// Orchestrates a single paginated read: composes the collection filter,
/// WhereBuilder output, cursor predicate, sort, and join, executes one
/// `limit+1` query (plus an optional count query), and derives pagination
/// metadata.
pub struct PageQuery;

impl PageQuery {
    pub async fn run(db: &dyn DbHandle, input: PageQueryInput<'_>) -> Result<PageResult, QueryError> {
        let dialect = db.dialect();
        let direction = input.page.resolve();
        let (limit, is_forward, raw_cursor) = match &direction {
            Direction::Forward { limit, cursor } => (*limit, true, cursor.clone()),
            Direction::Backward { limit, cursor } => (*limit, false, cursor.clone()),
        };

        let sort = input.sort.unwrap_or_else(Self::default_sort);

        // a cursor that fails to decode degrades to "ignore it" rather than erroring.
        let decoded_cursor: Option<DecodedCursor> = raw_cursor.as_deref().and_then(|c| {
            CursorCodec::decode(c)
                .inspect_err(|err| {
                    tracing::warn!(error = %err, "cursor failed to decode, treating as absent");
                })
                .ok()
        });
        let cursor_present = decoded_cursor.is_some();

        let use_table_prefix = input
            .where_clause
            .map(WhereClause::references_actor_handle)
            .unwrap_or(false);

        let from_clause = if use_table_prefix {
            "record LEFT JOIN actor ON record.did = actor.did"
        } else {
            "record"
        };

        let query_sort = if is_forward { sort.clone() } else { sort.reversed() };
        let order_sql = OrderBuilder::build(&query_sort, use_table_prefix, dialect);

        let mut allocator = IndexAllocator::new(1);
        let collection_field = FieldResolver::resolve("collection", use_table_prefix, dialect).sql;
        let collection_idx = allocator.push(Value::text(input.collection));
        let mut where_sql = format!("{collection_field} = {}", dialect.placeholder(collection_idx));

        if let Some(clause) = input.where_clause {
            if let Some(extra) = WhereBuilder::build_into(clause, use_table_prefix, dialect, &mut allocator) {
                where_sql = format!("{where_sql} AND {extra}");
            }
        }

        let where_sql_without_cursor = where_sql.clone();

        if let Some(decoded) = &decoded_cursor {
            // CursorPredicate receives the *original* (un-reversed) sort —
            // its own cmp_operator already folds in the direction/is_before
            // relationship, so reversing here would double-invert.
            if let Some(predicate) = CursorPredicate::build(
                &sort,
                decoded,
                !is_forward,
                use_table_prefix,
                dialect,
                &mut allocator,
            ) {
                where_sql = format!("{where_sql} AND {predicate}");
            }
        }

        let record_columns = if use_table_prefix {
            "record.uri, record.cid, record.did, record.collection, record.json, record.indexed_at, record.rkey"
        } else {
            "uri, cid, did, collection, json, indexed_at, rkey"
        };

        let sql = format!(
            "SELECT {record_columns} FROM {from_clause} WHERE {where_sql} ORDER BY {order_sql} LIMIT {}",
            limit as u64 + 1
        );
        debug!(sql = %sql, "executing PageQuery");

        let mut rows = db.fetch_records(&sql, &allocator.into_binds()).await?;
        let has_more = rows.len() > limit as usize;
        rows.truncate(limit as usize);

        // the boundary record for next_cursor is captured in query order,
        // before any backward-page reversal below.
        let boundary = rows.last().map(|r| CursorCodec::encode(&CursorCodec::project(r, &sort), &r.cid));

        if !is_forward {
            rows.reverse();
        }

        let has_next_page = if is_forward { has_more } else { cursor_present };
        let has_previous_page = if is_forward { cursor_present } else { has_more };
        let next_cursor = if has_more { boundary } else { None };

        let total_count = if input.with_total_count {
            // independent placeholder numbering: the count query has no
            // cursor predicate, so its binds can't be sliced out of the
            // main query's allocator — they're rebuilt fresh here.
            let count_sql = format!("SELECT COUNT(*) FROM {from_clause} WHERE {where_sql_without_cursor}");
            let count_binds = count_only_binds(input.collection, input.where_clause, use_table_prefix, dialect);
            Some(db.fetch_count(&count_sql, &count_binds).await?)
        } else {
            None
        };

        Ok(PageResult {
            records: rows,
            next_cursor,
            has_next_page,
            has_previous_page,
            total_count,
        })
    }

    fn default_sort() -> SortSpec {
        SortSpec::new(vec![SortField {
            name: "indexed_at".to_string(),
            direction: SortDirection::Descending,
        }])
    }
}

/// Rebuild the collection + WhereBuilder binds (no cursor predicate) for
/// the count query, since the count query shares `where_sql_without_cursor`
/// but must not reuse an allocator that also consumed cursor-predicate
/// indices.
fn count_only_binds(collection: &str, where_clause: Option<&WhereClause>, use_table_prefix: bool, dialect: crate::dialect::Dialect) -> Vec<Value> {
    let mut allocator = IndexAllocator::new(1);
    allocator.push(Value::text(collection));
    if let Some(clause) = where_clause {
        WhereBuilder::build_into(clause, use_table_prefix, dialect, &mut allocator);
    }
    allocator.into_binds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeDb {
        dialect: crate::dialect::Dialect,
        rows: Mutex<Vec<Record>>,
        count: i64,
    }

    #[async_trait]
    impl DbHandle for FakeDb {
        fn dialect(&self) -> crate::dialect::Dialect {
            self.dialect
        }

        async fn fetch_records(&self, _sql: &str, _binds: &[Value]) -> Result<Vec<Record>, QueryError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn fetch_count(&self, _sql: &str, _binds: &[Value]) -> Result<i64, QueryError> {
            Ok(self.count)
        }

        async fn fetch_aggregate_rows(
            &self,
            _sql: &str,
            _binds: &[Value],
            _group_count: usize,
        ) -> Result<Vec<crate::aggregate::AggregateResult>, QueryError> {
            Ok(vec![])
        }
    }

    fn record(n: u32) -> Record {
        Record {
            uri: format!("at://did:plc:abc/app.bsky.feed.post/{n}"),
            cid: format!("bafy{n}"),
            did: "did:plc:abc".to_string(),
            collection: "app.bsky.feed.post".to_string(),
            json: json!({}),
            indexed_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            rkey: n.to_string(),
        }
    }

    #[tokio::test]
    async fn forward_page_reports_has_more_when_overfetch_returns_extra_row() {
        let db = FakeDb {
            dialect: crate::dialect::Dialect::Sqlite,
            rows: Mutex::new((0..6).map(record).collect()),
            count: 6,
        };
        let result = PageQuery::run(
            &db,
            PageQueryInput {
                collection: "app.bsky.feed.post",
                where_clause: None,
                sort: None,
                page: PageArgs {
                    first: Some(5),
                    ..Default::default()
                },
                with_total_count: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.records.len(), 5);
        assert!(result.has_next_page);
        assert!(!result.has_previous_page);
        assert!(result.next_cursor.is_some());
    }

    #[tokio::test]
    async fn no_extra_row_means_no_next_page() {
        let db = FakeDb {
            dialect: crate::dialect::Dialect::Sqlite,
            rows: Mutex::new((0..3).map(record).collect()),
            count: 3,
        };
        let result = PageQuery::run(
            &db,
            PageQueryInput {
                collection: "app.bsky.feed.post",
                where_clause: None,
                sort: None,
                page: PageArgs {
                    first: Some(5),
                    ..Default::default()
                },
                with_total_count: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.records.len(), 3);
        assert!(!result.has_next_page);
        assert!(result.next_cursor.is_none());
    }

    #[tokio::test]
    async fn cursor_present_implies_has_previous_page_on_forward_page() {
        let db = FakeDb {
            dialect: crate::dialect::Dialect::Sqlite,
            rows: Mutex::new((0..2).map(record).collect()),
            count: 2,
        };
        let cursor = CursorCodec::encode(&[Value::text("2026-01-01T00:00:00+00:00")], "bafy0");
        let result = PageQuery::run(
            &db,
            PageQueryInput {
                collection: "app.bsky.feed.post",
                where_clause: None,
                sort: None,
                page: PageArgs {
                    first: Some(5),
                    after: Some(cursor),
                    ..Default::default()
                },
                with_total_count: false,
            },
        )
        .await
        .unwrap();

        assert!(result.has_previous_page);
    }

    #[tokio::test]
    async fn malformed_cursor_degrades_to_absent_rather_than_erroring() {
        let db = FakeDb {
            dialect: crate::dialect::Dialect::Sqlite,
            rows: Mutex::new((0..2).map(record).collect()),
            count: 2,
        };
        let result = PageQuery::run(
            &db,
            PageQueryInput {
                collection: "app.bsky.feed.post",
                where_clause: None,
                sort: None,
                page: PageArgs {
                    first: Some(5),
                    after: Some("not a valid cursor".to_string()),
                    ..Default::default()
                },
                with_total_count: false,
            },
        )
        .await
        .unwrap();

        assert!(!result.has_previous_page);
    }

    #[tokio::test]
    async fn with_total_count_populates_total() {
        let db = FakeDb {
            dialect: crate::dialect::Dialect::Sqlite,
            rows: Mutex::new((0..2).map(record).collect()),
            count: 42,
        };
        let result = PageQuery::run(
            &db,
            PageQueryInput {
                collection: "app.bsky.feed.post",
                where_clause: None,
                sort: None,
                page: PageArgs {
                    first: Some(5),
                    ..Default::default()
                },
                with_total_count: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.total_count, Some(42));
    }
}
