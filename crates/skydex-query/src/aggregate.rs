//! GROUP BY aggregation query construction.

use crate::dialect::{Dialect, Interval};
use crate::field::FieldResolver;
use crate::value::Value;
use crate::where_builder::{IndexAllocator, WhereBuilder};
use crate::where_clause::WhereClause;

/// One grouping key: either a bare field, or a field bucketed by a
/// date-truncation interval.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupByField {
    Simple(String),
    DateTrunc(String, Interval),
}

/// Sort direction for the trailing `ORDER BY count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountOrder {
    Ascending,
    Descending,
}

impl CountOrder {
    fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One grouped-result row: stringified values for each `GroupByField`, in
/// the order they were requested, plus the bucket's count.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateResult {
    pub values: Vec<Value>,
    pub count: i64,
}

/// Emits `SELECT ... , COUNT(*) AS count FROM ... WHERE ... GROUP BY ...
/// ORDER BY count <DIR> LIMIT <N>`.
pub struct Aggregator;

impl Aggregator {
    /// Builds the full aggregate query. Returns `(sql, binds)`; the caller
    /// is responsible for issuing it through [`crate::DbHandle::fetch_aggregate_rows`]
    /// with `group_by.len()` as the expected group-column count.
    pub fn build(
        collection: &str,
        group_by: &[GroupByField],
        where_clause: Option<&WhereClause>,
        order: CountOrder,
        limit: u32,
        dialect: Dialect,
    ) -> (String, Vec<Value>) {
        let mut allocator = IndexAllocator::new(1);

        let collection_idx = allocator.push(Value::text(collection));
        let mut where_sql = format!("collection = {}", dialect.placeholder(collection_idx));

        if let Some(clause) = where_clause {
            if let Some(extra) = WhereBuilder::build_into(clause, false, dialect, &mut allocator) {
                where_sql = format!("{where_sql} AND {extra}");
            }
        }

        let select_exprs: Vec<String> = group_by
            .iter()
            .enumerate()
            .map(|(i, field)| format!("{} AS field_{i}", Self::select_expr(field, dialect)))
            .collect();

        let group_by_exprs: Vec<String> = (0..group_by.len()).map(|i| format!("field_{i}")).collect();

        let select_clause = if select_exprs.is_empty() {
            "COUNT(*) AS count".to_string()
        } else {
            format!("{}, COUNT(*) AS count", select_exprs.join(", "))
        };

        let sql = if group_by_exprs.is_empty() {
            format!("SELECT {select_clause} FROM record WHERE {where_sql}")
        } else {
            format!(
                "SELECT {select_clause} FROM record WHERE {where_sql} GROUP BY {} ORDER BY count {} LIMIT {limit}",
                group_by_exprs.join(", "),
                order.keyword()
            )
        };

        (sql, allocator.into_binds())
    }

    fn select_expr(field: &GroupByField, dialect: Dialect) -> String {
        match field {
            GroupByField::Simple(name) => FieldResolver::resolve(name, false, dialect).sql,
            GroupByField::DateTrunc(name, interval) => {
                let resolved = FieldResolver::resolve(name, false, dialect);
                dialect.date_trunc(&resolved.sql, *interval)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::where_clause::WhereCondition;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_group_by_single_field() {
        let (sql, binds) = Aggregator::build(
            "app.bsky.feed.post",
            &[GroupByField::Simple("did".to_string())],
            None,
            CountOrder::Descending,
            10,
            Dialect::Sqlite,
        );
        assert!(sql.starts_with("SELECT did AS field_0, COUNT(*) AS count FROM record WHERE collection = ?"));
        assert!(sql.contains("GROUP BY field_0"));
        assert!(sql.contains("ORDER BY count DESC"));
        assert!(sql.contains("LIMIT 10"));
        assert_eq!(binds, vec![Value::text("app.bsky.feed.post")]);
    }

    #[test]
    fn date_trunc_group_by_wraps_field_expression() {
        let (sql, _) = Aggregator::build(
            "app.bsky.feed.post",
            &[GroupByField::DateTrunc("createdAt".to_string(), Interval::Day)],
            None,
            CountOrder::Ascending,
            5,
            Dialect::Sqlite,
        );
        assert!(sql.contains("strftime("));
        assert!(sql.contains("ORDER BY count ASC"));
    }

    #[test]
    fn multi_field_group_by_with_where_clause() {
        let clause = WhereClause::empty().field(
            "lang",
            WhereCondition {
                eq: Some(Value::text("en")),
                ..Default::default()
            },
        );
        let (sql, binds) = Aggregator::build(
            "app.bsky.feed.post",
            &[
                GroupByField::Simple("did".to_string()),
                GroupByField::DateTrunc("indexedAt".to_string(), Interval::Hour),
            ],
            Some(&clause),
            CountOrder::Descending,
            25,
            Dialect::Postgres,
        );
        assert!(sql.contains("did AS field_0"));
        assert!(sql.contains("TO_CHAR"));
        assert!(sql.contains("GROUP BY field_0, field_1"));
        assert!(sql.contains("collection = $1"));
        assert!(sql.contains("$2"));
        assert_eq!(binds.len(), 2);
    }
}
