//! The database handle abstraction the engine is executed against.

use async_trait::async_trait;
use skydex_core::Record;

use crate::aggregate::AggregateResult;
use crate::dialect::Dialect;
use crate::error::QueryError;
use crate::value::Value;

/// An opaque database handle supplied by the caller, constructed once at
/// process start by a surrounding component and passed in per call. The
/// engine never depends on `sqlx` (or any driver crate) directly — only on
/// this trait — so `skydex-server` is free to back it with a
/// `sqlx::SqlitePool` or `sqlx::PgPool` without the query engine knowing
/// which.
///
/// The four operations mirror the source's `dialect()` / `placeholder(i)` /
/// `query(sql, binds, row_decoder)` / `exec(sql, binds)` shape, with the
/// generic row decoder resolved to three concrete row shapes — trait
/// objects can't carry a generic decoder closure across the `async_trait`
/// boundary, and the engine only ever needs one of three result shapes.
#[async_trait]
pub trait DbHandle: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Run a query expected to decode into full `record` rows.
    async fn fetch_records(&self, sql: &str, binds: &[Value]) -> Result<Vec<Record>, QueryError>;

    /// Run a `SELECT COUNT(*) ...` query, returning the single scalar.
    async fn fetch_count(&self, sql: &str, binds: &[Value]) -> Result<i64, QueryError>;

    /// Run a `GROUP BY` query, decoding `group_count` grouped columns plus
    /// a trailing count per row.
    async fn fetch_aggregate_rows(
        &self,
        sql: &str,
        binds: &[Value],
        group_count: usize,
    ) -> Result<Vec<AggregateResult>, QueryError>;
}
