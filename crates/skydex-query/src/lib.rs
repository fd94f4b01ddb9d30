//! The record query engine.
//!
//! Translates GraphQL-shaped filter/sort/pagination arguments into safe,
//! dialect-correct SQL against a single `record` table (and an optional
//! `actor` join), with cursor-based bidirectional pagination stable under
//! concurrent writes. No HTTP, no GraphQL types, no database driver —
//! callers supply a [`DbHandle`] and own every other layer.

mod aggregate;
mod cursor;
mod cursor_predicate;
mod db;
mod dialect;
mod error;
mod field;
mod notifications;
mod order;
mod page_query;
mod value;
mod where_builder;
mod where_clause;

pub use aggregate::{AggregateResult, Aggregator, CountOrder, GroupByField};
pub use cursor::{CursorCodec, DecodedCursor};
pub use db::DbHandle;
pub use dialect::{Dialect, Interval};
pub use error::QueryError;
pub use field::FieldResolver;
pub use notifications::{NotificationsPage, NotificationsPageQuery};
pub use order::{OrderBuilder, SortDirection, SortField, SortSpec};
pub use page_query::{PageArgs, PageQuery, PageQueryInput, PageResult};
pub use value::Value;
pub use where_builder::{IndexAllocator, WhereBuilder};
pub use where_clause::{WhereClause, WhereCondition};
