//! GraphQL surface over the record query engine.
//!
//! Parses filter/sort/pagination input objects into `skydex-query` types
//! and drives `PageQuery`/`Aggregator`/`NotificationsPageQuery`. Holds no
//! engine invariant itself — every WHERE/ORDER BY/cursor rule lives in
//! `skydex-query`; this crate only translates GraphQL shapes into the
//! engine's own types and back.

pub mod context;
pub mod error;
pub mod input;
pub mod resolver;
pub mod schema;

pub use context::GraphQLContext;
pub use error::GraphQLError;
pub use resolver::QueryRoot;

use async_graphql::{EmptyMutation, EmptySubscription, Schema};

/// The concrete schema type: no mutations (the engine is read-only) and no
/// subscriptions (no LISTEN/NOTIFY broker in scope).
pub type RecordSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema() -> RecordSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription).finish()
}
