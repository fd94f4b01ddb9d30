//! The per-request context handed to every resolver.

use std::sync::Arc;

use skydex_query::DbHandle;

/// Carries the database handle a resolver needs. No auth, no schema
/// cache — the engine's domain is the fixed `record` table, not an
/// introspected set of arbitrary Postgres tables, so there is nothing
/// here to discover at request time.
#[derive(Clone)]
pub struct GraphQLContext {
    pub db: Arc<dyn DbHandle>,
}

impl GraphQLContext {
    pub fn new(db: Arc<dyn DbHandle>) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skydex_core::Record;
    use skydex_query::{AggregateResult, Dialect, QueryError, Value};

    struct StubDb;

    #[async_trait]
    impl DbHandle for StubDb {
        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }
        async fn fetch_records(&self, _sql: &str, _binds: &[Value]) -> Result<Vec<Record>, QueryError> {
            Ok(vec![])
        }
        async fn fetch_count(&self, _sql: &str, _binds: &[Value]) -> Result<i64, QueryError> {
            Ok(0)
        }
        async fn fetch_aggregate_rows(
            &self,
            _sql: &str,
            _binds: &[Value],
            _group_count: usize,
        ) -> Result<Vec<AggregateResult>, QueryError> {
            Ok(vec![])
        }
    }

    #[test]
    fn context_holds_the_supplied_handle() {
        let ctx = GraphQLContext::new(Arc::new(StubDb));
        assert_eq!(ctx.db.dialect(), Dialect::Sqlite);
    }
}
