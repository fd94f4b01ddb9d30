//! Application state.

use std::sync::Arc;

use skydex_core::AppConfig;
use skydex_graphql::RecordSchema;
use skydex_query::DbHandle;

/// Shared application state, handed to every Axum handler via
/// [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    /// The query engine's database handle, backed by a concrete `sqlx`
    /// pool — see [`crate::db::SqlxDb`].
    pub db: Arc<dyn DbHandle>,
    /// Process configuration.
    pub config: Arc<AppConfig>,
    /// The built GraphQL schema, shared across requests.
    pub schema: RecordSchema,
}

impl AppState {
    pub fn new(db: Arc<dyn DbHandle>, config: AppConfig, schema: RecordSchema) -> Self {
        Self {
            db,
            config: Arc::new(config),
            schema,
        }
    }
}
