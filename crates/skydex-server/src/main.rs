//! Skydex HTTP server.
//!
//! Loads configuration, connects a database pool for whichever dialect is
//! configured, mounts the GraphQL schema behind Axum, and serves.

use std::sync::Arc;

use anyhow::Result;
use skydex_core::AppConfig;
use skydex_graphql::build_schema;
use skydex_server::db::SqlxDb;
use skydex_server::state::AppState;
use skydex_server::{app, migrate};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_filter.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting skydex server");
    info!(dialect = %config.dialect, "connecting to database");

    let db: Arc<dyn skydex_query::DbHandle> = match config.dialect.as_str() {
        "postgres" | "postgresql" => {
            let pool = PgPoolOptions::new()
                .max_connections(config.pool_size)
                .connect(&config.database_url)
                .await?;
            Arc::new(SqlxDb::Postgres(pool))
        }
        _ => {
            let pool = SqlitePoolOptions::new()
                .max_connections(config.pool_size)
                .connect(&config.database_url)
                .await?;
            migrate::bootstrap_sqlite(&pool).await?;
            Arc::new(SqlxDb::Sqlite(pool))
        }
    };

    info!("connected to database");

    let schema = build_schema();
    let state = AppState::new(db, config.clone(), schema);
    let app = app::build_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{addr}/graphql");

    axum::serve(listener, app).await?;

    Ok(())
}
