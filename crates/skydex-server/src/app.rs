//! Axum router and request handlers.

use std::sync::Arc;

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::Router;
use skydex_graphql::GraphQLContext;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::state::AppState;

/// Build the full Axum router: `/graphql` (POST, query execution) and
/// `/graphql` (GET, GraphiQL-style playground), plus `/health`/`/ready`
/// for container orchestration.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", post(graphql_handler).get(graphql_playground))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn graphql_handler(State(state): State<AppState>, req: GraphQLRequest) -> GraphQLResponse {
    let ctx = GraphQLContext::new(Arc::clone(&state.db));
    debug!("executing GraphQL request");
    let request = req.into_inner().data(ctx);
    state.schema.execute(request).await.into()
}

async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

async fn health_check() -> &'static str {
    "ok"
}

/// A cheap readiness probe: any database error means "not ready" rather
/// than propagating — the orchestrator just needs a bool, not a stack
/// trace.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    use skydex_query::{PageArgs, PageQuery, PageQueryInput};

    let result = PageQuery::run(
        state.db.as_ref(),
        PageQueryInput {
            collection: "app.bsky.feed.post",
            where_clause: None,
            sort: None,
            page: PageArgs {
                first: Some(1),
                ..Default::default()
            },
            with_total_count: false,
        },
    )
    .await;

    match result {
        Ok(_) => (axum::http::StatusCode::OK, "ready"),
        Err(_) => (axum::http::StatusCode::SERVICE_UNAVAILABLE, "not ready"),
    }
}
