//! Skydex HTTP server library.
//!
//! Wires the record query engine (`skydex-query`) and its GraphQL surface
//! (`skydex-graphql`) to a concrete `sqlx` connection pool and an Axum
//! router. Everything here is external-collaborator plumbing per spec.md
//! §1/§6 — no WHERE/cursor/dialect invariant is implemented in this crate,
//! only driven.

pub mod app;
pub mod db;
pub mod migrate;
pub mod state;

pub use app::build_router;
pub use db::SqlxDb;
pub use state::AppState;
