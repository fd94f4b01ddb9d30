//! Minimal bootstrap DDL for local development.
//!
//! Schema migrations are an explicit Non-goal (spec.md §1) — this is not a
//! migration system, it never alters an existing table, and it runs
//! `CREATE TABLE IF NOT EXISTS` exactly once at startup so a developer
//! pointing skydex at an empty SQLite file has somewhere to write records
//! to before wiring up the real ingestion pipeline (out of scope, per
//! spec.md §1, and never built here).

use sqlx::sqlite::SqlitePool;

const SQLITE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS record (
    uri TEXT PRIMARY KEY,
    cid TEXT NOT NULL,
    did TEXT NOT NULL,
    collection TEXT NOT NULL,
    json TEXT NOT NULL,
    indexed_at TEXT NOT NULL DEFAULT (datetime('now')),
    rkey TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS record_cid_idx ON record(cid);
CREATE INDEX IF NOT EXISTS record_collection_idx ON record(collection);
CREATE INDEX IF NOT EXISTS record_did_idx ON record(did);

CREATE TABLE IF NOT EXISTS actor (
    did TEXT PRIMARY KEY,
    handle TEXT
);
"#;

/// Run the bootstrap DDL against a SQLite pool. A no-op on an already
/// populated database — every statement is `IF NOT EXISTS`.
pub async fn bootstrap_sqlite(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SQLITE_DDL.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
