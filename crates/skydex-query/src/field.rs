//! Logical field name → SQL expression resolution.

use crate::dialect::Dialect;

/// The table columns `FieldResolver` recognises without touching the JSON
/// column at all.
const TABLE_COLUMNS: &[&str] = &["uri", "cid", "did", "collection", "indexed_at", "rkey"];

/// Sort keys that live in the JSON column but are semantically timestamps;
/// ordering on them runs through [`Dialect::datetime_or_null`].
pub const DATETIME_JSON_FIELDS: &[&str] = &["createdAt", "indexedAt"];

/// The one cross-table field: always `actor.handle`, and its presence in a
/// filter or sort is what triggers the `actor` join upstream in
/// [`crate::PageQuery`].
const ACTOR_HANDLE_FIELD: &str = "actorHandle";

/// A field name resolved to its SQL expression.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedField {
    pub sql: String,
    /// `true` for a JSON-path field — the only fields eligible for
    /// [`Dialect::integer_cast`].
    pub is_json: bool,
}

/// Maps a logical field name to a SQL expression: a table column, the
/// cross-table `actorHandle`, or a JSON path against the `json` column.
pub struct FieldResolver;

impl FieldResolver {
    pub fn is_table_column(name: &str) -> bool {
        TABLE_COLUMNS.contains(&name)
    }

    pub fn is_actor_handle(name: &str) -> bool {
        name == ACTOR_HANDLE_FIELD
    }

    /// Resolve a field name, honouring `use_table_prefix` (set when the
    /// query includes the `actor` join, so bare column names would be
    /// ambiguous).
    pub fn resolve(name: &str, use_table_prefix: bool, dialect: Dialect) -> ResolvedField {
        if Self::is_actor_handle(name) {
            return ResolvedField {
                sql: "actor.handle".to_string(),
                is_json: false,
            };
        }

        if Self::is_table_column(name) {
            let sql = if use_table_prefix {
                format!("record.{name}")
            } else {
                name.to_string()
            };
            return ResolvedField { sql, is_json: false };
        }

        let json_column = if use_table_prefix { "record.json" } else { "json" };
        let path: Vec<&str> = name.split('.').collect();
        ResolvedField {
            sql: dialect.json_extract(json_column, &path),
            is_json: true,
        }
    }

    /// Resolve a datetime-validated sort key (`createdAt`/`indexedAt`),
    /// coercing unparseable values to `NULL` so `NULLS LAST` pushes them to
    /// the end instead of sorting lexically alongside valid timestamps.
    pub fn resolve_datetime_sort(name: &str, use_table_prefix: bool, dialect: Dialect) -> String {
        let resolved = Self::resolve(name, use_table_prefix, dialect);
        if DATETIME_JSON_FIELDS.contains(&name) && resolved.is_json {
            dialect.datetime_or_null(&resolved.sql)
        } else {
            resolved.sql
        }
    }
}
