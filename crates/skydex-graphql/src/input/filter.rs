//! Filter input objects, converting GraphQL-shaped filter arguments into
//! [`skydex_query::WhereClause`] trees.
//!
//! Mirrors the teacher's `StringFilterInput`/`IntFilterInput`/
//! `TableFilter` shapes, trimmed to the three scalar kinds
//! [`skydex_query::Value`] actually carries (no float, no UUID) and
//! generalised with a `json` field list so arbitrary JSON paths stay
//! filterable without a fixed GraphQL field per path.

use async_graphql::InputObject;
use skydex_query::{Value, WhereClause, WhereCondition};

/// A batch of `IN` values larger than this is split into OR'd chunks so no
/// single query parameter list grows unbounded (SQLite's default
/// `SQLITE_LIMIT_VARIABLE_NUMBER` is the binding constraint here).
const MAX_IN_LIST_CHUNK: usize = 900;

#[derive(InputObject, Clone, Debug, Default)]
pub struct StringFilterInput {
    pub eq: Option<String>,
    #[graphql(name = "in")]
    pub in_list: Option<Vec<String>>,
    pub contains: Option<String>,
    pub gt: Option<String>,
    pub gte: Option<String>,
    pub lt: Option<String>,
    pub lte: Option<String>,
    pub is_null: Option<bool>,
}

impl StringFilterInput {
    pub fn is_empty(&self) -> bool {
        self.eq.is_none()
            && self.in_list.is_none()
            && self.contains.is_none()
            && self.gt.is_none()
            && self.gte.is_none()
            && self.lt.is_none()
            && self.lte.is_none()
            && self.is_null.is_none()
    }

    fn to_condition(&self) -> WhereCondition {
        WhereCondition {
            eq: self.eq.clone().map(Value::text),
            in_list: self
                .in_list
                .clone()
                .map(|values| values.into_iter().map(Value::text).collect()),
            contains: self.contains.clone(),
            gt: self.gt.clone().map(Value::text),
            gte: self.gte.clone().map(Value::text),
            lt: self.lt.clone().map(Value::text),
            lte: self.lte.clone().map(Value::text),
            is_null: self.is_null,
            is_numeric: false,
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct IntFilterInput {
    pub eq: Option<i32>,
    #[graphql(name = "in")]
    pub in_list: Option<Vec<i32>>,
    pub gt: Option<i32>,
    pub gte: Option<i32>,
    pub lt: Option<i32>,
    pub lte: Option<i32>,
    pub is_null: Option<bool>,
}

impl IntFilterInput {
    pub fn is_empty(&self) -> bool {
        self.eq.is_none()
            && self.in_list.is_none()
            && self.gt.is_none()
            && self.gte.is_none()
            && self.lt.is_none()
            && self.lte.is_none()
            && self.is_null.is_none()
    }

    fn to_condition(&self) -> WhereCondition {
        WhereCondition {
            eq: self.eq.map(|n| Value::Integer(n as i64)),
            in_list: self
                .in_list
                .clone()
                .map(|values| values.into_iter().map(|n| Value::Integer(n as i64)).collect()),
            contains: None,
            gt: self.gt.map(|n| Value::Integer(n as i64)),
            gte: self.gte.map(|n| Value::Integer(n as i64)),
            lt: self.lt.map(|n| Value::Integer(n as i64)),
            lte: self.lte.map(|n| Value::Integer(n as i64)),
            is_null: self.is_null,
            is_numeric: true,
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct BooleanFilterInput {
    pub eq: Option<bool>,
    pub is_null: Option<bool>,
}

impl BooleanFilterInput {
    pub fn is_empty(&self) -> bool {
        self.eq.is_none() && self.is_null.is_none()
    }

    fn to_condition(&self) -> WhereCondition {
        WhereCondition {
            eq: self.eq.map(Value::Boolean),
            is_null: self.is_null,
            ..Default::default()
        }
    }
}

/// One filter on an arbitrary dotted JSON path. Exactly one of `string`,
/// `int`, `boolean` is expected to be set; if more than one is, `string`
/// takes precedence over `int` over `boolean` rather than erroring.
#[derive(InputObject, Clone, Debug, Default)]
pub struct JsonFieldFilterInput {
    pub path: String,
    pub string: Option<StringFilterInput>,
    pub int: Option<IntFilterInput>,
    pub boolean: Option<BooleanFilterInput>,
}

impl JsonFieldFilterInput {
    fn to_clause(&self) -> Option<WhereClause> {
        let condition = if let Some(f) = &self.string {
            if f.is_empty() {
                return None;
            }
            f.to_condition()
        } else if let Some(f) = &self.int {
            if f.is_empty() {
                return None;
            }
            f.to_condition()
        } else if let Some(f) = &self.boolean {
            if f.is_empty() {
                return None;
            }
            f.to_condition()
        } else {
            return None;
        };

        clause_for_condition(&self.path, &condition)
    }
}

/// The top-level record filter: named filters for every table column plus
/// `actorHandle`, a `json` list for arbitrary paths, and recursive
/// `and`/`or` composition. There is no `not` — [`WhereClause`] has no
/// negation primitive, so a negated filter has no engine counterpart.
#[derive(InputObject, Clone, Debug, Default)]
pub struct RecordFilterInput {
    pub uri: Option<StringFilterInput>,
    pub cid: Option<StringFilterInput>,
    pub did: Option<StringFilterInput>,
    pub collection: Option<StringFilterInput>,
    pub rkey: Option<StringFilterInput>,
    pub indexed_at: Option<StringFilterInput>,
    pub actor_handle: Option<StringFilterInput>,
    pub json: Option<Vec<JsonFieldFilterInput>>,
    pub and: Option<Vec<RecordFilterInput>>,
    pub or: Option<Vec<RecordFilterInput>>,
}

impl RecordFilterInput {
    pub fn is_empty(&self) -> bool {
        self.to_where_clause().is_none()
    }

    /// Fold the whole input tree into one [`WhereClause`], mirroring the
    /// teacher's `to_logic_tree` recursion: named fields and JSON filters
    /// become sibling AND children, `and`/`or` recurse into their own
    /// nested children.
    pub fn to_where_clause(&self) -> Option<WhereClause> {
        let mut children: Vec<WhereClause> = Vec::new();

        for (name, filter) in [
            ("uri", &self.uri),
            ("cid", &self.cid),
            ("did", &self.did),
            ("collection", &self.collection),
            ("rkey", &self.rkey),
            ("indexed_at", &self.indexed_at),
            ("actorHandle", &self.actor_handle),
        ] {
            if let Some(filter) = filter {
                if !filter.is_empty() {
                    if let Some(clause) = clause_for_condition(name, &filter.to_condition()) {
                        children.push(clause);
                    }
                }
            }
        }

        if let Some(json_filters) = &self.json {
            for field in json_filters {
                if let Some(clause) = field.to_clause() {
                    children.push(clause);
                }
            }
        }

        if let Some(ands) = &self.and {
            let and_children: Vec<WhereClause> = ands.iter().filter_map(Self::to_where_clause).collect();
            if !and_children.is_empty() {
                children.push(WhereClause::empty().and(and_children));
            }
        }

        if let Some(ors) = &self.or {
            let or_children: Vec<WhereClause> = ors.iter().filter_map(Self::to_where_clause).collect();
            if !or_children.is_empty() {
                children.push(WhereClause::empty().or(or_children));
            }
        }

        if children.is_empty() {
            None
        } else {
            Some(WhereClause::empty().and(children))
        }
    }
}

/// Build the clause for one field's condition, splitting an oversized `IN`
/// list into OR'd chunks of at most [`MAX_IN_LIST_CHUNK`] values each.
fn clause_for_condition(field_name: &str, condition: &WhereCondition) -> Option<WhereClause> {
    let in_values = condition.in_list.as_ref().filter(|v| v.len() > MAX_IN_LIST_CHUNK);

    let Some(values) = in_values else {
        if condition.is_empty() && condition.in_list.as_ref().map_or(true, Vec::is_empty) {
            return None;
        }
        return Some(WhereClause::empty().field(field_name, condition.clone()));
    };

    let mut base = condition.clone();
    base.in_list = None;

    let chunk_clauses: Vec<WhereClause> = values
        .chunks(MAX_IN_LIST_CHUNK)
        .map(|chunk| {
            WhereClause::empty().field(
                field_name,
                WhereCondition {
                    in_list: Some(chunk.to_vec()),
                    ..Default::default()
                },
            )
        })
        .collect();
    let chunked = WhereClause::empty().or(chunk_clauses);

    if base.is_empty() {
        Some(chunked)
    } else {
        Some(WhereClause::empty().field(field_name, base).and(vec![chunked]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skydex_query::{Dialect, WhereBuilder};

    #[test]
    fn empty_filter_yields_no_clause() {
        assert!(RecordFilterInput::default().to_where_clause().is_none());
    }

    #[test]
    fn single_named_field_builds_eq_condition() {
        let filter = RecordFilterInput {
            collection: Some(StringFilterInput {
                eq: Some("app.bsky.feed.post".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let clause = filter.to_where_clause().unwrap();
        let (sql, binds, _) = WhereBuilder::build(&clause, false, Dialect::Sqlite, 1);
        assert_eq!(sql, "collection = ?");
        assert_eq!(binds, vec![Value::text("app.bsky.feed.post")]);
    }

    #[test]
    fn json_field_filter_resolves_dotted_path() {
        let filter = RecordFilterInput {
            json: Some(vec![JsonFieldFilterInput {
                path: "user.name".to_string(),
                string: Some(StringFilterInput {
                    contains: Some("ali".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let clause = filter.to_where_clause().unwrap();
        let (sql, _, _) = WhereBuilder::build(&clause, false, Dialect::Sqlite, 1);
        assert!(sql.contains("json_extract(json,'$.user.name')"));
    }

    #[test]
    fn and_or_compose_recursively() {
        let filter = RecordFilterInput {
            or: Some(vec![
                RecordFilterInput {
                    did: Some(StringFilterInput {
                        eq: Some("did:plc:a".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                RecordFilterInput {
                    did: Some(StringFilterInput {
                        eq: Some("did:plc:b".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        let clause = filter.to_where_clause().unwrap();
        let (sql, binds, _) = WhereBuilder::build(&clause, false, Dialect::Sqlite, 1);
        assert!(sql.contains(" OR "));
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn oversized_in_list_splits_into_or_chunks() {
        let values: Vec<String> = (0..1801).map(|n| format!("did:plc:{n}")).collect();
        let filter = RecordFilterInput {
            did: Some(StringFilterInput {
                in_list: Some(values),
                ..Default::default()
            }),
            ..Default::default()
        };
        let clause = filter.to_where_clause().unwrap();
        let (sql, binds, _) = WhereBuilder::build(&clause, false, Dialect::Sqlite, 1);
        // 1801 values split into chunks of 900 -> 3 OR'd IN clauses.
        assert_eq!(sql.matches(" IN (").count(), 3);
        assert_eq!(binds.len(), 1801);
    }

    #[test]
    fn int_filter_marks_condition_numeric() {
        let filter = RecordFilterInput {
            json: Some(vec![JsonFieldFilterInput {
                path: "age".to_string(),
                int: Some(IntFilterInput {
                    gt: Some(10),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let clause = filter.to_where_clause().unwrap();
        let (sql, _, _) = WhereBuilder::build(&clause, false, Dialect::Sqlite, 1);
        assert!(sql.contains("CAST(json_extract(json,'$.age') AS INTEGER) > ?"));
    }
}
