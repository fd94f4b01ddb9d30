//! ORDER BY construction.

use crate::dialect::Dialect;
use crate::field::{FieldResolver, DATETIME_JSON_FIELDS};

/// Ascending or descending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One field in a multi-field sort, in priority order.
#[derive(Clone, Debug, PartialEq)]
pub struct SortField {
    pub name: String,
    pub direction: SortDirection,
}

/// A complete, ordered sort specification. Always implicitly terminated by
/// `cid ASC` (or its direction-reversed counterpart when the spec is built
/// for query-order under backward pagination) so ties are always broken
/// deterministically — callers of [`OrderBuilder`] never need to append the
/// tiebreaker themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct SortSpec {
    pub fields: Vec<SortField>,
}

impl SortSpec {
    pub fn new(fields: Vec<SortField>) -> Self {
        Self { fields }
    }

    /// Reverse every field's direction — used to turn a user-facing sort
    /// into the "query sort" driving a backward-paginated SQL query, whose
    /// results are then re-reversed in memory before being returned.
    pub fn reversed(&self) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|f| SortField {
                    name: f.name.clone(),
                    direction: f.direction.reversed(),
                })
                .collect(),
        }
    }
}

/// Renders a [`SortSpec`] plus the mandatory `cid` tiebreaker into an
/// `ORDER BY` clause.
pub struct OrderBuilder;

impl OrderBuilder {
    /// An empty `SortSpec` defaults to `indexed_at DESC NULLS LAST`, same
    /// as [`crate::PageQuery`]'s default when no sort is supplied at all —
    /// this keeps direct `OrderBuilder` callers (e.g. `Aggregator`) honest
    /// to the same default even if they never go through `PageQuery`.
    pub fn build(spec: &SortSpec, use_table_prefix: bool, dialect: Dialect) -> String {
        if spec.fields.is_empty() {
            return Self::build(&Self::default_spec(), use_table_prefix, dialect);
        }

        let mut terms: Vec<String> = spec
            .fields
            .iter()
            .map(|field| Self::render_field(field, use_table_prefix, dialect))
            .collect();

        let cid_column = if use_table_prefix { "record.cid" } else { "cid" };
        terms.push(format!("{cid_column} {}", SortDirection::Ascending.keyword()));

        terms.join(", ")
    }

    fn default_spec() -> SortSpec {
        SortSpec::new(vec![SortField {
            name: "indexed_at".to_string(),
            direction: SortDirection::Descending,
        }])
    }

    /// Every emitted fragment ends in `NULLS LAST` so JSON fields with
    /// missing/unparseable values sort consistently across both dialects
    /// (SQLite and Postgres otherwise disagree on default NULL placement).
    fn render_field(field: &SortField, use_table_prefix: bool, dialect: Dialect) -> String {
        let expr = if DATETIME_JSON_FIELDS.contains(&field.name.as_str()) {
            FieldResolver::resolve_datetime_sort(&field.name, use_table_prefix, dialect)
        } else {
            FieldResolver::resolve(&field.name, use_table_prefix, dialect).sql
        };
        format!("{expr} {} NULLS LAST", field.direction.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_field_plus_cid_tiebreaker() {
        let spec = SortSpec::new(vec![SortField {
            name: "indexed_at".to_string(),
            direction: SortDirection::Descending,
        }]);
        let sql = OrderBuilder::build(&spec, false, Dialect::Sqlite);
        assert_eq!(sql, "indexed_at DESC NULLS LAST, cid ASC");
    }

    #[test]
    fn empty_spec_defaults_to_indexed_at_desc() {
        let sql = OrderBuilder::build(&SortSpec::new(vec![]), false, Dialect::Sqlite);
        assert_eq!(sql, "indexed_at DESC NULLS LAST, cid ASC");
    }

    #[test]
    fn multi_field_sort_preserves_priority_order() {
        let spec = SortSpec::new(vec![
            SortField {
                name: "collection".to_string(),
                direction: SortDirection::Ascending,
            },
            SortField {
                name: "indexed_at".to_string(),
                direction: SortDirection::Descending,
            },
        ]);
        let sql = OrderBuilder::build(&spec, false, Dialect::Sqlite);
        assert_eq!(sql, "collection ASC NULLS LAST, indexed_at DESC NULLS LAST, cid ASC");
    }

    #[test]
    fn datetime_json_field_wraps_with_null_coercion() {
        let spec = SortSpec::new(vec![SortField {
            name: "createdAt".to_string(),
            direction: SortDirection::Ascending,
        }]);
        let sql = OrderBuilder::build(&spec, false, Dialect::Sqlite);
        assert!(sql.starts_with("CASE WHEN"));
        assert!(sql.ends_with("ASC NULLS LAST, cid ASC"));
    }

    #[test]
    fn reversed_flips_every_field_direction() {
        let spec = SortSpec::new(vec![
            SortField {
                name: "a".to_string(),
                direction: SortDirection::Ascending,
            },
            SortField {
                name: "b".to_string(),
                direction: SortDirection::Descending,
            },
        ]);
        let reversed = spec.reversed();
        assert_eq!(reversed.fields[0].direction, SortDirection::Descending);
        assert_eq!(reversed.fields[1].direction, SortDirection::Ascending);
        // reversing twice returns to the original
        assert_eq!(reversed.reversed(), spec);
    }

    #[test]
    fn table_prefix_applies_to_cid_tiebreaker_too() {
        let spec = SortSpec::new(vec![SortField {
            name: "did".to_string(),
            direction: SortDirection::Ascending,
        }]);
        let sql = OrderBuilder::build(&spec, true, Dialect::Sqlite);
        assert_eq!(sql, "record.did ASC NULLS LAST, record.cid ASC");
    }
}
