//! Folds a [`WhereClause`] tree into a parameterized SQL fragment.

use crate::dialect::Dialect;
use crate::field::FieldResolver;
use crate::value::Value;
use crate::where_clause::{WhereClause, WhereCondition};

/// Owns the next placeholder index and the growable bind list. Every
/// builder that allocates a placeholder takes `&mut IndexAllocator`, which
/// localises the off-by-one hazard of juggling several independent
/// counters across WHERE, cursor-predicate and collection-filter
/// fragments.
pub struct IndexAllocator {
    next: usize,
    binds: Vec<Value>,
}

impl IndexAllocator {
    pub fn new(start_index: usize) -> Self {
        Self {
            next: start_index,
            binds: Vec::new(),
        }
    }

    /// Allocate the next placeholder index for `value`, returning the index
    /// (1-indexed, dialect-agnostic — [`Dialect::placeholder`] renders it).
    pub fn push(&mut self, value: Value) -> usize {
        let index = self.next;
        self.next += 1;
        self.binds.push(value);
        index
    }

    pub fn next_index(&self) -> usize {
        self.next
    }

    pub fn into_binds(self) -> Vec<Value> {
        self.binds
    }
}

/// Folds a `WhereClause` tree into `(sql_fragment, bind_values)` with
/// deterministic placeholder numbering, never interpolating a runtime
/// string anywhere except through `Dialect::placeholder`.
pub struct WhereBuilder;

impl WhereBuilder {
    /// Public entry point: build a clause starting a fresh allocator at
    /// `start_index`. Returns `(sql, binds, next_index)`. An empty clause
    /// yields `("", [])`.
    pub fn build(
        clause: &WhereClause,
        use_table_prefix: bool,
        dialect: Dialect,
        start_index: usize,
    ) -> (String, Vec<Value>, usize) {
        let mut allocator = IndexAllocator::new(start_index);
        let sql = Self::build_into(clause, use_table_prefix, dialect, &mut allocator).unwrap_or_default();
        let next_index = allocator.next_index();
        (sql, allocator.into_binds(), next_index)
    }

    /// Low-level entry point used by [`crate::PageQuery`] and
    /// [`crate::Aggregator`] to share one allocator across the collection
    /// filter, the WHERE clause, and (for PageQuery) the cursor predicate,
    /// so placeholder indices flow through all three in left-to-right
    /// order. Returns `None` for an empty clause — callers should skip
    /// appending anything in that case rather than AND-ing in an empty
    /// string.
    pub fn build_into(
        clause: &WhereClause,
        use_table_prefix: bool,
        dialect: Dialect,
        allocator: &mut IndexAllocator,
    ) -> Option<String> {
        let mut pieces = Vec::new();

        for (field, condition) in &clause.fields {
            if let Some(fragment) = Self::build_condition(field, condition, use_table_prefix, dialect, allocator) {
                pieces.push(fragment);
            }
        }

        for child in &clause.and {
            if let Some((sql, count)) = Self::reduce(child, use_table_prefix, dialect, allocator) {
                pieces.push(Self::wrap_if_multi(sql, count));
            }
        }

        if !clause.or.is_empty() {
            let or_pieces: Vec<String> = clause
                .or
                .iter()
                .filter_map(|child| Self::reduce(child, use_table_prefix, dialect, allocator))
                .map(|(sql, count)| Self::wrap_if_multi(sql, count))
                .collect();
            if !or_pieces.is_empty() {
                pieces.push(format!("({})", or_pieces.join(" OR ")));
            }
        }

        if pieces.is_empty() {
            None
        } else {
            Some(pieces.join(" AND "))
        }
    }

    /// Reduce a clause to `(sql, fragment_count)`, where `fragment_count`
    /// is the number of top-level AND-joined pieces — the count a caller
    /// needs to decide whether to parenthesise this clause when embedding
    /// it inside another (rule 4: a nested child with >1 fragment is
    /// wrapped, a single-fragment child is emitted bare).
    fn reduce(
        clause: &WhereClause,
        use_table_prefix: bool,
        dialect: Dialect,
        allocator: &mut IndexAllocator,
    ) -> Option<(String, usize)> {
        let mut pieces = Vec::new();

        for (field, condition) in &clause.fields {
            if let Some(fragment) = Self::build_condition(field, condition, use_table_prefix, dialect, allocator) {
                pieces.push(fragment);
            }
        }

        for child in &clause.and {
            if let Some((sql, count)) = Self::reduce(child, use_table_prefix, dialect, allocator) {
                pieces.push(Self::wrap_if_multi(sql, count));
            }
        }

        if !clause.or.is_empty() {
            let or_pieces: Vec<String> = clause
                .or
                .iter()
                .filter_map(|child| Self::reduce(child, use_table_prefix, dialect, allocator))
                .map(|(sql, count)| Self::wrap_if_multi(sql, count))
                .collect();
            if !or_pieces.is_empty() {
                pieces.push(format!("({})", or_pieces.join(" OR ")));
            }
        }

        if pieces.is_empty() {
            return None;
        }
        let count = pieces.len();
        Some((pieces.join(" AND "), count))
    }

    fn wrap_if_multi(sql: String, fragment_count: usize) -> String {
        if fragment_count > 1 {
            format!("({sql})")
        } else {
            sql
        }
    }

    /// Emit the SQL for every operator set on one condition, AND-joined
    /// (e.g. `gt` and `lt` together become `expr > ? AND expr < ?` with no
    /// extra parentheses — they count as one piece at the parent level).
    fn build_condition(
        field: &str,
        condition: &WhereCondition,
        use_table_prefix: bool,
        dialect: Dialect,
        allocator: &mut IndexAllocator,
    ) -> Option<String> {
        if condition.is_empty() {
            return None;
        }

        let resolved = FieldResolver::resolve(field, use_table_prefix, dialect);
        let cast_for_range = condition.is_numeric && resolved.is_json && condition.has_range_operator();
        let range_expr = if cast_for_range {
            dialect.integer_cast(&resolved.sql)
        } else {
            resolved.sql.clone()
        };

        let mut pieces = Vec::new();

        if let Some(value) = &condition.eq {
            let idx = allocator.push(value.clone());
            pieces.push(format!("{} = {}", resolved.sql, dialect.placeholder(idx)));
        }

        if let Some(values) = &condition.in_list {
            if !values.is_empty() {
                let start = allocator.next_index();
                for value in values {
                    allocator.push(value.clone());
                }
                pieces.push(format!(
                    "{} IN ({})",
                    resolved.sql,
                    dialect.placeholders(values.len(), start)
                ));
            }
            // an empty `in` list is semantically vacuous: no SQL, no binds.
        }

        if let Some(substring) = &condition.contains {
            let idx = allocator.push(Value::text(substring.clone()));
            pieces.push(format!(
                "{} {} '%' || {} || '%'{}",
                resolved.sql,
                dialect.like_operator(),
                dialect.placeholder(idx),
                dialect.like_collation()
            ));
        }

        if let Some(value) = &condition.gt {
            let idx = allocator.push(value.clone());
            pieces.push(format!("{} > {}", range_expr, dialect.placeholder(idx)));
        }
        if let Some(value) = &condition.gte {
            let idx = allocator.push(value.clone());
            pieces.push(format!("{} >= {}", range_expr, dialect.placeholder(idx)));
        }
        if let Some(value) = &condition.lt {
            let idx = allocator.push(value.clone());
            pieces.push(format!("{} < {}", range_expr, dialect.placeholder(idx)));
        }
        if let Some(value) = &condition.lte {
            let idx = allocator.push(value.clone());
            pieces.push(format!("{} <= {}", range_expr, dialect.placeholder(idx)));
        }

        if let Some(is_null) = condition.is_null {
            let op = if is_null { "IS NULL" } else { "IS NOT NULL" };
            pieces.push(format!("{} {}", resolved.sql, op));
        }

        if pieces.is_empty() {
            None
        } else {
            Some(pieces.join(" AND "))
        }
    }
}
