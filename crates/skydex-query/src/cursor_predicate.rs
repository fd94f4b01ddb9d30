//! The progressive-tuple OR-of-ANDs predicate that turns a decoded cursor
//! into a WHERE fragment, generalising the rsky keyset row-value comparison
//! `(created_at, did) > (x, y)` from a fixed pair to an N-field tuple plus
//! the trailing `cid`.

use crate::cursor::DecodedCursor;
use crate::dialect::Dialect;
use crate::field::{FieldResolver, DATETIME_JSON_FIELDS};
use crate::order::{SortDirection, SortSpec};
use crate::value::Value;
use crate::where_builder::IndexAllocator;

/// Builds the boundary predicate for keyset pagination.
///
/// Not every database supports row-value comparison (`(a, b) > (x, y)`)
/// uniformly across JSON expressions, so the predicate is expanded to its
/// logically equivalent progressive form:
///
/// ```text
/// (f1 OP1 v1)
/// OR (f1 = v1 AND f2 OP2 v2)
/// OR (f1 = v1 AND f2 = v2 AND f3 OP3 v3)
/// OR (f1 = v1 AND ... AND fN = vN AND cid OP_TIE cid_v)
/// ```
///
/// `CursorPredicate` always takes the *original*, un-reversed [`SortSpec`]
/// — its own `is_before` flag together with each field's direction already
/// determines the comparison operator, so the caller must not pre-reverse
/// the spec before handing it here (that reversal belongs solely to
/// [`crate::OrderBuilder`] when rendering the query-order ORDER BY for a
/// backward page).
pub struct CursorPredicate;

impl CursorPredicate {
    /// `is_before`: `true` when the predicate should select rows before the
    /// cursor (i.e. this is a backward page), `false` for rows after it.
    pub fn build(
        spec: &SortSpec,
        decoded: &DecodedCursor,
        is_before: bool,
        use_table_prefix: bool,
        dialect: Dialect,
        allocator: &mut IndexAllocator,
    ) -> Option<String> {
        if spec.fields.len() != decoded.values.len() {
            return None;
        }

        let mut disjuncts = Vec::new();

        for i in 0..spec.fields.len() {
            let conjunct = Self::progressive_conjunct(spec, decoded, i, is_before, use_table_prefix, dialect, allocator, false);
            disjuncts.push(conjunct);
        }

        // final disjunct: all sort fields equal, tiebreak on cid.
        let tie = Self::progressive_conjunct(
            spec,
            decoded,
            spec.fields.len(),
            is_before,
            use_table_prefix,
            dialect,
            allocator,
            true,
        );
        disjuncts.push(tie);

        if disjuncts.is_empty() {
            None
        } else {
            Some(format!("({})", disjuncts.join(" OR ")))
        }
    }

    /// Build one disjunct: equality on fields `0..boundary_index`, then a
    /// strict comparison on the field at `boundary_index` (or on `cid`, when
    /// `tiebreak` is set and `boundary_index == spec.fields.len()`).
    #[allow(clippy::too_many_arguments)]
    fn progressive_conjunct(
        spec: &SortSpec,
        decoded: &DecodedCursor,
        boundary_index: usize,
        is_before: bool,
        use_table_prefix: bool,
        dialect: Dialect,
        allocator: &mut IndexAllocator,
        tiebreak: bool,
    ) -> String {
        let mut equalities = Vec::new();

        for i in 0..boundary_index {
            let field = &spec.fields[i];
            let expr = Self::field_expr(field.name.as_str(), use_table_prefix, dialect);
            let idx = allocator.push(decoded.values[i].clone());
            equalities.push(format!("{expr} = {}", dialect.placeholder(idx)));
        }

        let boundary = if tiebreak {
            let cid_column = if use_table_prefix { "record.cid" } else { "cid" };
            let direction = Self::tiebreak_direction(spec, is_before);
            let idx = allocator.push(Value::text(decoded.cid.clone()));
            format!("{cid_column} {} {}", Self::cmp_operator(direction, is_before), dialect.placeholder(idx))
        } else {
            let field = &spec.fields[boundary_index];
            let expr = Self::field_expr(field.name.as_str(), use_table_prefix, dialect);
            let idx = allocator.push(decoded.values[boundary_index].clone());
            format!(
                "{expr} {} {}",
                Self::cmp_operator(field.direction, is_before),
                dialect.placeholder(idx)
            )
        };

        equalities.push(boundary);
        if equalities.len() > 1 {
            format!("({})", equalities.join(" AND "))
        } else {
            equalities.into_iter().next().unwrap_or_default()
        }
    }

    /// The direction used for the tiebreak field. `OrderBuilder` always
    /// renders the `cid` tiebreaker as `ASC` regardless of the sort's own
    /// fields, so the predicate must agree and always treat it as
    /// ascending too — tying it to the last sort field's direction would
    /// desync the two for any sort whose last field is descending
    /// (including the default `indexed_at DESC` sort), causing forward
    /// pages to skip and repeat rows.
    fn tiebreak_direction(_spec: &SortSpec, _is_before: bool) -> SortDirection {
        SortDirection::Ascending
    }

    /// The comparison operator for a field sorted in `direction`, adjusted
    /// for whether this predicate selects rows before (`is_before`) or
    /// after the cursor. Ascending + after → `>`; ascending + before → `<`;
    /// each flip of either toggles the operator (a direction-XOR-is_before
    /// relationship).
    fn cmp_operator(direction: SortDirection, is_before: bool) -> &'static str {
        match (direction, is_before) {
            (SortDirection::Ascending, false) => ">",
            (SortDirection::Ascending, true) => "<",
            (SortDirection::Descending, false) => "<",
            (SortDirection::Descending, true) => ">",
        }
    }

    fn field_expr(name: &str, use_table_prefix: bool, dialect: Dialect) -> String {
        if DATETIME_JSON_FIELDS.contains(&name) {
            FieldResolver::resolve_datetime_sort(name, use_table_prefix, dialect)
        } else {
            FieldResolver::resolve(name, use_table_prefix, dialect).sql
        }
    }
}
