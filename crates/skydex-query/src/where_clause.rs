//! Filter tree types: [`WhereCondition`] (operators on one field) and
//! [`WhereClause`] (the tree of fields + nested AND/OR).

use crate::value::Value;
use indexmap::IndexMap;

/// The operators that can apply to one logical field. Each is independently
/// present or absent; present operators compose with AND.
#[derive(Clone, Debug, Default)]
pub struct WhereCondition {
    pub eq: Option<Value>,
    pub in_list: Option<Vec<Value>>,
    pub contains: Option<String>,
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
    pub is_null: Option<bool>,
    /// Parser-set hint: wrap the field in an integer cast when a range
    /// operator is also present. Must be `false` for any non-integer value;
    /// enforcing that is the parser's job, not this type's.
    pub is_numeric: bool,
}

impl WhereCondition {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when every operator is absent. An empty `in` list does *not*
    /// make this non-empty on its own — it's handled separately so the
    /// vacuous-membership rule (P4) stays visible at the call site.
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

    pub fn has_range_operator(&self) -> bool {
        self.gt.is_some() || self.gte.is_some() || self.lt.is_some() || self.lte.is_some()
    }
}

/// A node in the filter tree: field conditions combined with AND, plus
/// nested `and`/`or` children. An empty clause (no fields, no children)
/// contributes no SQL.
#[derive(Clone, Debug, Default)]
pub struct WhereClause {
    pub fields: IndexMap<String, WhereCondition>,
    pub and: Vec<WhereClause>,
    pub or: Vec<WhereClause>,
}

impl WhereClause {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|c| c.is_empty())
            && self.and.is_empty()
            && self.or.is_empty()
    }

    /// `true` if this clause or any descendant filters on `actorHandle`,
    /// the signal [`crate::PageQuery`] uses to decide whether the `actor`
    /// join is needed.
    pub fn references_actor_handle(&self) -> bool {
        if self.fields.contains_key("actorHandle") {
            return true;
        }
        self.and.iter().any(Self::references_actor_handle)
            || self.or.iter().any(Self::references_actor_handle)
    }

    pub fn field(mut self, name: impl Into<String>, condition: WhereCondition) -> Self {
        self.fields.insert(name.into(), condition);
        self
    }

    pub fn and(mut self, children: Vec<WhereClause>) -> Self {
        self.and = children;
        self
    }

    pub fn or(mut self, children: Vec<WhereClause>) -> Self {
        self.or = children;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clause_is_empty() {
        assert!(WhereClause::empty().is_empty());
    }

    #[test]
    fn clause_with_only_empty_in_is_empty() {
        let clause = WhereClause::empty().field(
            "collection",
            WhereCondition {
                in_list: Some(vec![]),
                ..Default::default()
            },
        );
        // The condition itself is non-empty (in_list is Some), but
        // WhereBuilder treats an empty list as vacuous SQL — that's tested
        // in where_builder, not here. This test only covers the type-level
        // emptiness check.
        assert!(!clause.is_empty());
    }

    #[test]
    fn detects_actor_handle_reference_when_nested() {
        let nested = WhereClause::empty().field(
            "actorHandle",
            WhereCondition {
                eq: Some(Value::text("alice.bsky.social")),
                ..Default::default()
            },
        );
        let outer = WhereClause::empty().and(vec![nested]);
        assert!(outer.references_actor_handle());
    }
}
