//! Sort input, converting GraphQL sort arguments into
//! [`skydex_query::SortSpec`].
//!
//! Grounded on the teacher's `OrderDirection`/`OrderByField` pair, with one
//! deliberate simplification: `field` stays a bare `String` rather than a
//! generated per-table enum, since [`skydex_query::FieldResolver`] already
//! accepts any table column or dotted JSON path by name.

use async_graphql::{Enum, InputObject};
use skydex_query::{SortDirection, SortField, SortSpec};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum OrderDirectionInput {
    Asc,
    Desc,
}

impl From<OrderDirectionInput> for SortDirection {
    fn from(direction: OrderDirectionInput) -> Self {
        match direction {
            OrderDirectionInput::Asc => SortDirection::Ascending,
            OrderDirectionInput::Desc => SortDirection::Descending,
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct OrderByInput {
    pub field: String,
    pub direction: OrderDirectionInput,
}

/// `None` when the caller supplied no sort at all or an empty list — the
/// resolver falls back to its own default in that case.
pub fn build_sort_spec(order_by: Option<Vec<OrderByInput>>) -> Option<SortSpec> {
    let fields = order_by?;
    if fields.is_empty() {
        return None;
    }
    Some(SortSpec::new(
        fields
            .into_iter()
            .map(|f| SortField {
                name: f.field,
                direction: f.direction.into(),
            })
            .collect(),
    ))
}
