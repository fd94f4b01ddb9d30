//! Aggregation input, converting GraphQL group-by arguments into
//! [`skydex_query::GroupByField`]/[`skydex_query::CountOrder`].

use async_graphql::{Enum, InputObject};
use skydex_query::{CountOrder, GroupByField, Interval};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum IntervalInput {
    Hour,
    Day,
    Week,
    Month,
}

impl From<IntervalInput> for Interval {
    fn from(interval: IntervalInput) -> Self {
        match interval {
            IntervalInput::Hour => Interval::Hour,
            IntervalInput::Day => Interval::Day,
            IntervalInput::Week => Interval::Week,
            IntervalInput::Month => Interval::Month,
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct GroupByFieldInput {
    pub field: String,
    pub date_trunc: Option<IntervalInput>,
}

impl From<GroupByFieldInput> for GroupByField {
    fn from(field: GroupByFieldInput) -> Self {
        match field.date_trunc {
            Some(interval) => GroupByField::DateTrunc(field.field, interval.into()),
            None => GroupByField::Simple(field.field),
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum CountOrderInput {
    Asc,
    Desc,
}

impl From<CountOrderInput> for CountOrder {
    fn from(order: CountOrderInput) -> Self {
        match order {
            CountOrderInput::Asc => CountOrder::Ascending,
            CountOrderInput::Desc => CountOrder::Descending,
        }
    }
}
