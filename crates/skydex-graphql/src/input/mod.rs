pub mod aggregate;
pub mod filter;
pub mod order;

pub use aggregate::{CountOrderInput, GroupByFieldInput, IntervalInput};
pub use filter::{BooleanFilterInput, IntFilterInput, JsonFieldFilterInput, RecordFilterInput, StringFilterInput};
pub use order::{build_sort_spec, OrderByInput, OrderDirectionInput};
