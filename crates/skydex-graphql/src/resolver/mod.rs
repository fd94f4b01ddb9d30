mod query;

pub use query::QueryRoot;
