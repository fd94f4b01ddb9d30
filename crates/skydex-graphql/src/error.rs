//! GraphQL-facing error type.

use skydex_query::QueryError;
use thiserror::Error;

/// Errors this crate can surface, trimmed of everything the teacher's
/// dynamic-schema generator needed (schema generation, type mapping,
/// authentication) since none of those concerns exist here.
#[derive(Error, Debug)]
pub enum GraphQLError {
    #[error("invalid cursor")]
    InvalidCursor,

    #[error("database error: {0}")]
    Database(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl From<QueryError> for GraphQLError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidCursor => Self::InvalidCursor,
            QueryError::Database(msg) => Self::Database(msg),
        }
    }
}

impl From<GraphQLError> for async_graphql::Error {
    fn from(err: GraphQLError) -> Self {
        async_graphql::Error::new(err.to_string())
    }
}
