//! Error type for the query engine.

use thiserror::Error;

/// Errors the engine itself can produce.
///
/// `WhereBuilder` never fails — invalid operator values are the parser's
/// problem, dropped before they reach this crate. Everything that *can* go
/// wrong here is either the database talking back, or a cursor that
/// doesn't decode.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The cursor failed base64 decoding or had the wrong number of parts.
    /// [`crate::PageQuery`] downgrades this to "no cursor" internally;
    /// direct [`crate::CursorCodec`] callers see it.
    #[error("invalid cursor")]
    InvalidCursor,

    /// Propagated unchanged from the caller's [`crate::DbHandle`].
    #[error("database error: {0}")]
    Database(String),
}
