//! Error types shared across the skydex workspace.

use thiserror::Error;

/// Result type for skydex operations outside the query engine itself.
///
/// The query engine (`skydex-query`) defines its own, narrower
/// `QueryError` so it never has to depend on this crate's broader surface;
/// `Error::Query` is where that error lands once it bubbles up to the
/// GraphQL/server layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for skydex.
#[derive(Error, Debug)]
pub enum Error {
    /// Surfaced unchanged from the database driver.
    #[error("database error: {0}")]
    Database(String),

    /// A cursor failed to decode or had the wrong number of parts.
    ///
    /// `PageQuery` downgrades this to "treat the cursor as absent" and
    /// never returns it; direct `CursorCodec` callers see it.
    #[error("invalid cursor")]
    InvalidCursor,

    /// A constraint violation bubbling up from the database, kept distinct
    /// from a generic `Database` error so callers can map it to a 409-style
    /// response instead of an opaque internal error.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}
