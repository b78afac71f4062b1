use relq_core::error::{BuildError, DecodeError};
use thiserror::Error;

/// Everything that can go wrong between building a statement and consuming
/// its rows.
#[derive(Debug, Error)]
pub enum Error {
    /// A malformed tree; raised before any SQL is sent
    #[error("construction error: {0}")]
    Build(#[from] BuildError),

    /// A row failed to decode; the stream stops at the first such error
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The driver rejected a connection or statement
    #[error("driver error: {0}")]
    Driver(#[from] rusqlite::Error),

    /// No row where exactly one was expected
    #[error("no rows found")]
    NotFound,
}

/// Result type for relq operations.
pub type Result<T> = std::result::Result<T, Error>;
