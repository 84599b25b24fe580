//! Error types for isongify-backend

use thiserror::Error;

/// Main error type for the backend
#[derive(Error, Debug)]
pub enum Error {
    /// Entry rejected at ingestion; the collection is left unchanged
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Top-K requested before any range query
    #[error("No range established: query_range() must be called first")]
    NoRangeEstablished,

    /// Catalogue could not be found, read or decoded
    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    /// isongify-common error (configuration, I/O)
    #[error("Common error: {0}")]
    Common(#[from] isongify_common::Error),
}

/// Convenience Result type using backend Error
pub type Result<T> = std::result::Result<T, Error>;
