use std::collections::TryReserveError;

/// Errors returned when building or resizing a map.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A table must always have at least one row.
    #[error("row count must be at least 1")]
    ZeroRows,
    /// The row array could not be allocated.
    #[error("failed to allocate rows: {0}")]
    Alloc(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, Error>;
