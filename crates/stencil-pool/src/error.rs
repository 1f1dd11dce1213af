//! Error types for the pool crate.

use thiserror::Error;

/// Errors that can occur when building a pool collection.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The collection already holds its maximum number of pools.
    #[error("pool collection is full: at most {max} pools may be registered")]
    TooManyPools { max: usize },

    /// A pool was created with a page size that is not a power of two.
    #[error("page size must be a nonzero power of two, got {page_size}")]
    InvalidPageSize { page_size: usize },
}

/// Result type for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
