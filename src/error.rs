use thiserror::Error;

use crate::ABSOLUTE_MAX_SIZE;

/// Result type for pool operations.
pub type Result<T, E = PoolError> = std::result::Result<T, E>;

/// Errors returned by [`Pool`](crate::Pool) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PoolError {
    /// The configured maximum size is outside `1..=ABSOLUTE_MAX_SIZE`.
    #[error(
        "invalid pool configuration: max size {max_size} must be between 1 and {limit}",
        limit = ABSOLUTE_MAX_SIZE
    )]
    InvalidConfiguration {
        /// The rejected maximum size.
        max_size: usize,
    },

    /// The pool has been disposed and no longer accepts or hands out items.
    #[error("pool has been disposed")]
    Disposed,

    /// The pool is empty and neither a factory nor a generator can supply a new item.
    #[error("pool is empty and no factory is available")]
    NoFactoryAvailable,

    /// No tokio runtime was configured or current when the pool was built.
    #[error("no tokio runtime available to drive deferred trims")]
    NoRuntime,
}
