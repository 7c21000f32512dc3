use thiserror::Error;

use crate::query::CacheId;

/// Errors raised when registering or looking up cached filters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FilterError {
    #[error("the filter is already registered as {0:?}")]
    AlreadyRegistered(CacheId),

    #[error("the filter is not registered")]
    NotRegistered,

    #[error("no cached filter with id {0:?}")]
    UnknownCache(CacheId),
}
