use thiserror::Error;

/// Errors returned by cache lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The requested key is not present in the cache.
    #[error("no such element in the cache")]
    NotFound,
}

/// Result alias used by the cache read path.
pub type Result<T> = std::result::Result<T, CacheError>;
