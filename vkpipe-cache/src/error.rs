use thiserror::Error;

/// Errors from the persistent blob store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("could not determine or create the cache directory")]
    IoError(#[from] std::io::Error),
    #[error("cache database error")]
    SqliteError(#[from] rusqlite::Error),
    #[error("value could not be encoded for the cache")]
    EncodeError,
}
