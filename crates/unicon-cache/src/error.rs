use thiserror::Error;

/// Errors produced by the asset cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Filesystem error (creating the generation directory, purging, ...).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry metadata could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
