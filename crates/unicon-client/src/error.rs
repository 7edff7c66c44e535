use thiserror::Error;

/// Errors surfaced by the client runtime.
///
/// Only startup and explicit session operations return these. Submits,
/// replays, and cache traffic degrade internally (queue fallback, logged
/// persistence failures) rather than erroring out to the UI.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Store error: {0}")]
    Store(#[from] unicon_store::StoreError),

    #[error("Network error: {0}")]
    Net(#[from] unicon_net::NetError),

    #[error("Cache error: {0}")]
    Cache(#[from] unicon_cache::CacheError),

    #[error("Initialization error: {0}")]
    Init(String),
}
