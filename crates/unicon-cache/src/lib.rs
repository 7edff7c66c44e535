//! # unicon-cache
//!
//! Versioned on-disk cache of the application shell and static assets, so the
//! shell still loads with no network. The lifecycle mirrors a service
//! worker's: `install` populates a named generation, `fetch` serves
//! cache-first, `activate` purges every stale generation.

pub mod cache;

mod error;

pub use cache::{AssetCache, CachedAsset};
pub use error::CacheError;
