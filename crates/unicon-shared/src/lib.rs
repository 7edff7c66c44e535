//! # unicon-shared
//!
//! Domain types and constants shared across the UNICON client crates.
//!
//! Everything here derives `Serialize`/`Deserialize` with the field names the
//! durable store and the sync API expect, so values can be persisted and
//! replayed without a separate wire layer.

pub mod constants;
pub mod types;

pub use types::*;
