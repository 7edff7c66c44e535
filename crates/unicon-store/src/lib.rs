//! # unicon-store
//!
//! Durable client-side storage for the UNICON application, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed helpers over a single key/value
//! table. The key names (`offlineActions`, `token`) are a compatibility
//! contract: a snapshot written by one build must stay readable by the next.

pub mod database;
pub mod kv;
pub mod migrations;
pub mod queue;
pub mod session;

mod error;

pub use database::Database;
pub use error::StoreError;
