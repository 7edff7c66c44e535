//! # unicon-client
//!
//! Headless client runtime for the UNICON campus hub.
//!
//! The runtime wires the offline core together: the durable action queue,
//! the connectivity monitor, the reconciliation pass that replays queued
//! actions after a reconnect, the offline-capable composers, and the
//! versioned shell-asset cache. A UI shell drives it through [`Client`] and
//! subscribes to [`events::ClientEvent`] for everything it needs to render.

pub mod client;
pub mod composer;
pub mod config;
pub mod events;
pub mod queue;
pub mod sync;

mod error;

pub use client::Client;
pub use composer::{MessageComposer, PostComposer, SubmitOutcome};
pub use config::ClientConfig;
pub use error::ClientError;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise tracing for the client process (respects `RUST_LOG`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("unicon_client=debug,unicon_net=debug,unicon_store=info,unicon_cache=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
