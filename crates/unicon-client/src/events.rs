//! Events broadcast to the UI layer.
//!
//! Payloads derive `Serialize` so a shell can forward them over IPC
//! unchanged. Emission never fails loudly: a missing subscriber is normal
//! while no UI is attached.

use serde::Serialize;
use tokio::sync::broadcast;

pub const EVENT_QUEUE_CHANGED: &str = "queue-changed";
pub const EVENT_CONNECTIVITY_CHANGED: &str = "connectivity-changed";
pub const EVENT_OFFLINE_BANNER: &str = "offline-banner";
pub const EVENT_ACTION_REPLAYED: &str = "action-replayed";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueueChangedPayload {
    pub pending: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectivityPayload {
    pub online: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BannerPayload {
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionReplayedPayload {
    pub id: String,
}

/// One event as delivered to in-process subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    QueueChanged(QueueChangedPayload),
    ConnectivityChanged(ConnectivityPayload),
    OfflineBanner(BannerPayload),
    ActionReplayed(ActionReplayedPayload),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::QueueChanged(_) => EVENT_QUEUE_CHANGED,
            Self::ConnectivityChanged(_) => EVENT_CONNECTIVITY_CHANGED,
            Self::OfflineBanner(_) => EVENT_OFFLINE_BANNER,
            Self::ActionReplayed(_) => EVENT_ACTION_REPLAYED,
        }
    }
}

pub fn emit_event(tx: &broadcast::Sender<ClientEvent>, event: ClientEvent) {
    tracing::debug!(event = event.name(), "emitting event");
    if tx.send(event).is_err() {
        tracing::debug!("no event subscribers");
    }
}
