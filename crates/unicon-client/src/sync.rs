//! Reconciliation of queued actions after a reconnect.
//!
//! The replay pass is triggered by a connectivity transition to online,
//! never polled. Actions replay strictly in FIFO order, one at a time, so
//! the server observes them in the order the user produced them (a reply
//! must not land before its parent post).
//!
//! The batch stops at the first failure: the failed action and everything
//! behind it stay queued until the next online transition. There is no
//! backoff and no per-action retry cap; an action leaves the queue only by
//! replaying successfully or by explicit user removal.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use unicon_net::{ApiClient, MonitorNotification};
use unicon_store::Database;

use crate::events::{
    emit_event, ActionReplayedPayload, BannerPayload, ClientEvent, ConnectivityPayload,
};
use crate::queue::OfflineQueue;

/// Result of one replay pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    /// Actions removed from the queue because the server accepted them.
    pub replayed: usize,
    /// Actions still queued after the pass.
    pub remaining: usize,
}

/// Read the bearer token from the durable store.
///
/// Read at call time rather than cached, so a token refreshed by the login
/// flow is used by the very next request.
pub(crate) fn read_token(db: &Mutex<Database>) -> Option<String> {
    match db.lock() {
        Ok(db) => db.token().unwrap_or_else(|e| {
            debug!(error = %e, "Failed to read session token");
            None
        }),
        Err(e) => {
            warn!(error = %e, "Store lock poisoned, replaying without token");
            None
        }
    }
}

/// Replay the queue in FIFO order, pruning every accepted action.
pub async fn replay_pending(
    api: &ApiClient,
    db: &Arc<Mutex<Database>>,
    queue: &Arc<Mutex<OfflineQueue>>,
    events: &broadcast::Sender<ClientEvent>,
) -> ReplayReport {
    let pending: Vec<_> = match queue.lock() {
        Ok(queue) => queue.actions().to_vec(),
        Err(e) => {
            warn!(error = %e, "Queue lock poisoned, skipping replay");
            Vec::new()
        }
    };

    if pending.is_empty() {
        return ReplayReport {
            replayed: 0,
            remaining: 0,
        };
    }

    info!(pending = pending.len(), "Replaying offline actions");

    let mut replayed = 0usize;
    for action in &pending {
        let token = read_token(db);
        match api.replay(action, token.as_deref()).await {
            Ok(()) => {
                if let Ok(mut queue) = queue.lock() {
                    queue.dequeue(&action.id);
                }
                emit_event(
                    events,
                    ClientEvent::ActionReplayed(ActionReplayedPayload {
                        id: action.id.clone(),
                    }),
                );
                replayed += 1;
            }
            Err(e) => {
                // Stop the batch here: replaying past a failure would let a
                // later action land before an earlier one.
                warn!(id = %action.id, error = %e, "Replay failed, stopping batch");
                break;
            }
        }
    }

    let remaining = queue.lock().map(|q| q.pending_count()).unwrap_or(0);
    info!(replayed, remaining, "Replay pass finished");

    ReplayReport {
        replayed,
        remaining,
    }
}

/// Consume monitor notifications: keep the shared online flag current,
/// forward UI events, and kick off a replay pass on every transition to
/// online. Ends when the monitor closes its notification channel.
pub(crate) fn spawn_replay_listener(
    api: ApiClient,
    db: Arc<Mutex<Database>>,
    queue: Arc<Mutex<OfflineQueue>>,
    events: broadcast::Sender<ClientEvent>,
    mut notifications: mpsc::Receiver<MonitorNotification>,
    online_tx: watch::Sender<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            match notification {
                MonitorNotification::StateChanged { online } => {
                    let _ = online_tx.send(online);
                    emit_event(
                        &events,
                        ClientEvent::ConnectivityChanged(ConnectivityPayload { online }),
                    );

                    if online {
                        replay_pending(&api, &db, &queue, &events).await;
                    }
                }
                MonitorNotification::Banner { visible } => {
                    emit_event(
                        &events,
                        ClientEvent::OfflineBanner(BannerPayload { visible }),
                    );
                }
            }
        }
        debug!("Monitor notification channel closed");
    })
}
