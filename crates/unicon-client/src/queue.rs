//! The durable action queue manager.
//!
//! Holds the in-memory FIFO of actions that could not be completed live and
//! mirrors it to the durable store on every mutation. The in-memory list is
//! authoritative for the running session: a failed store write is logged and
//! the session continues with its state intact.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use unicon_shared::{epoch_millis_id, QueuedAction};
use unicon_store::Database;

use crate::events::{emit_event, ClientEvent, QueueChangedPayload};

/// Ordered queue of pending offline actions, mirrored to the durable store.
pub struct OfflineQueue {
    actions: Vec<QueuedAction>,
    db: Arc<Mutex<Database>>,
    events: broadcast::Sender<ClientEvent>,
}

impl OfflineQueue {
    pub fn new(db: Arc<Mutex<Database>>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            actions: Vec::new(),
            db,
            events,
        }
    }

    /// Replace the in-memory list with the persisted snapshot.
    ///
    /// Called once at startup. A read failure degrades to an empty queue.
    pub fn load_from_store(&mut self) {
        self.actions = match self.db.lock() {
            Ok(db) => db.load_actions().unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load offline queue, starting empty");
                Vec::new()
            }),
            Err(e) => {
                warn!(error = %e, "Store lock poisoned, starting empty");
                Vec::new()
            }
        };
        debug!(pending = self.actions.len(), "Offline queue loaded");
        self.emit_changed();
    }

    /// Append an action, assigning id and timestamp when absent, and persist
    /// the full updated list. Returns the action's id.
    pub fn enqueue(&mut self, mut action: QueuedAction) -> String {
        if action.id.is_empty() {
            action.id = epoch_millis_id();
        }
        // Same-millisecond submissions would collide; the id invariant wins.
        while self.actions.iter().any(|a| a.id == action.id) {
            action.id = match action.id.parse::<i64>() {
                Ok(n) => (n + 1).to_string(),
                Err(_) => format!("{}0", action.id),
            };
        }

        let id = action.id.clone();
        debug!(id = %id, kind = %action.kind, "Queued offline action");
        self.actions.push(action);
        self.persist();
        self.emit_changed();
        id
    }

    /// Remove the action with the given id from memory and store.
    ///
    /// A no-op when the id is unknown, so calling it twice is safe. Returns
    /// whether an action was removed.
    pub fn dequeue(&mut self, id: &str) -> bool {
        let before = self.actions.len();
        self.actions.retain(|a| a.id != id);
        if self.actions.len() == before {
            return false;
        }

        debug!(id, "Removed offline action");
        self.persist();
        self.emit_changed();
        true
    }

    /// FIFO snapshot of the pending actions.
    pub fn actions(&self) -> &[QueuedAction] {
        &self.actions
    }

    /// Number of pending actions, for queue-length indicators.
    pub fn pending_count(&self) -> usize {
        self.actions.len()
    }

    fn persist(&self) {
        // The durable snapshot is best-effort: the in-memory list stays
        // authoritative for this session when the write fails.
        match self.db.lock() {
            Ok(db) => {
                if let Err(e) = db.save_actions(&self.actions) {
                    warn!(error = %e, "Failed to persist offline queue");
                }
            }
            Err(e) => warn!(error = %e, "Store lock poisoned, queue not persisted"),
        }
    }

    fn emit_changed(&self) {
        emit_event(
            &self.events,
            ClientEvent::QueueChanged(QueueChangedPayload {
                pending: self.actions.len(),
            }),
        );
    }
}
