//! Offline-capable composers.
//!
//! A composer lets the user write a post or message without caring about the
//! current connectivity state. Online, it attempts the live submit and falls
//! back to the offline queue on any failure; offline, it queues immediately.
//! Either way the content is never lost and no hard error reaches the caller.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{info, warn};

use unicon_net::ApiClient;
use unicon_shared::{ActionKind, MessageDraft, PostDraft, QueuedAction};
use unicon_store::Database;

use crate::queue::OfflineQueue;
use crate::sync::read_token;

/// What happened to a submitted draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Delivered to the live endpoint.
    Sent,
    /// Captured in the offline queue for later replay.
    Queued,
}

/// Composer for forum posts.
#[derive(Clone)]
pub struct PostComposer {
    api: ApiClient,
    db: Arc<Mutex<Database>>,
    queue: Arc<Mutex<OfflineQueue>>,
    online: watch::Receiver<bool>,
}

impl PostComposer {
    pub fn new(
        api: ApiClient,
        db: Arc<Mutex<Database>>,
        queue: Arc<Mutex<OfflineQueue>>,
        online: watch::Receiver<bool>,
    ) -> Self {
        Self {
            api,
            db,
            queue,
            online,
        }
    }

    /// Submit a post, falling back to the queue when it cannot be delivered.
    pub async fn submit(&self, draft: PostDraft, user_id: Option<&str>) -> SubmitOutcome {
        if *self.online.borrow() {
            let token = read_token(&self.db);
            match self.api.create_post(&draft, token.as_deref()).await {
                Ok(()) => {
                    info!("Post submitted");
                    return SubmitOutcome::Sent;
                }
                Err(e) => {
                    warn!(error = %e, "Direct post submit failed, queueing");
                }
            }
        }

        enqueue_draft(&self.queue, ActionKind::Post, draft.into_payload(), user_id)
    }

    /// Submit-button copy for the current connectivity state.
    pub fn action_label(&self) -> &'static str {
        if *self.online.borrow() {
            "Post"
        } else {
            "Save draft"
        }
    }
}

/// Composer for direct messages.
#[derive(Clone)]
pub struct MessageComposer {
    api: ApiClient,
    db: Arc<Mutex<Database>>,
    queue: Arc<Mutex<OfflineQueue>>,
    online: watch::Receiver<bool>,
}

impl MessageComposer {
    pub fn new(
        api: ApiClient,
        db: Arc<Mutex<Database>>,
        queue: Arc<Mutex<OfflineQueue>>,
        online: watch::Receiver<bool>,
    ) -> Self {
        Self {
            api,
            db,
            queue,
            online,
        }
    }

    /// Send a message, falling back to the queue when it cannot be delivered.
    pub async fn submit(&self, draft: MessageDraft, user_id: Option<&str>) -> SubmitOutcome {
        if *self.online.borrow() {
            let token = read_token(&self.db);
            match self.api.send_message(&draft, token.as_deref()).await {
                Ok(()) => {
                    info!(recipient = %draft.recipient_id, "Message sent");
                    return SubmitOutcome::Sent;
                }
                Err(e) => {
                    warn!(error = %e, "Direct message send failed, queueing");
                }
            }
        }

        enqueue_draft(
            &self.queue,
            ActionKind::Message,
            draft.into_payload(),
            user_id,
        )
    }

    /// Send-button copy for the current connectivity state.
    pub fn action_label(&self) -> &'static str {
        if *self.online.borrow() {
            "Send"
        } else {
            "Save"
        }
    }
}

fn enqueue_draft(
    queue: &Mutex<OfflineQueue>,
    kind: ActionKind,
    payload: serde_json::Value,
    user_id: Option<&str>,
) -> SubmitOutcome {
    let mut action = QueuedAction::new(kind, payload);
    if let Some(user) = user_id {
        action = action.with_user(user);
    }

    match queue.lock() {
        Ok(mut queue) => {
            queue.enqueue(action);
        }
        Err(e) => {
            // Poisoned lock: nothing sane left to do but log; the runtime is
            // already in a failed state.
            tracing::error!(error = %e, "Queue lock poisoned, action dropped");
        }
    }

    SubmitOutcome::Queued
}
