//! The client runtime.
//!
//! [`Client`] is the explicitly constructed service instance the UI shell
//! holds for the lifetime of the process: constructed once at app start,
//! torn down (tasks stopped, listeners dropped) by [`Client::shutdown`].
//! There are no module-level singletons.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use unicon_cache::{AssetCache, CachedAsset};
use unicon_net::{spawn_monitor, ApiClient, MonitorCommand, MonitorConfig};
use unicon_shared::constants::SHELL_ASSETS;
use unicon_shared::{ConnectivityState, LinkState, MessageDraft, PostDraft, QueuedAction};
use unicon_store::Database;

use crate::composer::{MessageComposer, PostComposer, SubmitOutcome};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::ClientEvent;
use crate::queue::OfflineQueue;
use crate::sync::spawn_replay_listener;

/// Handle to the running client core.
pub struct Client {
    db: Arc<Mutex<Database>>,
    queue: Arc<Mutex<OfflineQueue>>,
    posts: PostComposer,
    messages: MessageComposer,
    cache: AssetCache,
    monitor_tx: mpsc::Sender<MonitorCommand>,
    events_tx: broadcast::Sender<ClientEvent>,
    online_rx: watch::Receiver<bool>,
    listener: JoinHandle<()>,
}

impl Client {
    /// Construct and start the client core.
    pub async fn start(config: ClientConfig) -> Result<Self, ClientError> {
        // Durable store.
        let db = match &config.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(unicon_store::StoreError::Io)?;
                Database::open_at(&dir.join("unicon.db"))?
            }
            None => Database::new()?,
        };
        let db = Arc::new(Mutex::new(db));

        // Event stream for the UI shell.
        let (events_tx, _) = broadcast::channel(64);

        // Offline queue, seeded from the persisted snapshot.
        let mut queue = OfflineQueue::new(db.clone(), events_tx.clone());
        queue.load_from_store();
        let queue = Arc::new(Mutex::new(queue));

        // Shell-asset cache: install the current generation, then purge the
        // stale ones. Failures here are logged only; the app stays usable
        // online even when offline caching is partial.
        let cache_root = resolve_cache_root(&config)?;
        let cache = AssetCache::new(
            cache_root,
            &config.cache_version,
            &config.app_origin,
            SHELL_ASSETS.iter().map(|s| s.to_string()).collect(),
        )
        .await?;
        if let Err(e) = cache.install().await {
            warn!(error = %e, "Asset cache install failed");
        }
        if let Err(e) = cache.activate().await {
            warn!(error = %e, "Asset cache activation failed");
        }

        // Connectivity monitor.
        let monitor_config = MonitorConfig {
            health_url: unicon_net::health::health_url(&config.api_base_url),
            probe_timeout: config.probe_timeout,
            startup_delay: config.startup_probe_delay,
            probe_interval: config.probe_interval,
        };
        let (monitor_tx, monitor_rx) =
            spawn_monitor(monitor_config).map_err(|e| ClientError::Init(e.to_string()))?;

        // Replay listener keeps the shared online flag current and drains the
        // queue on every transition to online.
        let api = ApiClient::new(config.api_base_url.clone());
        let (online_tx, online_rx) = watch::channel(true);
        let listener = spawn_replay_listener(
            api.clone(),
            db.clone(),
            queue.clone(),
            events_tx.clone(),
            monitor_rx,
            online_tx,
        );

        let posts = PostComposer::new(api.clone(), db.clone(), queue.clone(), online_rx.clone());
        let messages =
            MessageComposer::new(api, db.clone(), queue.clone(), online_rx.clone());

        info!(api = %config.api_base_url, "UNICON client core started");

        Ok(Self {
            db,
            queue,
            posts,
            messages,
            cache,
            monitor_tx,
            events_tx,
            online_rx,
            listener,
        })
    }

    // -- Composers ----------------------------------------------------------

    /// Submit a forum post; falls back to the offline queue when needed.
    pub async fn submit_post(&self, draft: PostDraft, user_id: Option<&str>) -> SubmitOutcome {
        self.posts.submit(draft, user_id).await
    }

    /// Send a direct message; falls back to the offline queue when needed.
    pub async fn send_message(&self, draft: MessageDraft, user_id: Option<&str>) -> SubmitOutcome {
        self.messages.submit(draft, user_id).await
    }

    pub fn post_composer(&self) -> &PostComposer {
        &self.posts
    }

    pub fn message_composer(&self) -> &MessageComposer {
        &self.messages
    }

    // -- Queue --------------------------------------------------------------

    /// FIFO snapshot of the pending offline actions.
    pub fn pending_actions(&self) -> Vec<QueuedAction> {
        self.queue
            .lock()
            .map(|q| q.actions().to_vec())
            .unwrap_or_default()
    }

    /// Number of pending offline actions.
    pub fn pending_count(&self) -> usize {
        self.queue.lock().map(|q| q.pending_count()).unwrap_or(0)
    }

    /// Explicit user removal of a queued action.
    pub fn remove_action(&self, id: &str) -> bool {
        self.queue
            .lock()
            .map(|mut q| q.dequeue(id))
            .unwrap_or(false)
    }

    // -- Connectivity -------------------------------------------------------

    /// Current belief, without forcing a probe.
    pub fn is_online(&self) -> bool {
        *self.online_rx.borrow()
    }

    /// Feed a coarse link event from the platform shell.
    pub async fn report_link_state(&self, link: LinkState) {
        let command = match link {
            LinkState::Up => MonitorCommand::LinkUp,
            LinkState::Down => MonitorCommand::LinkDown,
        };
        self.send_monitor(command).await;
    }

    /// User-triggered connectivity retry (visible mode).
    pub async fn retry_connectivity(&self) {
        self.send_monitor(MonitorCommand::Retry).await;
    }

    /// Dismiss the offline banner for the current offline episode.
    pub async fn dismiss_offline_banner(&self) {
        self.send_monitor(MonitorCommand::DismissBanner).await;
    }

    /// Full connectivity snapshot from the monitor.
    pub async fn connectivity_state(&self) -> ConnectivityState {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send_monitor(MonitorCommand::GetState(reply_tx)).await;

        match reply_rx.await {
            Ok(state) => state,
            Err(_) => {
                warn!("Monitor unavailable, reporting last known state");
                ConnectivityState {
                    is_online: self.is_online(),
                    last_checked_at: None,
                }
            }
        }
    }

    // -- Session ------------------------------------------------------------

    /// Store the bearer token used by replays and direct submits.
    pub fn set_session_token(&self, token: &str) -> Result<(), ClientError> {
        let db = self
            .db
            .lock()
            .map_err(|e| ClientError::Init(format!("store lock poisoned: {e}")))?;
        db.set_token(token)?;
        Ok(())
    }

    /// Drop the stored bearer token.
    pub fn clear_session_token(&self) -> Result<(), ClientError> {
        let db = self
            .db
            .lock()
            .map_err(|e| ClientError::Init(format!("store lock poisoned: {e}")))?;
        db.clear_token()?;
        Ok(())
    }

    // -- Assets & events ----------------------------------------------------

    /// Serve a static asset through the versioned cache (cache-first).
    pub async fn fetch_asset(&self, method: &str, url: &str) -> Option<CachedAsset> {
        self.cache.fetch(method, url).await
    }

    /// Subscribe to the client event stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events_tx.subscribe()
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Stop the monitor and background tasks.
    pub async fn shutdown(self) {
        if self
            .monitor_tx
            .send(MonitorCommand::Shutdown)
            .await
            .is_err()
        {
            warn!("Monitor already stopped");
        }
        // The monitor closes its notification channel on shutdown, which
        // ends the replay listener.
        let _ = self.listener.await;
        info!("UNICON client core stopped");
    }

    async fn send_monitor(&self, command: MonitorCommand) {
        if self.monitor_tx.send(command).await.is_err() {
            warn!("Monitor command channel closed");
        }
    }
}

fn resolve_cache_root(config: &ClientConfig) -> Result<PathBuf, ClientError> {
    if let Some(dir) = &config.cache_dir {
        return Ok(dir.clone());
    }
    if let Some(dir) = &config.data_dir {
        return Ok(dir.join("cache"));
    }
    let project_dirs = ProjectDirs::from("edu", "unicon", "unicon")
        .ok_or(unicon_store::StoreError::NoDataDir)?;
    Ok(project_dirs.cache_dir().to_path_buf())
}
