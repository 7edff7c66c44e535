//! Connectivity monitor with a tokio mpsc command/notification pattern.
//!
//! The monitor runs in a dedicated tokio task. External code communicates
//! with it through typed command and notification channels, so link events,
//! manual retries, and banner dismissals all funnel through one sequential
//! event loop.
//!
//! Two noisy inputs feed the monitor: the coarse link signal (the OS/webview
//! `online`/`offline` events) and the active health probe. Neither is trusted
//! alone:
//!
//! - the client is **offline** only when the link is down AND the probe
//!   failed;
//! - a single positive signal (link up OR probe success) means **online**;
//! - a failed probe while the link is up is a backend problem, not a
//!   connectivity problem, and never flips the state.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use unicon_shared::constants::{
    HEALTH_TIMEOUT_SECS, SILENT_PROBE_INTERVAL_SECS, STARTUP_PROBE_DELAY_SECS,
};
use unicon_shared::{ConnectivityState, LinkState, ProbeOutcome};

use crate::health;

// ---------------------------------------------------------------------------
// Command / notification types
// ---------------------------------------------------------------------------

/// Commands sent *into* the monitor task.
#[derive(Debug)]
pub enum MonitorCommand {
    /// The coarse link signal reported the network came up.
    LinkUp,
    /// The coarse link signal reported the network went down.
    LinkDown,
    /// A user-triggered retry. Always runs in visible mode.
    Retry,
    /// The user dismissed the offline banner for the current episode.
    DismissBanner,
    /// Request a snapshot of the current connectivity state.
    GetState(oneshot::Sender<ConnectivityState>),
    /// Gracefully shut down the monitor.
    Shutdown,
}

/// Notifications sent *from* the monitor task to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorNotification {
    /// The online/offline belief changed.
    StateChanged { online: bool },
    /// The offline banner should be shown or hidden.
    Banner { visible: bool },
}

/// Configuration for spawning the monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Absolute URL of the health endpoint.
    pub health_url: String,
    /// Hard timeout for one probe request.
    pub probe_timeout: Duration,
    /// Delay before the initial silent probe, so a slow app boot does not
    /// flash a false offline state.
    pub startup_delay: Duration,
    /// Interval between background silent probes.
    pub probe_interval: Duration,
}

impl MonitorConfig {
    /// Defaults derived from an API base URL.
    pub fn for_api(base_url: &str) -> Self {
        Self {
            health_url: health::health_url(base_url),
            probe_timeout: Duration::from_secs(HEALTH_TIMEOUT_SECS),
            startup_delay: Duration::from_secs(STARTUP_PROBE_DELAY_SECS),
            probe_interval: Duration::from_secs(SILENT_PROBE_INTERVAL_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Monitor task
// ---------------------------------------------------------------------------

/// Spawn the connectivity monitor in a background tokio task.
///
/// Returns channels for sending commands and receiving notifications.
/// Dropping the command sender (or sending [`MonitorCommand::Shutdown`])
/// terminates the task.
pub fn spawn_monitor(
    config: MonitorConfig,
) -> anyhow::Result<(
    mpsc::Sender<MonitorCommand>,
    mpsc::Receiver<MonitorNotification>,
)> {
    let http = reqwest::Client::builder().build()?;
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (notify_tx, notify_rx) = mpsc::channel(32);

    let monitor = Monitor {
        config,
        http,
        link: LinkState::Up,
        state: ConnectivityState::default(),
        banner_visible: false,
        banner_dismissed: false,
        notify_tx,
    };

    tokio::spawn(monitor.run(cmd_rx));

    Ok((cmd_tx, notify_rx))
}

struct Monitor {
    config: MonitorConfig,
    http: reqwest::Client,
    /// Last value of the coarse link signal.
    link: LinkState,
    /// Current derived belief.
    state: ConnectivityState,
    /// Whether the offline banner is currently shown.
    banner_visible: bool,
    /// Whether the user dismissed the banner for the current offline episode.
    banner_dismissed: bool,
    notify_tx: mpsc::Sender<MonitorNotification>,
}

impl Monitor {
    async fn run(mut self, mut cmd_rx: mpsc::Receiver<MonitorCommand>) {
        info!(health_url = %self.config.health_url, "Connectivity monitor started");

        let startup = tokio::time::sleep(self.config.startup_delay);
        tokio::pin!(startup);
        let mut started = false;

        let first_tick = tokio::time::Instant::now() + self.config.probe_interval;
        let mut ticker = tokio::time::interval_at(first_tick, self.config.probe_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut startup, if !started => {
                    started = true;
                    // Initial check is silent: correct the default belief
                    // without surfacing a banner during boot.
                    self.check(false).await;
                }
                _ = ticker.tick() => {
                    self.check(false).await;
                }
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(MonitorCommand::LinkUp) => {
                            self.link = LinkState::Up;
                            // A genuine link-up transition ends the offline
                            // episode, so the banner dismissal resets with it.
                            self.banner_dismissed = false;
                            self.check(true).await;
                        }
                        Some(MonitorCommand::LinkDown) => {
                            self.link = LinkState::Down;
                            self.check(true).await;
                        }
                        Some(MonitorCommand::Retry) => {
                            self.check(true).await;
                        }
                        Some(MonitorCommand::DismissBanner) => {
                            self.banner_dismissed = true;
                            self.set_banner(false).await;
                        }
                        Some(MonitorCommand::GetState(reply)) => {
                            let _ = reply.send(self.state.clone());
                        }
                        Some(MonitorCommand::Shutdown) | None => {
                            info!("Connectivity monitor shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Probe the health endpoint, then re-derive the state.
    async fn check(&mut self, visible: bool) {
        let outcome = health::probe(&self.http, &self.config.health_url, self.config.probe_timeout)
            .await;
        self.evaluate(outcome, visible).await;
    }

    /// Re-derive the online belief from the link signal and a probe outcome.
    async fn evaluate(&mut self, probe: ProbeOutcome, visible: bool) {
        self.state.last_checked_at = Some(Utc::now());

        let online = self.link.is_up() || probe.is_ok();

        if online != self.state.is_online {
            self.state.is_online = online;
            info!(online, link = ?self.link, probe = ?probe, "connectivity state changed");
            self.notify(MonitorNotification::StateChanged { online })
                .await;
        }

        // Silent checks update state only; the banner is left untouched.
        if visible {
            if online {
                self.set_banner(false).await;
            } else if !self.banner_dismissed {
                self.set_banner(true).await;
            }
        }
    }

    async fn set_banner(&mut self, visible: bool) {
        if self.banner_visible != visible {
            self.banner_visible = visible;
            self.notify(MonitorNotification::Banner { visible }).await;
        }
    }

    async fn notify(&self, notification: MonitorNotification) {
        if self.notify_tx.send(notification).await.is_err() {
            debug!("notification receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> MonitorConfig {
        MonitorConfig {
            health_url: format!("{}/api/health", server.uri()),
            probe_timeout: Duration::from_millis(500),
            // Keep the background timers out of the way unless a test
            // explicitly exercises them.
            startup_delay: Duration::from_secs(3600),
            probe_interval: Duration::from_secs(3600),
        }
    }

    async fn mount_health(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    async fn recv(
        rx: &mut mpsc::Receiver<MonitorNotification>,
    ) -> Option<MonitorNotification> {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .ok()
            .flatten()
    }

    async fn get_state(tx: &mpsc::Sender<MonitorCommand>) -> ConnectivityState {
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(MonitorCommand::GetState(reply_tx)).await.unwrap();
        reply_rx.await.unwrap()
    }

    #[tokio::test]
    async fn link_down_and_probe_failure_means_offline() {
        let server = MockServer::start().await;
        mount_health(&server, 503).await;

        let (tx, mut rx) = spawn_monitor(test_config(&server)).unwrap();
        tx.send(MonitorCommand::LinkDown).await.unwrap();

        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::StateChanged { online: false })
        );
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::Banner { visible: true })
        );
        assert!(!get_state(&tx).await.is_online);
    }

    #[tokio::test]
    async fn probe_failure_with_link_up_stays_online() {
        let server = MockServer::start().await;
        mount_health(&server, 503).await;

        let (tx, mut rx) = spawn_monitor(test_config(&server)).unwrap();
        tx.send(MonitorCommand::Retry).await.unwrap();

        let state = get_state(&tx).await;
        assert!(state.is_online);
        assert!(state.last_checked_at.is_some());

        // No banner, no state change: backend errors are not connectivity.
        tx.send(MonitorCommand::Shutdown).await.unwrap();
        assert_eq!(recv(&mut rx).await, None);
    }

    #[tokio::test]
    async fn probe_success_with_link_down_stays_online() {
        let server = MockServer::start().await;
        mount_health(&server, 200).await;

        let (tx, mut rx) = spawn_monitor(test_config(&server)).unwrap();
        tx.send(MonitorCommand::LinkDown).await.unwrap();

        let state = get_state(&tx).await;
        assert!(state.is_online);

        tx.send(MonitorCommand::Shutdown).await.unwrap();
        assert_eq!(recv(&mut rx).await, None);
    }

    #[tokio::test]
    async fn retry_clears_offline_once_probe_recovers() {
        let server = MockServer::start().await;
        mount_health(&server, 503).await;

        let (tx, mut rx) = spawn_monitor(test_config(&server)).unwrap();
        tx.send(MonitorCommand::LinkDown).await.unwrap();
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::StateChanged { online: false })
        );
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::Banner { visible: true })
        );

        // Backend comes back while the link signal still says down.
        server.reset().await;
        mount_health(&server, 200).await;

        tx.send(MonitorCommand::Retry).await.unwrap();
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::StateChanged { online: true })
        );
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::Banner { visible: false })
        );
    }

    #[tokio::test]
    async fn dismissal_is_scoped_to_one_offline_episode() {
        let server = MockServer::start().await;
        mount_health(&server, 503).await;

        let (tx, mut rx) = spawn_monitor(test_config(&server)).unwrap();

        // First episode: offline, banner shown, user dismisses it.
        tx.send(MonitorCommand::LinkDown).await.unwrap();
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::StateChanged { online: false })
        );
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::Banner { visible: true })
        );
        tx.send(MonitorCommand::DismissBanner).await.unwrap();
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::Banner { visible: false })
        );

        // While dismissed, further visible checks stay quiet.
        tx.send(MonitorCommand::Retry).await.unwrap();

        // Link comes back: online again, dismissal reset with the episode.
        tx.send(MonitorCommand::LinkUp).await.unwrap();
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::StateChanged { online: true })
        );

        // Second episode: the banner shows again despite the old dismissal.
        tx.send(MonitorCommand::LinkDown).await.unwrap();
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::StateChanged { online: false })
        );
        assert_eq!(
            recv(&mut rx).await,
            Some(MonitorNotification::Banner { visible: true })
        );
    }

    #[tokio::test]
    async fn startup_probe_is_silent() {
        let server = MockServer::start().await;
        mount_health(&server, 503).await;

        let mut config = test_config(&server);
        config.startup_delay = Duration::from_millis(10);

        let (tx, mut rx) = spawn_monitor(config).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        // Probe ran (state timestamp set) but belief stayed online and no
        // banner appeared.
        let state = get_state(&tx).await;
        assert!(state.is_online);
        assert!(state.last_checked_at.is_some());

        tx.send(MonitorCommand::Shutdown).await.unwrap();
        assert_eq!(recv(&mut rx).await, None);
    }
}
