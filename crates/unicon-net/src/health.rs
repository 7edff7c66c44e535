//! Active connectivity probe.
//!
//! A lightweight GET against the health endpoint, used solely to corroborate
//! the coarse link signal. The request bypasses intermediary caches and is
//! aborted after a hard timeout; only an exact HTTP 200 counts as a positive
//! signal.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use unicon_shared::ProbeOutcome;

/// Build the health endpoint URL from an API base URL.
pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url.trim_end_matches('/'))
}

/// Issue one health probe.
///
/// Any transport error, any non-200 status, or exceeding `timeout` yields
/// [`ProbeOutcome::Failed`]. The outcome says nothing on its own about being
/// offline; the monitor combines it with the link signal.
pub async fn probe(http: &reqwest::Client, url: &str, timeout: Duration) -> ProbeOutcome {
    let result = http
        .get(url)
        .header(reqwest::header::CACHE_CONTROL, "no-cache")
        .header(reqwest::header::PRAGMA, "no-cache")
        .timeout(timeout)
        .send()
        .await;

    match result {
        Ok(response) if response.status() == StatusCode::OK => ProbeOutcome::Ok,
        Ok(response) => {
            debug!(status = %response.status(), "health probe returned non-200");
            ProbeOutcome::Failed
        }
        Err(e) => {
            debug!(error = %e, "health probe failed");
            ProbeOutcome::Failed
        }
    }
}
