//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local backend.

use std::path::PathBuf;
use std::time::Duration;

use unicon_shared::constants::{
    DEFAULT_API_URL, DEFAULT_APP_ORIGIN, HEALTH_TIMEOUT_SECS, SILENT_PROBE_INTERVAL_SECS,
    STARTUP_PROBE_DELAY_SECS, STATIC_CACHE_VERSION,
};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the UNICON REST API.
    /// Env: `UNICON_API_URL`
    /// Default: `http://localhost:8080/api`
    pub api_base_url: String,

    /// Application origin, used for same-origin cache decisions and to
    /// resolve the shell asset URLs.
    /// Env: `UNICON_APP_ORIGIN`
    /// Default: `http://localhost:8080`
    pub app_origin: String,

    /// Directory holding the client database.
    /// Env: `UNICON_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Root directory for static cache generations.
    /// Env: `UNICON_CACHE_DIR`
    /// Default: `{data dir}/cache`.
    pub cache_dir: Option<PathBuf>,

    /// Static cache generation version.
    /// Env: `UNICON_CACHE_VERSION`
    /// Default: the built-in version string.
    pub cache_version: String,

    /// Delay before the initial silent connectivity probe.
    /// Env: `UNICON_STARTUP_PROBE_DELAY_SECS`
    /// Default: 2 s.
    pub startup_probe_delay: Duration,

    /// Interval between background silent probes.
    /// Env: `UNICON_PROBE_INTERVAL_SECS`
    /// Default: 30 s.
    pub probe_interval: Duration,

    /// Hard timeout for one health probe request.
    /// Env: `UNICON_HEALTH_TIMEOUT_SECS`
    /// Default: 3 s.
    pub probe_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            data_dir: None,
            cache_dir: None,
            cache_version: STATIC_CACHE_VERSION.to_string(),
            startup_probe_delay: Duration::from_secs(STARTUP_PROBE_DELAY_SECS),
            probe_interval: Duration::from_secs(SILENT_PROBE_INTERVAL_SECS),
            probe_timeout: Duration::from_secs(HEALTH_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("UNICON_API_URL") {
            config.api_base_url = url;
        }

        if let Ok(origin) = std::env::var("UNICON_APP_ORIGIN") {
            config.app_origin = origin;
        }

        if let Ok(dir) = std::env::var("UNICON_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(dir) = std::env::var("UNICON_CACHE_DIR") {
            config.cache_dir = Some(PathBuf::from(dir));
        }

        if let Ok(version) = std::env::var("UNICON_CACHE_VERSION") {
            config.cache_version = version;
        }

        if let Some(delay) = parse_secs("UNICON_STARTUP_PROBE_DELAY_SECS") {
            config.startup_probe_delay = delay;
        }

        if let Some(interval) = parse_secs("UNICON_PROBE_INTERVAL_SECS") {
            config.probe_interval = interval;
        }

        if let Some(timeout) = parse_secs("UNICON_HEALTH_TIMEOUT_SECS") {
            config.probe_timeout = timeout;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// Read a whole-seconds duration from an environment variable.
fn parse_secs(var: &str) -> Option<Duration> {
    let value = std::env::var(var).ok()?;
    match value.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!(var, value = %value, "Invalid duration, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.startup_probe_delay, Duration::from_secs(2));
        assert!(config.data_dir.is_none());
    }
}
