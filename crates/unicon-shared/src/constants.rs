/// Application name
pub const APP_NAME: &str = "UNICON";

/// Hard timeout for a single health probe request, in seconds
pub const HEALTH_TIMEOUT_SECS: u64 = 3;

/// Delay before the first silent probe after startup, in seconds
pub const STARTUP_PROBE_DELAY_SECS: u64 = 2;

/// Interval between background silent probes, in seconds
pub const SILENT_PROBE_INTERVAL_SECS: u64 = 30;

/// Durable-store key holding the queued-action snapshot (JSON array)
pub const KEY_OFFLINE_ACTIONS: &str = "offlineActions";

/// Durable-store key holding the session bearer token
pub const KEY_SESSION_TOKEN: &str = "token";

/// Static cache name prefix; the generation version string is appended
pub const STATIC_CACHE_PREFIX: &str = "unicon-static-";

/// Current static cache generation
pub const STATIC_CACHE_VERSION: &str = "v2";

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default application origin, used for same-origin cache decisions
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:8080";

/// Shell assets fetched into the static cache at install time.
///
/// `/offline.html` is cached so it survives a cold start, but it is never
/// substituted for a failed request (see `unicon-cache`).
pub const SHELL_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/static/js/main.js",
    "/static/css/main.css",
    "/manifest.json",
    "/offline.html",
];
