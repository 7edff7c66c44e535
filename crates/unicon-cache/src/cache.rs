//! The versioned shell-asset cache.
//!
//! One cache generation is one directory under the cache root, named
//! `unicon-static-{version}`. Each entry is a pair of files keyed by the
//! BLAKE3 hash of the request URL: `{key}.bin` holds the body, `{key}.json`
//! the metadata. Bumping the version string forces a full invalidation on the
//! next [`AssetCache::activate`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use unicon_shared::constants::STATIC_CACHE_PREFIX;

use crate::error::Result;

/// Metadata stored next to each cached body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryMeta {
    url: String,
    status: u16,
    content_type: Option<String>,
    stored_at: DateTime<Utc>,
}

/// A response served by [`AssetCache::fetch`], from cache or network.
#[derive(Debug, Clone)]
pub struct CachedAsset {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Whether the entry came from the cache rather than the network.
    pub from_cache: bool,
}

/// Versioned cache of shell assets.
#[derive(Debug, Clone)]
pub struct AssetCache {
    root: PathBuf,
    name: String,
    origin: String,
    shell_assets: Vec<String>,
    http: reqwest::Client,
}

impl AssetCache {
    /// Create a cache handle rooted at `root` for the given generation.
    ///
    /// `origin` is the application origin; only responses from it are ever
    /// stored. `shell_assets` are origin-relative paths fetched at install
    /// time. The root directory is created if missing.
    pub async fn new(
        root: PathBuf,
        version: &str,
        origin: &str,
        shell_assets: Vec<String>,
    ) -> Result<Self> {
        fs::create_dir_all(&root).await?;

        let cache = Self {
            root,
            name: format!("{STATIC_CACHE_PREFIX}{version}"),
            origin: origin.trim_end_matches('/').to_string(),
            shell_assets,
            http: reqwest::Client::new(),
        };

        info!(name = %cache.name, root = %cache.root.display(), "Asset cache initialized");
        Ok(cache)
    }

    /// Name of the current cache generation, e.g. `unicon-static-v2`.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn generation_dir(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    /// Populate the current generation with the shell asset list.
    ///
    /// A single asset failing to download or persist is logged and skipped;
    /// installation itself only fails if the generation directory cannot be
    /// created, so the app stays usable online even when offline caching is
    /// partial.
    pub async fn install(&self) -> Result<()> {
        fs::create_dir_all(self.generation_dir()).await?;

        let mut cached = 0usize;
        for path in &self.shell_assets {
            let url = format!("{}{}", self.origin, path);
            match self.fetch_from_network(&url).await {
                Some(asset) if asset.status == 200 => {
                    if let Err(e) = self.store_entry(&asset).await {
                        warn!(url = %url, error = %e, "Failed to persist shell asset");
                    } else {
                        cached += 1;
                    }
                }
                Some(asset) => {
                    warn!(url = %url, status = asset.status, "Shell asset not cacheable");
                }
                None => {
                    warn!(url = %url, "Failed to fetch shell asset");
                }
            }
        }

        info!(
            name = %self.name,
            cached,
            total = self.shell_assets.len(),
            "Asset cache install complete"
        );
        Ok(())
    }

    /// Serve a request, cache-first.
    ///
    /// Only GET over http(s) is intercepted: anything else is forwarded to
    /// the network untouched. For intercepted requests the stored entry wins;
    /// on a miss the response is fetched, and a successful same-origin
    /// response is copied into the cache before being returned.
    ///
    /// `None` means the network failed and nothing was cached: the request
    /// fails naturally. No generic offline page is substituted, so real
    /// errors are not masked as connectivity issues.
    pub async fn fetch(&self, method: &str, url: &str) -> Option<CachedAsset> {
        let is_http = url.starts_with("http://") || url.starts_with("https://");
        if !method.eq_ignore_ascii_case("GET") || !is_http {
            return self.forward_uncached(method, url).await;
        }

        if let Some(entry) = self.load_entry(url).await {
            debug!(url, "cache hit");
            return Some(entry);
        }

        let asset = self.fetch_from_network(url).await?;

        if asset.status == 200 && self.is_same_origin(url) {
            if let Err(e) = self.store_entry(&asset).await {
                warn!(url, error = %e, "Failed to cache response");
            }
        }

        Some(asset)
    }

    /// Purge every generation other than the current one.
    ///
    /// Returns the number of directories deleted. Afterwards at most one
    /// cache generation exists.
    pub async fn activate(&self) -> Result<usize> {
        let mut deleted = 0usize;
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if name != self.name {
                info!(stale = %name, "Deleting stale cache generation");
                fs::remove_dir_all(entry.path()).await?;
                deleted += 1;
            }
        }

        info!(name = %self.name, deleted, "Asset cache activated");
        Ok(deleted)
    }

    fn is_same_origin(&self, url: &str) -> bool {
        url.trim_start_matches(&self.origin).starts_with('/')
            || url.trim_end_matches('/') == self.origin
    }

    fn entry_key(url: &str) -> String {
        hex::encode(blake3::hash(url.as_bytes()).as_bytes())
    }

    async fn store_entry(&self, asset: &CachedAsset) -> Result<()> {
        let key = Self::entry_key(&asset.url);
        let dir = self.generation_dir();
        fs::create_dir_all(&dir).await?;

        let meta = EntryMeta {
            url: asset.url.clone(),
            status: asset.status,
            content_type: asset.content_type.clone(),
            stored_at: Utc::now(),
        };

        fs::write(dir.join(format!("{key}.bin")), &asset.body).await?;
        fs::write(
            dir.join(format!("{key}.json")),
            serde_json::to_vec(&meta)?,
        )
        .await?;

        debug!(url = %asset.url, size = asset.body.len(), "Cached response");
        Ok(())
    }

    async fn load_entry(&self, url: &str) -> Option<CachedAsset> {
        let key = Self::entry_key(url);
        let dir = self.generation_dir();

        let meta_bytes = fs::read(dir.join(format!("{key}.json"))).await.ok()?;
        let body = fs::read(dir.join(format!("{key}.bin"))).await.ok()?;

        let meta: EntryMeta = match serde_json::from_slice(&meta_bytes) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(url, error = %e, "Discarding cache entry with corrupt metadata");
                return None;
            }
        };

        Some(CachedAsset {
            url: meta.url,
            status: meta.status,
            content_type: meta.content_type,
            body,
            from_cache: true,
        })
    }

    async fn fetch_from_network(&self, url: &str) -> Option<CachedAsset> {
        match self.http.get(url).send().await {
            Ok(response) => Some(Self::into_asset(url, response).await),
            Err(e) => {
                debug!(url, error = %e, "Network fetch failed");
                None
            }
        }
    }

    async fn forward_uncached(&self, method: &str, url: &str) -> Option<CachedAsset> {
        let method = match method.parse::<reqwest::Method>() {
            Ok(m) => m,
            Err(_) => {
                warn!(method, "Unsupported request method");
                return None;
            }
        };

        match self.http.request(method, url).send().await {
            Ok(response) => Some(Self::into_asset(url, response).await),
            Err(e) => {
                debug!(url, error = %e, "Uncached request failed");
                None
            }
        }
    }

    async fn into_asset(url: &str, response: reqwest::Response) -> CachedAsset {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await.unwrap_or_default().to_vec();

        CachedAsset {
            url: url.to_string(),
            status,
            content_type,
            body,
            from_cache: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_cache(server: &MockServer, version: &str) -> (AssetCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::new(
            dir.path().to_path_buf(),
            version,
            &server.uri(),
            vec!["/".into(), "/static/js/main.js".into()],
        )
        .await
        .unwrap();
        (cache, dir)
    }

    async fn mount_get(server: &MockServer, p: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn install_caches_reachable_shell_assets() {
        let server = MockServer::start().await;
        mount_get(&server, "/", 200, "<html>shell</html>").await;
        // `/static/js/main.js` is not mounted: 404, logged and skipped.

        let (cache, _dir) = test_cache(&server, "v1").await;
        cache.install().await.unwrap();

        // The shell document is now served from cache even though the
        // backend has changed underneath.
        server.reset().await;
        let asset = cache
            .fetch("GET", &format!("{}/", server.uri()))
            .await
            .unwrap();
        assert!(asset.from_cache);
        assert_eq!(asset.body, b"<html>shell</html>");
    }

    #[tokio::test]
    async fn fetch_is_cache_first() {
        let server = MockServer::start().await;
        mount_get(&server, "/page", 200, "v1-body").await;

        let (cache, _dir) = test_cache(&server, "v1").await;
        let url = format!("{}/page", server.uri());

        let first = cache.fetch("GET", &url).await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.body, b"v1-body");

        // Backend now serves different content; the cache still wins.
        server.reset().await;
        mount_get(&server, "/page", 200, "v2-body").await;

        let second = cache.fetch("GET", &url).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.body, b"v1-body");
    }

    #[tokio::test]
    async fn network_failure_with_no_entry_fails_naturally() {
        let server = MockServer::start().await;
        let (cache, _dir) = test_cache(&server, "v1").await;

        // Reserved TEST-NET address, nothing listens there.
        let asset = cache.fetch("GET", "http://192.0.2.1:9/missing").await;
        assert!(asset.is_none());
    }

    #[tokio::test]
    async fn non_success_responses_are_returned_but_not_cached() {
        let server = MockServer::start().await;
        mount_get(&server, "/gone", 404, "not here").await;

        let (cache, _dir) = test_cache(&server, "v1").await;
        let url = format!("{}/gone", server.uri());

        let miss = cache.fetch("GET", &url).await.unwrap();
        assert_eq!(miss.status, 404);
        assert!(!miss.from_cache);

        server.reset().await;
        mount_get(&server, "/gone", 200, "back again").await;

        // Nothing was cached, so the new response comes from the network.
        let hit = cache.fetch("GET", &url).await.unwrap();
        assert!(!hit.from_cache);
        assert_eq!(hit.body, b"back again");
    }

    #[tokio::test]
    async fn cross_origin_responses_are_not_cached() {
        let server = MockServer::start().await;
        let other = MockServer::start().await;
        mount_get(&other, "/cdn.js", 200, "third-party").await;

        let (cache, dir) = test_cache(&server, "v1").await;
        let url = format!("{}/cdn.js", other.uri());

        let asset = cache.fetch("GET", &url).await.unwrap();
        assert_eq!(asset.body, b"third-party");

        let generation = dir.path().join(cache.name());
        let stored = std::fs::read_dir(&generation)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn non_get_requests_bypass_the_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_string("posted"))
            .mount(&server)
            .await;

        let (cache, dir) = test_cache(&server, "v1").await;
        let url = format!("{}/submit", server.uri());

        let asset = cache.fetch("POST", &url).await.unwrap();
        assert_eq!(asset.body, b"posted");

        let generation = dir.path().join(cache.name());
        let stored = std::fs::read_dir(&generation)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn activate_purges_stale_generations() {
        let server = MockServer::start().await;
        mount_get(&server, "/page", 200, "body").await;

        let root = TempDir::new().unwrap();

        // Populate an old generation.
        let old = AssetCache::new(
            root.path().to_path_buf(),
            "v1",
            &server.uri(),
            vec![],
        )
        .await
        .unwrap();
        old.fetch("GET", &format!("{}/page", server.uri())).await;
        assert!(root.path().join("unicon-static-v1").exists());

        // A new generation activates and the old one is gone.
        let new = AssetCache::new(
            root.path().to_path_buf(),
            "v2",
            &server.uri(),
            vec![],
        )
        .await
        .unwrap();
        new.install().await.unwrap();
        let deleted = new.activate().await.unwrap();

        assert_eq!(deleted, 1);
        assert!(!root.path().join("unicon-static-v1").exists());
        assert!(root.path().join("unicon-static-v2").exists());
    }
}
