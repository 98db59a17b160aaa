//! Watermark byte retrieval with caching.
//!
//! Fetches watermark images over HTTP(S) or from local files. Remote fetches
//! carry an explicit timeout; a timeout is just another fetch failure.
//! Fetched bytes are cached by source so keys sharing a URL fetch it once.

use super::WatermarkError;
use moka::future::Cache;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the image fetcher.
#[derive(Debug, Clone)]
pub struct ImageFetcherConfig {
    /// Maximum number of cached sources.
    pub max_cache_entries: u64,
    /// Per-request timeout for remote sources.
    pub timeout: Duration,
}

impl Default for ImageFetcherConfig {
    fn default() -> Self {
        Self {
            max_cache_entries: 100,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Fetcher for watermark bytes with built-in caching.
#[derive(Clone)]
pub struct ImageFetcher {
    cache: Cache<String, Arc<Vec<u8>>>,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for ImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFetcher")
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

impl ImageFetcher {
    /// Create a new image fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `WatermarkError::ConfigError` if the HTTP client cannot be created.
    pub fn new(config: ImageFetcherConfig) -> Result<Self, WatermarkError> {
        let cache = Cache::builder()
            .max_capacity(config.max_cache_entries)
            .build();

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                WatermarkError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { cache, http_client })
    }

    /// Fetch bytes from an HTTP(S) URL.
    pub async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, WatermarkError> {
        if let Some(cached) = self.cache.get(url).await {
            return Ok(cached.as_ref().clone());
        }

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| WatermarkError::FetchError(format!("HTTP fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(WatermarkError::FetchError(format!(
                "HTTP request failed with status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WatermarkError::FetchError(format!("Failed to read HTTP body: {e}")))?;

        if bytes.is_empty() {
            return Err(WatermarkError::FetchError(format!(
                "Empty response body from {url}"
            )));
        }

        let data = bytes.to_vec();
        self.cache
            .insert(url.to_string(), Arc::new(data.clone()))
            .await;
        Ok(data)
    }

    /// Read bytes from a local file.
    pub async fn fetch_file(&self, path: &Path) -> Result<Vec<u8>, WatermarkError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            WatermarkError::FetchError(format!("Failed to read {}: {e}", path.display()))
        })?;
        if data.is_empty() {
            return Err(WatermarkError::FetchError(format!(
                "Watermark file {} is empty",
                path.display()
            )));
        }
        Ok(data)
    }

    /// Get the number of cached sources.
    pub fn cache_size(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Check if a source is cached.
    pub async fn is_cached(&self, url: &str) -> bool {
        self.cache.get(url).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> ImageFetcher {
        ImageFetcher::new(ImageFetcherConfig {
            max_cache_entries: 10,
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ImageFetcherConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_cache_entries, 100);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let fetcher = fetcher();
        let result = fetcher.fetch_remote("http://bad.invalid/x.png").await;
        assert!(matches!(result, Err(WatermarkError::FetchError(_))));
        assert!(!fetcher.is_cached("http://bad.invalid/x.png").await);
    }

    #[tokio::test]
    async fn test_fetch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let data = fetcher().fetch_file(&path).await.unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_empty_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = fetcher().fetch_file(file.path()).await;
        assert!(matches!(result, Err(WatermarkError::FetchError(_))));
    }

    #[tokio::test]
    async fn test_fetch_missing_file_fails() {
        let result = fetcher().fetch_file(Path::new("/no/such/logo.png")).await;
        assert!(matches!(result, Err(WatermarkError::FetchError(_))));
    }
}
