//! Mock page fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

use crate::fetcher::{FetchError, PageFetcher};

#[derive(Debug, Clone, Copy)]
enum Failure {
    Always,
    Times(u32),
}

/// In-memory implementation of the PageFetcher trait.
///
/// Provides controllable behavior for testing:
/// - Serve canned bodies per URL
/// - Answer with an HTTP error status
/// - Fail transiently forever or a fixed number of times
/// - Hold requests by URL prefix until released
/// - Record every call for assertions
///
/// Unknown URLs answer with a permanent 404.
///
/// # Example
///
/// ```rust,ignore
/// use hashistream_core::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new();
/// fetcher.set_page("https://site.test/page/1/", "<html>...</html>").await;
/// fetcher.fail_times("https://site.test/page/2/", 2).await;
///
/// let body = fetcher.get("https://site.test/page/1/", timeout).await?;
/// assert_eq!(fetcher.call_count("https://site.test/page/1/").await, 1);
/// ```
#[derive(Debug)]
pub struct MockFetcher {
    /// Canned bodies by URL.
    pages: Arc<RwLock<HashMap<String, String>>>,
    /// Error statuses by URL.
    statuses: Arc<RwLock<HashMap<String, u16>>>,
    /// Transient failure plans by URL.
    failures: Arc<RwLock<HashMap<String, Failure>>>,
    /// Simulated latency for every request.
    delay: Arc<RwLock<Option<Duration>>>,
    /// URL prefixes whose requests wait until released.
    held: watch::Sender<Vec<String>>,
    /// Every requested URL, in call order.
    calls: Arc<RwLock<Vec<String>>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a new mock fetcher with nothing configured.
    pub fn new() -> Self {
        let (held, _) = watch::channel(Vec::new());
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            statuses: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(None)),
            held,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Serve `body` for `url`.
    pub async fn set_page(&self, url: impl Into<String>, body: impl Into<String>) {
        self.pages.write().await.insert(url.into(), body.into());
    }

    /// Answer `url` with an HTTP error status.
    pub async fn set_status(&self, url: impl Into<String>, status: u16) {
        self.statuses.write().await.insert(url.into(), status);
    }

    /// Fail every request for `url` with a transient error.
    pub async fn fail_always(&self, url: impl Into<String>) {
        self.failures.write().await.insert(url.into(), Failure::Always);
    }

    /// Fail the next `times` requests for `url`, then serve normally.
    pub async fn fail_times(&self, url: impl Into<String>, times: u32) {
        self.failures
            .write()
            .await
            .insert(url.into(), Failure::Times(times));
    }

    /// Delay every response.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Hold every request whose URL starts with `prefix` until `release_all`.
    pub fn hold_prefix(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        self.held.send_modify(|held| held.push(prefix));
    }

    /// Let every held request proceed.
    pub fn release_all(&self) {
        self.held.send_modify(|held| held.clear());
    }

    /// Number of requests made for `url`.
    pub async fn call_count(&self, url: &str) -> usize {
        self.calls.read().await.iter().filter(|u| *u == url).count()
    }

    /// Every requested URL, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    async fn wait_if_held(&self, url: &str) {
        loop {
            let mut rx = self.held.subscribe();
            if !rx.borrow().iter().any(|prefix| url.starts_with(prefix.as_str())) {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Consume one planned failure for `url`, if any.
    async fn take_failure(&self, url: &str) -> bool {
        let mut failures = self.failures.write().await;
        match failures.get_mut(url) {
            Some(Failure::Always) => true,
            Some(Failure::Times(n)) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<String, FetchError> {
        self.calls.write().await.push(url.to_string());

        self.wait_if_held(url).await;

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.take_failure(url).await {
            return Err(FetchError::Transient {
                url: url.to_string(),
                attempts: 1,
                reason: "simulated network failure".to_string(),
            });
        }

        if let Some(status) = self.statuses.read().await.get(url) {
            return Err(FetchError::Permanent {
                url: url.to_string(),
                status: *status,
            });
        }

        self.pages
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Permanent {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_unknown_url_is_404() {
        let mock = MockFetcher::new();
        let result = mock.get("https://x/none", T).await;
        assert!(matches!(result, Err(FetchError::Permanent { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fail_times_then_serves() {
        let mock = MockFetcher::new();
        mock.set_page("https://x/a", "body").await;
        mock.fail_times("https://x/a", 1).await;

        assert!(mock.get("https://x/a", T).await.is_err());
        assert_eq!(mock.get("https://x/a", T).await.unwrap(), "body");
        assert_eq!(mock.call_count("https://x/a").await, 2);
    }

    #[tokio::test]
    async fn test_hold_and_release() {
        let mock = Arc::new(MockFetcher::new());
        mock.set_page("https://slow/a", "late").await;
        mock.hold_prefix("https://slow/");

        let m = Arc::clone(&mock);
        let handle = tokio::spawn(async move { m.get("https://slow/a", T).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        mock.release_all();
        assert_eq!(handle.await.unwrap().unwrap(), "late");
    }
}
