//! Retrying wrapper around a `PageFetcher`.

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::metrics::FETCH_ATTEMPTS;

use super::{FetchError, FetchPolicy, PageFetcher};

/// Fetches pages with retry on transient failures.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct Fetcher {
    inner: Arc<dyn PageFetcher>,
    backoff_base: Duration,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("inner", &"<page fetcher>")
            .field("backoff_base", &self.backoff_base)
            .finish()
    }
}

impl Fetcher {
    pub fn new(inner: Arc<dyn PageFetcher>, backoff_base: Duration) -> Self {
        Self {
            inner,
            backoff_base,
        }
    }

    /// Fetch `url`, retrying transient failures up to `policy.max_attempts`.
    ///
    /// Attempt `n` that fails is followed by a `n * backoff_base` pause
    /// before attempt `n + 1`. Permanent failures return immediately.
    pub async fn fetch(&self, url: &str, policy: FetchPolicy) -> Result<String, FetchError> {
        let max_attempts = policy.max_attempts.max(1);
        let mut last_reason = String::new();

        for attempt in 1..=max_attempts {
            match self.inner.get(url, policy.timeout).await {
                Ok(body) => {
                    FETCH_ATTEMPTS.with_label_values(&["ok"]).inc();
                    return Ok(body);
                }
                Err(e) => {
                    FETCH_ATTEMPTS.with_label_values(&[e.kind()]).inc();
                    if e.is_permanent() {
                        return Err(e);
                    }
                    last_reason = match e {
                        FetchError::Transient { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    if attempt < max_attempts {
                        let delay = self.backoff_base * attempt;
                        warn!(
                            "Fetch failed for {} (attempt {}/{}): {}; retrying in {:.1}s",
                            url,
                            attempt,
                            max_attempts,
                            last_reason,
                            delay.as_secs_f64()
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(FetchError::Transient {
            url: url.to_string(),
            attempts: max_attempts,
            reason: last_reason,
        })
    }
}
