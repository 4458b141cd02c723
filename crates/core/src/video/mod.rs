//! On-demand video link lookup for a single detail page.
//!
//! Bypasses the cache: the page is fetched once with the video policy and
//! handed straight to a `VideoExtractor`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::extractor::VideoExtractor;
use crate::fetcher::{FetchError, FetchPolicy, Fetcher};

#[derive(Debug, Error)]
pub enum VideoError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("No video sources found")]
    NotFound,
}

/// Fetch `url` and extract its video link.
pub async fn resolve_video(
    fetcher: &Fetcher,
    extractor: &dyn VideoExtractor,
    policy: FetchPolicy,
    url: &str,
) -> Result<String, VideoError> {
    let document = fetcher.fetch(url, policy).await.map_err(|e| {
        warn!(url = %url, error = %e, "Video page fetch failed");
        e
    })?;

    match extractor.extract_video(&document, url) {
        Some(video) => {
            info!(url = %url, video = %video, "Found video");
            Ok(video)
        }
        None => {
            info!(url = %url, "No video found");
            Err(VideoError::NotFound)
        }
    }
}

/// Fetcher, extractor and policy bundled for the API layer.
#[derive(Clone)]
pub struct VideoLookup {
    fetcher: Fetcher,
    extractor: Arc<dyn VideoExtractor>,
    policy: FetchPolicy,
}

impl std::fmt::Debug for VideoLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoLookup")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl VideoLookup {
    pub fn new(fetcher: Fetcher, extractor: Arc<dyn VideoExtractor>, policy: FetchPolicy) -> Self {
        Self {
            fetcher,
            extractor,
            policy,
        }
    }

    pub async fn resolve(&self, url: &str) -> Result<String, VideoError> {
        resolve_video(&self.fetcher, self.extractor.as_ref(), self.policy, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::EmbedVideoExtractor;
    use crate::testing::MockFetcher;
    use std::time::Duration;

    const PAGE: &str = "https://site.test/movie.html";

    fn lookup(mock: Arc<MockFetcher>) -> VideoLookup {
        let fetcher = Fetcher::new(mock, Duration::from_millis(1));
        VideoLookup::new(
            fetcher,
            Arc::new(EmbedVideoExtractor::new()),
            FetchPolicy {
                timeout: Duration::from_secs(15),
                max_attempts: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_resolves_video() {
        let mock = Arc::new(MockFetcher::new());
        mock.set_page(
            PAGE,
            r#"<div class="DagPlayOpt" data-embed="https://drive.google.com/file/d/1/preview"></div>"#,
        )
        .await;

        let video = lookup(mock).resolve(PAGE).await.unwrap();
        assert_eq!(video, "https://drive.google.com/file/d/1/preview");
    }

    #[tokio::test]
    async fn test_no_video_is_not_found() {
        let mock = Arc::new(MockFetcher::new());
        mock.set_page(PAGE, "<html><body><p>nothing</p></body></html>")
            .await;

        let err = lookup(mock).resolve(PAGE).await.unwrap_err();
        assert!(matches!(err, VideoError::NotFound));
        assert_eq!(err.to_string(), "No video sources found");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_single_attempt() {
        let mock = Arc::new(MockFetcher::new());
        mock.fail_always(PAGE).await;

        let err = lookup(Arc::clone(&mock)).resolve(PAGE).await.unwrap_err();
        assert!(matches!(err, VideoError::Fetch(ref e) if e.is_transient()));
        assert_eq!(mock.call_count(PAGE).await, 1);
    }
}
