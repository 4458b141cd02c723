use std::sync::Arc;
use std::time::Duration;

use hashistream_core::{
    Config, EmbedVideoExtractor, Fetcher, MovieCache, PageFetcher, ScrapeOrchestrator,
    VideoLookup,
};

/// Timeout for a proxied upstream request.
const PROXY_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<ScrapeOrchestrator>,
    video: VideoLookup,
    proxy_client: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: Config,
        orchestrator: Arc<ScrapeOrchestrator>,
        video: VideoLookup,
        proxy_client: reqwest::Client,
    ) -> Self {
        Self {
            config,
            orchestrator,
            video,
            proxy_client,
        }
    }

    /// Wire the orchestrator, video lookup and proxy client from config.
    ///
    /// `transport` performs every scrape and video page request.
    pub fn from_config(
        config: Config,
        transport: Arc<dyn PageFetcher>,
    ) -> Result<Self, reqwest::Error> {
        let cache = Arc::new(MovieCache::new());
        let orchestrator = Arc::new(ScrapeOrchestrator::from_config(
            &config,
            cache,
            Arc::clone(&transport),
        ));

        let video = VideoLookup::new(
            Fetcher::new(transport, config.fetcher.backoff_base()),
            Arc::new(EmbedVideoExtractor::new()),
            config.fetcher.video_policy(),
        );

        let proxy_client = reqwest::Client::builder()
            .user_agent(config.fetcher.user_agent.clone())
            .timeout(PROXY_TIMEOUT)
            .build()?;

        Ok(Self::new(config, orchestrator, video, proxy_client))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<ScrapeOrchestrator> {
        &self.orchestrator
    }

    pub fn cache(&self) -> &Arc<MovieCache> {
        self.orchestrator.cache()
    }

    pub fn video(&self) -> &VideoLookup {
        &self.video
    }

    pub fn proxy_client(&self) -> &reqwest::Client {
        &self.proxy_client
    }
}
