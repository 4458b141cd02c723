pub mod cache;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod metrics;
pub mod movie;
pub mod orchestrator;
pub mod scanner;
pub mod testing;
pub mod video;

pub use cache::{
    load_snapshot, save_snapshot, CategorizedMovies, MovieCache, SnapshotError, SNAPSHOT_VERSION,
};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, ServerConfig, SnapshotConfig, CONFIG_PATH_ENV,
};
pub use extractor::{
    DocumentExtractor, EmbedVideoExtractor, Extraction, FanprojListingExtractor,
    KhaanFilmsExtractor, ListingExtractor, SkipReason, VideoExtractor,
};
pub use fetcher::{FetchError, FetchPolicy, Fetcher, FetcherConfig, HttpFetcher, PageFetcher};
pub use movie::{Category, Field, MovieDraft, MovieRecord};
pub use orchestrator::{
    OrchestratorError, OrchestratorStatus, ScrapeOrchestrator, ScrapePlan, ScrapeState,
};
pub use scanner::{
    ListingScanner, ListingSourceConfig, PageRange, ScanConfig, ScanError, ScanReport,
    SitemapScanner, SitemapSourceConfig, SourceScanner,
};
pub use video::{resolve_video, VideoError, VideoLookup};
