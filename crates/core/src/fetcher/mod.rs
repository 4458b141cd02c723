//! Page fetching with retry and linear backoff.
//!
//! `PageFetcher` performs exactly one HTTP GET. `Fetcher` wraps any
//! `PageFetcher` and retries transient failures (timeouts, connection
//! errors) with `attempt * backoff_base` between attempts. HTTP error
//! statuses from a reachable server are permanent and never retried.

mod config;
mod http;
mod retry;
mod types;

pub use config::FetcherConfig;
pub use http::HttpFetcher;
pub use retry::Fetcher;
pub use types::{FetchError, FetchPolicy, PageFetcher};
