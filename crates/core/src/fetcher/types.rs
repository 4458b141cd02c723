//! Fetcher types and the transport trait.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Per-request fetch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Timeout for a single attempt.
    pub timeout: Duration,
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Network failure or timeout. Retried up to the policy bound.
    #[error("Transient failure fetching {url} after {attempts} attempt(s): {reason}")]
    Transient {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The server answered with an error status. Never retried.
    #[error("HTTP {status} fetching {url}")]
    Permanent { url: String, status: u16 },

    /// The URL could not be parsed. Never retried.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }

    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transient { .. } => "transient",
            FetchError::Permanent { .. } => "permanent",
            FetchError::InvalidUrl(_) => "invalid_url",
            FetchError::Client(_) => "client",
        }
    }
}

/// Performs a single HTTP GET.
///
/// Implementations must not retry; `Fetcher` owns the retry policy.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` once and return the response body as text.
    async fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}
