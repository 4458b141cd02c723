//! Fetcher configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FetchPolicy;

/// HTTP client settings shared by every source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total attempts per URL, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff unit (milliseconds). Attempt `n` waits `n * base`.
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,

    /// Timeout for the on-demand single video lookup (seconds).
    #[serde(default = "default_video_timeout")]
    pub video_timeout_secs: u64,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    1000
}

fn default_video_timeout() -> u64 {
    15
}

impl FetcherConfig {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Policy for a scraping request with the given timeout.
    pub fn policy(&self, timeout_secs: u64) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_secs(timeout_secs),
            max_attempts: self.max_attempts,
        }
    }

    /// Single-attempt policy used by the video lookup.
    pub fn video_policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_secs(self.video_timeout_secs),
            max_attempts: 1,
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base(),
            video_timeout_secs: default_video_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetcherConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_base(), Duration::from_secs(1));
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_policies() {
        let config = FetcherConfig::default();
        let policy = config.policy(30);
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.max_attempts, 3);

        let video = config.video_policy();
        assert_eq!(video.timeout, Duration::from_secs(15));
        assert_eq!(video.max_attempts, 1);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            max_attempts = 5
        "#;
        let config: FetcherConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.backoff_base_ms, 1000);
    }
}
