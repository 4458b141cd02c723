use super::{types::Config, ConfigError};
use crate::scanner::PageRange;

fn check_range(name: &str, range: PageRange) -> Result<(), ConfigError> {
    if range.start == 0 || range.start > range.end {
        return Err(ConfigError::ValidationError(format!(
            "{} must be a non-empty range starting at 1 or later, got {}",
            name, range
        )));
    }
    Ok(())
}

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Batch sizes and attempt counts are not 0
/// - Page ranges are not inverted
/// - Listing base URL is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.fetcher.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "fetcher.max_attempts cannot be 0".to_string(),
        ));
    }

    if config.listing.batch_pages == 0 {
        return Err(ConfigError::ValidationError(
            "listing.batch_pages cannot be 0".to_string(),
        ));
    }

    if config.sitemap.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "sitemap.batch_size cannot be 0".to_string(),
        ));
    }

    if config.listing.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "listing.base_url cannot be empty".to_string(),
        ));
    }

    check_range("listing.fast_pass_pages", config.listing.fast_pass_pages)?;
    check_range("listing.background_pages", config.listing.background_pages)?;
    check_range("sitemap.pages", config.sitemap.pages)?;

    Ok(())
}
