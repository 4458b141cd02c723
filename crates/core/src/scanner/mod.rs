//! Source scanners.
//!
//! A scanner enumerates one source over a page range, drives fetch and
//! extraction in bounded batches, and hands back every draft it found. Two
//! enumeration styles exist:
//!
//! - [`ListingScanner`]: paginated listing pages, each carrying many cards.
//!   Batches are pages; drafts are deduplicated by title within one scan.
//! - [`SitemapScanner`]: sitemap pages list detail documents. Batches are
//!   documents; every draft is kept and deduplication is left to the cache.
//!
//! Per-document failures are logged and skipped. Only a source whose every
//! listing or sitemap page failed returns [`ScanError`].

mod config;
mod listing;
mod sitemap;
mod types;

pub use config::{ListingSourceConfig, ScanConfig, SitemapSourceConfig};
pub use listing::ListingScanner;
pub use sitemap::{parse_sitemap, SitemapScanner};
pub use types::{PageRange, ScanError, ScanReport, SourceScanner};

/// Counts consecutive batches that added nothing.
#[derive(Debug)]
pub(crate) struct EmptyBatchGuard {
    limit: usize,
    run: usize,
}

impl EmptyBatchGuard {
    pub(crate) fn new(limit: usize) -> Self {
        Self { limit, run: 0 }
    }

    /// Record a finished batch. Returns true once the scan should stop.
    pub(crate) fn record(&mut self, new_records: usize) -> bool {
        if new_records == 0 {
            self.run += 1;
        } else {
            self.run = 0;
        }
        self.limit > 0 && self.run >= self.limit
    }
}
