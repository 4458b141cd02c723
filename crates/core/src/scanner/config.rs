//! Source scanner configuration.

use serde::{Deserialize, Serialize};

use super::PageRange;

/// Paginated listing source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSourceConfig {
    /// Name recorded as `source` on every record.
    #[serde(default = "default_listing_name")]
    pub name: String,

    /// Site origin, e.g. `https://fanprojnet.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page path template; `{page}` is replaced by the page number.
    #[serde(default = "default_page_path")]
    pub page_path: String,

    /// Listing pages fetched concurrently per batch.
    #[serde(default = "default_batch_pages")]
    pub batch_pages: usize,

    /// Per-attempt timeout for a listing page (seconds).
    #[serde(default = "default_listing_timeout")]
    pub timeout_secs: u64,

    /// Pages scanned synchronously on first demand.
    #[serde(default = "default_fast_pass_pages")]
    pub fast_pass_pages: PageRange,

    /// Pages scanned in the background after the fast pass.
    #[serde(default = "default_background_pages")]
    pub background_pages: PageRange,
}

fn default_listing_name() -> String {
    "fanproj.net".to_string()
}

fn default_base_url() -> String {
    "https://fanprojnet.com".to_string()
}

fn default_page_path() -> String {
    "/page/{page}/".to_string()
}

fn default_batch_pages() -> usize {
    5
}

fn default_listing_timeout() -> u64 {
    30
}

fn default_fast_pass_pages() -> PageRange {
    PageRange::new(1, 2)
}

fn default_background_pages() -> PageRange {
    PageRange::new(3, 100)
}

impl ListingSourceConfig {
    /// URL of listing page `page`.
    pub fn page_url(&self, page: u32) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.page_path.replace("{page}", &page.to_string())
        )
    }
}

impl Default for ListingSourceConfig {
    fn default() -> Self {
        Self {
            name: default_listing_name(),
            base_url: default_base_url(),
            page_path: default_page_path(),
            batch_pages: default_batch_pages(),
            timeout_secs: default_listing_timeout(),
            fast_pass_pages: default_fast_pass_pages(),
            background_pages: default_background_pages(),
        }
    }
}

/// Sitemap-enumerated source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapSourceConfig {
    /// Name recorded as `source` on every record.
    #[serde(default = "default_sitemap_name")]
    pub name: String,

    /// Sitemap URL template; `{page}` is replaced by the sitemap page number.
    #[serde(default = "default_sitemap_url")]
    pub sitemap_url: String,

    /// Sitemap pages to enumerate.
    #[serde(default = "default_sitemap_pages")]
    pub pages: PageRange,

    /// Documents fetched concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-attempt timeout for a sitemap page (seconds).
    #[serde(default = "default_index_timeout")]
    pub index_timeout_secs: u64,

    /// Per-attempt timeout for a detail document (seconds).
    #[serde(default = "default_document_timeout")]
    pub document_timeout_secs: u64,
}

fn default_sitemap_name() -> String {
    "khaanfilms.com".to_string()
}

fn default_sitemap_url() -> String {
    "https://www.khaanfilms.com/sitemap.xml?page={page}".to_string()
}

fn default_sitemap_pages() -> PageRange {
    PageRange::new(1, 2)
}

fn default_batch_size() -> usize {
    50
}

fn default_index_timeout() -> u64 {
    15
}

fn default_document_timeout() -> u64 {
    10
}

impl SitemapSourceConfig {
    /// URL of sitemap page `page`.
    pub fn sitemap_page_url(&self, page: u32) -> String {
        self.sitemap_url.replace("{page}", &page.to_string())
    }
}

impl Default for SitemapSourceConfig {
    fn default() -> Self {
        Self {
            name: default_sitemap_name(),
            sitemap_url: default_sitemap_url(),
            pages: default_sitemap_pages(),
            batch_size: default_batch_size(),
            index_timeout_secs: default_index_timeout(),
            document_timeout_secs: default_document_timeout(),
        }
    }
}

/// Pacing shared by every scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Pause between batches (milliseconds).
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,

    /// Stop after this many consecutive batches with no new records (0 = never).
    #[serde(default = "default_max_empty_batches")]
    pub max_empty_batches: usize,
}

fn default_batch_delay() -> u64 {
    500
}

fn default_max_empty_batches() -> usize {
    3
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_delay_ms: default_batch_delay(),
            max_empty_batches: default_max_empty_batches(),
        }
    }
}
