//! Paginated listing scanner.

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::extractor::{Extraction, ListingExtractor};
use crate::fetcher::{FetchError, FetchPolicy, Fetcher};
use crate::metrics::{DOCUMENTS_SKIPPED, SCAN_DURATION};

use super::{
    EmptyBatchGuard, ListingSourceConfig, PageRange, ScanConfig, ScanError, ScanReport,
    SourceScanner,
};

/// Scans listing pages in batches of `batch_pages`.
pub struct ListingScanner {
    config: ListingSourceConfig,
    scan: ScanConfig,
    fetcher: Fetcher,
    policy: FetchPolicy,
    extractor: Arc<dyn ListingExtractor>,
}

impl std::fmt::Debug for ListingScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingScanner")
            .field("name", &self.config.name)
            .field("base_url", &self.config.base_url)
            .field("batch_pages", &self.config.batch_pages)
            .finish()
    }
}

impl ListingScanner {
    pub fn new(
        config: ListingSourceConfig,
        scan: ScanConfig,
        fetcher: Fetcher,
        policy: FetchPolicy,
        extractor: Arc<dyn ListingExtractor>,
    ) -> Self {
        Self {
            config,
            scan,
            fetcher,
            policy,
            extractor,
        }
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<Extraction>, FetchError> {
        let url = self.config.page_url(page);
        let body = self.fetcher.fetch(&url, self.policy).await?;
        let extractions = self.extractor.extract_page(&body, &url);
        debug!(page = page, cards = extractions.len(), "Extracted listing page");
        Ok(extractions)
    }
}

#[async_trait]
impl SourceScanner for ListingScanner {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn scan(&self, range: PageRange) -> Result<ScanReport, ScanError> {
        let name = self.config.name.clone();
        let timer = SCAN_DURATION.with_label_values(&[name.as_str()]).start_timer();

        let mut report = ScanReport {
            source: name.clone(),
            ..Default::default()
        };
        let mut seen_titles: HashSet<String> = HashSet::new();
        let mut guard = EmptyBatchGuard::new(self.scan.max_empty_batches);
        let mut last_error: Option<String> = None;

        let pages: Vec<u32> = range.iter().collect();
        let batches: Vec<&[u32]> = pages.chunks(self.config.batch_pages.max(1)).collect();

        for (index, batch) in batches.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(Duration::from_millis(self.scan.batch_delay_ms)).await;
            }

            debug!(
                source = %name,
                "Fetching pages {}-{}",
                batch[0],
                batch[batch.len() - 1]
            );

            let results = join_all(batch.iter().map(|&page| self.fetch_page(page))).await;

            let mut new_records = 0;
            for (page, result) in batch.iter().zip(results) {
                report.pages_attempted += 1;
                match result {
                    Ok(extractions) => {
                        for extraction in extractions {
                            match extraction {
                                Extraction::Movie(draft) => {
                                    if seen_titles.insert(draft.title.clone()) {
                                        report.records.push(draft);
                                        new_records += 1;
                                    }
                                }
                                Extraction::Skip(reason) => {
                                    report.documents_skipped += 1;
                                    DOCUMENTS_SKIPPED
                                        .with_label_values(&[name.as_str(), reason.as_str()])
                                        .inc();
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!(source = %name, page = page, error = %e, "Skipping listing page");
                        report.pages_failed += 1;
                        DOCUMENTS_SKIPPED.with_label_values(&[name.as_str(), "fetch"]).inc();
                        last_error = Some(e.to_string());
                    }
                }
            }

            debug!(
                source = %name,
                new = new_records,
                total = report.records.len(),
                "Batch complete"
            );

            if guard.record(new_records) && index + 1 < batches.len() {
                info!(
                    source = %name,
                    "No new records in {} consecutive batches, stopping at page {}",
                    self.scan.max_empty_batches,
                    batch[batch.len() - 1]
                );
                report.stopped_early = true;
                break;
            }
        }

        timer.observe_duration();

        if report.pages_attempted > 0 && report.pages_failed == report.pages_attempted {
            return Err(ScanError::SourceUnreachable {
                source_name: name,
                attempted: report.pages_attempted,
                last_error: last_error.unwrap_or_default(),
            });
        }

        info!(
            source = %name,
            pages = %range,
            records = report.records.len(),
            failed_pages = report.pages_failed,
            "Listing scan finished"
        );
        Ok(report)
    }
}
