//! Sitemap-driven document scanner.

use async_trait::async_trait;
use futures::future::join_all;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::extractor::{DocumentExtractor, Extraction};
use crate::fetcher::{FetchError, FetchPolicy, Fetcher};
use crate::metrics::{DOCUMENTS_SKIPPED, SCAN_DURATION};

use super::{
    EmptyBatchGuard, PageRange, ScanConfig, ScanError, ScanReport, SitemapSourceConfig,
    SourceScanner,
};

/// Parse a sitemap `urlset` and return every `<url><loc>` in order.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_url = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"url" => in_url = true,
                b"loc" if in_url => in_loc = true,
                _ => {}
            },
            Event::Text(e) if in_loc => {
                let loc = e.unescape()?;
                let loc = loc.trim();
                if !loc.is_empty() {
                    urls.push(loc.to_string());
                }
            }
            Event::CData(e) if in_loc => {
                let loc = String::from_utf8_lossy(&e).trim().to_string();
                if !loc.is_empty() {
                    urls.push(loc);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"loc" => in_loc = false,
                b"url" => in_url = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(urls)
}

/// Scans detail documents listed by a paged sitemap.
pub struct SitemapScanner {
    config: SitemapSourceConfig,
    scan: ScanConfig,
    fetcher: Fetcher,
    index_policy: FetchPolicy,
    document_policy: FetchPolicy,
    extractor: Arc<dyn DocumentExtractor>,
}

impl std::fmt::Debug for SitemapScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SitemapScanner")
            .field("name", &self.config.name)
            .field("sitemap_url", &self.config.sitemap_url)
            .field("batch_size", &self.config.batch_size)
            .finish()
    }
}

impl SitemapScanner {
    pub fn new(
        config: SitemapSourceConfig,
        scan: ScanConfig,
        fetcher: Fetcher,
        index_policy: FetchPolicy,
        document_policy: FetchPolicy,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        Self {
            config,
            scan,
            fetcher,
            index_policy,
            document_policy,
            extractor,
        }
    }

    /// Fetch and parse one sitemap page.
    async fn sitemap_page(&self, page: u32) -> Result<Vec<String>, String> {
        let url = self.config.sitemap_page_url(page);
        let xml = self
            .fetcher
            .fetch(&url, self.index_policy)
            .await
            .map_err(|e| e.to_string())?;
        parse_sitemap(&xml).map_err(|e| format!("malformed sitemap {}: {}", url, e))
    }

    async fn document(&self, url: &str) -> Result<Extraction, FetchError> {
        let body = self.fetcher.fetch(url, self.document_policy).await?;
        Ok(self.extractor.extract(&body, url))
    }
}

#[async_trait]
impl SourceScanner for SitemapScanner {
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

        // Enumerate documents from every sitemap page that answers.
        let mut urls: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut last_error = String::new();
        for page in range.iter() {
            report.pages_attempted += 1;
            match self.sitemap_page(page).await {
                Ok(locs) => {
                    let before = urls.len();
                    for loc in locs {
                        if self.extractor.accepts(&loc) && seen.insert(loc.clone()) {
                            urls.push(loc);
                        }
                    }
                    debug!(source = %name, page = page, documents = urls.len() - before, "Read sitemap page");
                }
                Err(e) => {
                    warn!(source = %name, page = page, error = %e, "Skipping sitemap page");
                    report.pages_failed += 1;
                    last_error = e;
                }
            }
        }

        if report.pages_attempted > 0 && report.pages_failed == report.pages_attempted {
            timer.observe_duration();
            return Err(ScanError::SourceUnreachable {
                source_name: name,
                attempted: report.pages_attempted,
                last_error,
            });
        }

        info!(source = %name, documents = urls.len(), "Scanning sitemap documents");

        let mut guard = EmptyBatchGuard::new(self.scan.max_empty_batches);
        let batches: Vec<&[String]> = urls.chunks(self.config.batch_size.max(1)).collect();

        for (index, batch) in batches.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(Duration::from_millis(self.scan.batch_delay_ms)).await;
            }

            let results = join_all(batch.iter().map(|url| self.document(url))).await;

            let mut new_records = 0;
            for (url, result) in batch.iter().zip(results) {
                match result {
                    Ok(Extraction::Movie(draft)) => {
                        report.records.push(draft);
                        new_records += 1;
                    }
                    Ok(Extraction::Skip(reason)) => {
                        debug!(source = %name, url = %url, reason = %reason, "Skipped document");
                        report.documents_skipped += 1;
                        DOCUMENTS_SKIPPED
                            .with_label_values(&[name.as_str(), reason.as_str()])
                            .inc();
                    }
                    Err(e) => {
                        warn!(source = %name, url = %url, error = %e, "Skipping document");
                        report.documents_skipped += 1;
                        DOCUMENTS_SKIPPED.with_label_values(&[name.as_str(), "fetch"]).inc();
                    }
                }
            }

            debug!(
                source = %name,
                batch = index + 1,
                of = batches.len(),
                total = report.records.len(),
                "Batch complete"
            );

            if guard.record(new_records) && index + 1 < batches.len() {
                info!(
                    source = %name,
                    "No records in {} consecutive batches, stopping",
                    self.scan.max_empty_batches
                );
                report.stopped_early = true;
                break;
            }
        }

        timer.observe_duration();
        info!(
            source = %name,
            records = report.records.len(),
            skipped = report.documents_skipped,
            "Sitemap scan finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::KhaanFilmsExtractor;
    use crate::testing::{fixtures, MockFetcher};

    const SITEMAP: &str = "https://docs.test/sitemap.xml?page={page}";

    fn scanner(mock: Arc<MockFetcher>, batch_size: usize) -> SitemapScanner {
        let config = SitemapSourceConfig {
            name: "docs".to_string(),
            sitemap_url: SITEMAP.to_string(),
            batch_size,
            ..Default::default()
        };
        let policy = FetchPolicy {
            timeout: Duration::from_secs(1),
            max_attempts: 3,
        };
        SitemapScanner::new(
            config,
            ScanConfig {
                batch_delay_ms: 0,
                max_empty_batches: 3,
            },
            Fetcher::new(mock, Duration::from_millis(1)),
            policy,
            policy,
            Arc::new(KhaanFilmsExtractor::new("docs")),
        )
    }

    fn sitemap_url(page: u32) -> String {
        SITEMAP.replace("{page}", &page.to_string())
    }

    fn doc_url(n: u32) -> String {
        format!("https://docs.test/2024/01/film-{}.html", n)
    }

    #[test]
    fn test_parse_sitemap() {
        let xml = fixtures::sitemap_xml(&[doc_url(1), "https://docs.test/p/about.html".into()]);
        let urls = parse_sitemap(&xml).unwrap();
        assert_eq!(urls, vec![doc_url(1), "https://docs.test/p/about.html".to_string()]);
    }

    #[test]
    fn test_parse_sitemap_unescapes() {
        let xml = r#"<urlset><url><loc>https://a.test/x.html?a=1&amp;b=2</loc></url></urlset>"#;
        assert_eq!(
            parse_sitemap(xml).unwrap(),
            vec!["https://a.test/x.html?a=1&b=2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_scan_filters_and_extracts() {
        let mock = Arc::new(MockFetcher::new());
        let mut listed: Vec<String> = (1..=4).map(doc_url).collect();
        listed.push("https://docs.test/p/contact.html".to_string());
        listed.push("https://docs.test/search/label/Action".to_string());
        mock.set_page(sitemap_url(1), fixtures::sitemap_xml(&listed)).await;
        mock.set_page(sitemap_url(2), fixtures::sitemap_xml(&[doc_url(1)])).await;
        for n in 1..=3 {
            mock.set_page(doc_url(n), fixtures::movie_document(&format!("Film {}", n), &["Drama"]))
                .await;
        }
        mock.set_page(doc_url(4), fixtures::untitled_document()).await;

        let report = scanner(mock.clone(), 2).scan(PageRange::new(1, 2)).await.unwrap();

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.documents_skipped, 1);
        assert_eq!(report.pages_attempted, 2);
        assert!(report.records.iter().all(|r| r.source == "docs"));
        assert_eq!(mock.call_count("https://docs.test/p/contact.html").await, 0);
        // Listed on both sitemap pages, fetched once.
        assert_eq!(mock.call_count(&doc_url(1)).await, 1);
    }

    #[tokio::test]
    async fn test_failed_document_does_not_abort_batch() {
        let mock = Arc::new(MockFetcher::new());
        let listed: Vec<String> = (1..=3).map(doc_url).collect();
        mock.set_page(sitemap_url(1), fixtures::sitemap_xml(&listed)).await;
        mock.set_page(doc_url(1), fixtures::movie_document("One", &[])).await;
        mock.fail_always(doc_url(2)).await;
        mock.set_page(doc_url(3), fixtures::movie_document("Three", &[])).await;

        let report = scanner(mock, 50).scan(PageRange::new(1, 1)).await.unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.documents_skipped, 1);
    }

    #[tokio::test]
    async fn test_one_sitemap_page_failing_is_tolerated() {
        let mock = Arc::new(MockFetcher::new());
        mock.fail_always(sitemap_url(1)).await;
        mock.set_page(sitemap_url(2), fixtures::sitemap_xml(&[doc_url(9)])).await;
        mock.set_page(doc_url(9), fixtures::movie_document("Nine", &[])).await;

        let report = scanner(mock, 50).scan(PageRange::new(1, 2)).await.unwrap();

        assert_eq!(report.pages_failed, 1);
        assert_eq!(report.records.len(), 1);
    }

    #[tokio::test]
    async fn test_all_sitemap_pages_failing_is_unreachable() {
        let mock = Arc::new(MockFetcher::new());
        mock.fail_always(sitemap_url(1)).await;
        mock.fail_always(sitemap_url(2)).await;

        let result = scanner(mock.clone(), 50).scan(PageRange::new(1, 2)).await;

        assert!(matches!(
            result,
            Err(ScanError::SourceUnreachable { attempted: 2, .. })
        ));
        assert_eq!(mock.call_count(&sitemap_url(1)).await, 3);
    }
}
