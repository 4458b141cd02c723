//! Scrape orchestrator runner.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

use crate::cache::{load_snapshot, save_snapshot, MovieCache};
use crate::config::Config;
use crate::extractor::{FanprojListingExtractor, KhaanFilmsExtractor};
use crate::fetcher::{Fetcher, PageFetcher};
use crate::metrics::BACKGROUND_FAILURES;
use crate::scanner::{ListingScanner, PageRange, ScanError, SitemapScanner, SourceScanner};

use super::types::{OrchestratorError, OrchestratorStatus, ScrapePlan, ScrapeState};

/// Drives the scrape lifecycle and owns the background passes.
pub struct ScrapeOrchestrator {
    cache: Arc<MovieCache>,
    primary: Arc<dyn SourceScanner>,
    secondary: Arc<dyn SourceScanner>,
    plan: ScrapePlan,
    snapshot_path: Option<PathBuf>,

    // Runtime state
    state: Arc<watch::Sender<ScrapeState>>,
    /// Guards loads; holds the reason the last fast pass failed.
    load_lock: Mutex<Option<String>>,
    failed_loads: AtomicU64,
    background_active: Arc<AtomicBool>,
}

impl std::fmt::Debug for ScrapeOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeOrchestrator")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .field("plan", &self.plan)
            .field("snapshot_path", &self.snapshot_path)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl ScrapeOrchestrator {
    /// Create an orchestrator over explicit scanners.
    pub fn new(
        cache: Arc<MovieCache>,
        primary: Arc<dyn SourceScanner>,
        secondary: Arc<dyn SourceScanner>,
        plan: ScrapePlan,
        snapshot_path: Option<PathBuf>,
    ) -> Self {
        let (state, _) = watch::channel(ScrapeState::Empty);
        Self {
            cache,
            primary,
            secondary,
            plan,
            snapshot_path,
            state: Arc::new(state),
            load_lock: Mutex::new(None),
            failed_loads: AtomicU64::new(0),
            background_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wire the listing and sitemap scanners from configuration.
    pub fn from_config(
        config: &Config,
        cache: Arc<MovieCache>,
        transport: Arc<dyn PageFetcher>,
    ) -> Self {
        let fetcher = Fetcher::new(transport, config.fetcher.backoff_base());

        let primary = ListingScanner::new(
            config.listing.clone(),
            config.scan.clone(),
            fetcher.clone(),
            config.fetcher.policy(config.listing.timeout_secs),
            Arc::new(FanprojListingExtractor::new(config.listing.name.clone())),
        );
        let secondary = SitemapScanner::new(
            config.sitemap.clone(),
            config.scan.clone(),
            fetcher,
            config.fetcher.policy(config.sitemap.index_timeout_secs),
            config.fetcher.policy(config.sitemap.document_timeout_secs),
            Arc::new(KhaanFilmsExtractor::new(config.sitemap.name.clone())),
        );

        let plan = ScrapePlan {
            fast_pass: config.listing.fast_pass_pages,
            primary_background: config.listing.background_pages,
            secondary: config.sitemap.pages,
        };
        let snapshot_path = config
            .snapshot
            .load_on_start
            .then(|| config.snapshot.path.clone());

        Self::new(
            cache,
            Arc::new(primary),
            Arc::new(secondary),
            plan,
            snapshot_path,
        )
    }

    pub fn cache(&self) -> &Arc<MovieCache> {
        &self.cache
    }

    pub fn state(&self) -> ScrapeState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ScrapeState> {
        self.state.subscribe()
    }

    pub async fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            state: self.state(),
            records: self.cache.len().await,
            background_active: self.background_active.load(Ordering::SeqCst),
        }
    }

    /// Populate the cache on first demand.
    ///
    /// Returns immediately once anything is loaded. Otherwise hydrates from
    /// the snapshot, or runs the fast pass and starts the background passes.
    /// Concurrent first callers share a single load, including its failure:
    /// callers queued behind a failed fast pass get that error instead of
    /// starting their own. Returns the cache size.
    pub async fn ensure_loaded(&self) -> Result<usize, OrchestratorError> {
        if self.state() != ScrapeState::Empty {
            return Ok(self.cache.len().await);
        }

        let seen_failures = self.failed_loads.load(Ordering::SeqCst);
        let mut last_failure = self.load_lock.lock().await;
        if self.state() != ScrapeState::Empty {
            return Ok(self.cache.len().await);
        }
        if self.failed_loads.load(Ordering::SeqCst) != seen_failures {
            if let Some(reason) = last_failure.as_ref() {
                return Err(OrchestratorError::FastPassFailed(reason.clone()));
            }
        }

        if let Some(path) = &self.snapshot_path {
            if let Some(count) = self.try_hydrate(path).await {
                return Ok(count);
            }
        }

        info!("Cache empty, starting fast pass");
        self.fast_pass(&mut last_failure).await
    }

    /// Force a re-scrape, bypassing the snapshot and the loaded check.
    ///
    /// New records are appended through the normal merge path. Returns the
    /// cache size after the fast pass.
    pub async fn refresh(&self) -> Result<usize, OrchestratorError> {
        let mut last_failure = self.load_lock.lock().await;
        info!("Forced refresh requested");
        self.fast_pass(&mut last_failure).await
    }

    /// Resolve once the state is `Ready` and no background run is active.
    ///
    /// Never resolves if nothing triggers a load.
    pub async fn wait_until_ready(&self) {
        let mut rx = self.state.subscribe();
        let active = Arc::clone(&self.background_active);
        let _ = rx
            .wait_for(|s| *s == ScrapeState::Ready && !active.load(Ordering::SeqCst))
            .await;
    }

    /// Persist the current cache contents. Returns the bytes written.
    pub async fn write_snapshot(&self, path: &Path) -> Result<u64, OrchestratorError> {
        let records = self.cache.snapshot().await;
        let bytes = save_snapshot(path, &records).await?;
        info!(path = %path.display(), records = records.len(), bytes = bytes, "Wrote snapshot");
        Ok(bytes)
    }

    async fn try_hydrate(&self, path: &Path) -> Option<usize> {
        match load_snapshot(path).await {
            Ok(Some(records)) if !records.is_empty() => {
                self.cache.hydrate(records).await;
                self.state.send_replace(ScrapeState::Ready);
                let count = self.cache.len().await;
                info!(records = count, "Serving from snapshot, scraping skipped");
                Some(count)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable snapshot");
                None
            }
        }
    }

    /// Caller holds `load_lock`; `last_failure` is its contents.
    async fn fast_pass(
        &self,
        last_failure: &mut Option<String>,
    ) -> Result<usize, OrchestratorError> {
        let report = match self.primary.scan(self.plan.fast_pass).await {
            Ok(report) => report,
            Err(e) => {
                let reason = e.to_string();
                *last_failure = Some(reason.clone());
                self.failed_loads.fetch_add(1, Ordering::SeqCst);
                return Err(OrchestratorError::FastPassFailed(reason));
            }
        };

        let admitted = self.cache.merge(report.records).await;
        let total = self.cache.len().await;
        info!(
            source = self.primary.name(),
            admitted = admitted,
            total = total,
            "Fast pass complete"
        );

        self.launch_background();
        Ok(total)
    }

    /// Start both background passes unless a run is already active.
    ///
    /// `Ready` is never left once reached; a re-run is tracked by
    /// `background_active` alone.
    fn launch_background(&self) {
        if self.background_active.swap(true, Ordering::SeqCst) {
            info!("Background scrape already running");
            return;
        }
        self.state.send_if_modified(|s| {
            if *s == ScrapeState::Empty {
                *s = ScrapeState::PartiallyReady;
                true
            } else {
                false
            }
        });

        let cache = Arc::clone(&self.cache);
        let primary = Arc::clone(&self.primary);
        let secondary = Arc::clone(&self.secondary);
        let plan = self.plan;
        let state = Arc::clone(&self.state);
        let active = Arc::clone(&self.background_active);

        tokio::spawn(async move {
            info!("Starting background scrapes");
            let first_name = primary.name().to_string();
            let second_name = secondary.name().to_string();
            let first = tokio::spawn(background_pass(
                primary,
                plan.primary_background,
                Arc::clone(&cache),
            ));
            let second = tokio::spawn(background_pass(
                secondary,
                plan.secondary,
                Arc::clone(&cache),
            ));

            // All settled: neither outcome blocks the other.
            let (first, second) = futures::future::join(first, second).await;

            for (name, outcome) in [(first_name, first), (second_name, second)] {
                match outcome {
                    Ok(Ok(admitted)) => {
                        info!(source = %name, admitted = admitted, "Background pass merged");
                    }
                    Ok(Err(e)) => {
                        warn!(source = %name, error = %e, "Background pass failed");
                        BACKGROUND_FAILURES.with_label_values(&[name.as_str()]).inc();
                    }
                    Err(e) => {
                        error!(source = %name, error = %e, "Background pass panicked");
                        BACKGROUND_FAILURES.with_label_values(&[name.as_str()]).inc();
                    }
                }
            }

            // Ready and the cleared flag become visible to waiters together.
            state.send_modify(|s| {
                *s = ScrapeState::Ready;
                active.store(false, Ordering::SeqCst);
            });
            let total = cache.len().await;
            info!(total = total, "All background scrapes settled");
        });
    }
}

/// Scan one source and merge whatever it produced.
async fn background_pass(
    scanner: Arc<dyn SourceScanner>,
    range: PageRange,
    cache: Arc<MovieCache>,
) -> Result<usize, ScanError> {
    let report = scanner.scan(range).await?;
    Ok(cache.merge(report.records).await)
}
