//! Scanner types and the source trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::movie::MovieDraft;

/// Inclusive range of page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Iterate page numbers in order. Empty when `start > end`.
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Everything one scan produced.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Source name.
    pub source: String,
    /// Drafts in batch order.
    pub records: Vec<MovieDraft>,
    /// Listing or sitemap pages requested.
    pub pages_attempted: usize,
    /// Listing or sitemap pages that could not be fetched.
    pub pages_failed: usize,
    /// Documents or cards that contributed nothing.
    pub documents_skipped: usize,
    /// Stopped before the end of the range after too many empty batches.
    pub stopped_early: bool,
}

/// Errors that end a scan without results.
#[derive(Debug, Clone, Error)]
pub enum ScanError {
    /// Every listing or sitemap page in the range failed.
    #[error("source {source_name} unreachable: all {attempted} page(s) failed, last error: {last_error}")]
    SourceUnreachable {
        source_name: String,
        attempted: usize,
        last_error: String,
    },
}

/// Scans one source over a page range.
///
/// Implementations swallow per-document failures; only a source with no
/// reachable pages at all is an error.
#[async_trait]
pub trait SourceScanner: Send + Sync {
    /// Source name, used for logging and metrics.
    fn name(&self) -> &str;

    async fn scan(&self, range: PageRange) -> Result<ScanReport, ScanError>;
}
