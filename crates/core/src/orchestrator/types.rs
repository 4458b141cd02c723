//! Types for the scrape orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::cache::SnapshotError;
use crate::scanner::PageRange;

/// Errors surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No fast-pass page could be fetched.
    #[error("initial scrape failed: {0}")]
    FastPassFailed(String),

    /// Snapshot file could not be written.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Lifecycle of the cache contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeState {
    /// Nothing loaded yet.
    Empty,
    /// Fast pass merged; background passes still running.
    PartiallyReady,
    /// Snapshot hydrated or every background pass settled.
    Ready,
}

impl fmt::Display for ScrapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeState::Empty => write!(f, "empty"),
            ScrapeState::PartiallyReady => write!(f, "partially_ready"),
            ScrapeState::Ready => write!(f, "ready"),
        }
    }
}

/// Page ranges for each pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapePlan {
    /// Primary source pages scanned synchronously.
    pub fast_pass: PageRange,
    /// Primary source pages scanned in the background.
    pub primary_background: PageRange,
    /// Secondary source pages scanned in the background.
    pub secondary: PageRange,
}

impl Default for ScrapePlan {
    fn default() -> Self {
        Self {
            fast_pass: PageRange::new(1, 2),
            primary_background: PageRange::new(3, 100),
            secondary: PageRange::new(1, 2),
        }
    }
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    pub state: ScrapeState,
    /// Number of records in the cache.
    pub records: usize,
    /// Whether background passes are still running.
    pub background_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&ScrapeState::PartiallyReady).unwrap(),
            "\"partially_ready\""
        );
        assert_eq!(ScrapeState::Ready.to_string(), "ready");
    }
}
