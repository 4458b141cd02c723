//! Shared movie cache.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

use crate::movie::MovieRecord;

#[derive(Debug, Default)]
pub(super) struct CacheInner {
    /// Records in admission order.
    pub(super) records: Vec<MovieRecord>,
    /// Identity keys of `records`.
    pub(super) index: HashSet<String>,
    /// Id given to the next admitted record.
    pub(super) next_id: u64,
}

/// Process-wide store of admitted records.
///
/// Readers get cloned snapshots; the merge engine is the only writer. One
/// lock covers check-identity, assign-id and append.
#[derive(Debug)]
pub struct MovieCache {
    pub(super) inner: RwLock<CacheInner>,
}

/// The categories payload: every record under `All`, plus one list per
/// category that has at least one record.
#[derive(Debug, Clone, Serialize)]
pub struct CategorizedMovies {
    #[serde(rename = "All")]
    pub all: Vec<MovieRecord>,
    #[serde(flatten)]
    pub by_category: BTreeMap<String, Vec<MovieRecord>>,
}

impl Default for MovieCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MovieCache {
    /// Create an empty cache. The first admitted record gets id 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }

    /// Clone of every record in admission order.
    pub async fn snapshot(&self) -> Vec<MovieRecord> {
        self.inner.read().await.records.clone()
    }

    pub async fn contains(&self, identity_key: &str) -> bool {
        self.inner.read().await.index.contains(identity_key)
    }

    /// Id the next admitted record will receive.
    pub async fn next_id(&self) -> u64 {
        self.inner.read().await.next_id
    }

    /// Group records by category in a single pass.
    pub async fn categorized(&self) -> CategorizedMovies {
        let records = self.snapshot().await;
        let mut by_category: BTreeMap<String, Vec<MovieRecord>> = BTreeMap::new();
        for record in &records {
            by_category
                .entry(record.category.as_str().to_string())
                .or_default()
                .push(record.clone());
        }
        CategorizedMovies {
            all: records,
            by_category,
        }
    }
}
