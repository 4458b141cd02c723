//! Merge/dedup engine.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::metrics::{CACHE_SIZE, RECORDS_ADMITTED, RECORDS_DUPLICATE};
use crate::movie::{MovieDraft, MovieRecord};

use super::MovieCache;

impl MovieCache {
    /// Admit every draft whose identity key is not cached yet.
    ///
    /// Each admitted draft takes the next id from the cache-wide counter.
    /// Returns the number admitted. Merging the same drafts again admits none.
    pub async fn merge(&self, drafts: Vec<MovieDraft>) -> usize {
        let mut inner = self.inner.write().await;
        let mut admitted = 0;

        for draft in drafts {
            if inner.index.contains(draft.identity_key()) {
                RECORDS_DUPLICATE
                    .with_label_values(&[draft.source.as_str()])
                    .inc();
                continue;
            }

            let id = inner.next_id;
            inner.next_id += 1;
            inner.index.insert(draft.identity_key().to_string());
            RECORDS_ADMITTED
                .with_label_values(&[draft.source.as_str()])
                .inc();
            inner.records.push(draft.admit(id));
            admitted += 1;
        }

        CACHE_SIZE.set(inner.records.len() as i64);
        debug!(admitted = admitted, total = inner.records.len(), "Merged drafts");
        admitted
    }

    /// Load previously persisted records into the cache.
    ///
    /// Duplicate links are dropped. Ids that are positive and unique are
    /// kept; the rest are reassigned after the current maximum. The counter
    /// continues at `max(id) + 1`. Returns the number of records loaded.
    pub async fn hydrate(&self, records: Vec<MovieRecord>) -> usize {
        let mut inner = self.inner.write().await;

        let mut max_id = inner.records.iter().map(|r| r.id).max().unwrap_or(0);
        let mut used_ids: HashSet<u64> = inner.records.iter().map(|r| r.id).collect();
        let mut reassign = 0;
        let mut loaded = 0;

        for record in records {
            if inner.index.contains(&record.identity_key) {
                continue;
            }
            let mut record = record.normalize();
            inner.index.insert(record.identity_key.clone());

            if record.id > 0 && used_ids.insert(record.id) {
                max_id = max_id.max(record.id);
            } else {
                // Assigned once every kept id is known.
                record.id = 0;
                reassign += 1;
            }
            inner.records.push(record);
            loaded += 1;
        }

        if reassign > 0 {
            warn!(
                count = reassign,
                "Snapshot contained missing or duplicate ids, reassigning"
            );
            for record in inner.records.iter_mut().filter(|r| r.id == 0) {
                max_id += 1;
                record.id = max_id;
            }
        }

        inner.next_id = inner.next_id.max(max_id + 1);
        CACHE_SIZE.set(inner.records.len() as i64);
        info!(loaded = loaded, next_id = inner.next_id, "Hydrated cache");
        loaded
    }
}
