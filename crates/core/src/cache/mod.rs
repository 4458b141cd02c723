//! Shared movie cache, merge engine and snapshot persistence.
//!
//! The cache is an explicit object handed to the orchestrator and the API
//! by `Arc`. Invariants that hold after every call:
//!
//! - no two records share an identity key
//! - ids are unique and each admitted record's id is higher than every id
//!   admitted before it
//! - records are never modified or removed once admitted

mod merge;
mod snapshot;
mod store;

pub use snapshot::{load_snapshot, save_snapshot, SnapshotError, SNAPSHOT_VERSION};
pub use store::{CategorizedMovies, MovieCache};
