//! Snapshot file persistence.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::movie::MovieRecord;

/// Version written by `save_snapshot`.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors reading or writing a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    movies: &'a [MovieRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotIn {
    Versioned { version: u32, movies: Vec<MovieRecord> },
    Legacy(Vec<MovieRecord>),
}

/// Read a snapshot file.
///
/// Returns `Ok(None)` when the file does not exist. Accepts the versioned
/// object form and the legacy bare array.
pub async fn load_snapshot(path: &Path) -> Result<Option<Vec<MovieRecord>>, SnapshotError> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SnapshotError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let parsed: SnapshotIn = serde_json::from_slice(&data).map_err(|e| SnapshotError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    let movies = match parsed {
        SnapshotIn::Versioned { version, movies } => {
            if version != SNAPSHOT_VERSION {
                return Err(SnapshotError::UnsupportedVersion(version));
            }
            movies
        }
        SnapshotIn::Legacy(movies) => movies,
    };

    info!(path = %path.display(), records = movies.len(), "Loaded snapshot");
    Ok(Some(movies))
}

/// Write `records` to `path` via a sibling temp file and rename.
///
/// Returns the number of bytes written.
pub async fn save_snapshot(path: &Path, records: &[MovieRecord]) -> Result<u64, SnapshotError> {
    let io_err = |source: io::Error| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec_pretty(&SnapshotOut {
        version: SNAPSHOT_VERSION,
        movies: records,
    })
    .map_err(|e| SnapshotError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;

    Ok(json.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movie::MovieDraft;
    use tempfile::TempDir;

    fn records() -> Vec<MovieRecord> {
        (1..=3)
            .map(|n| {
                MovieDraft::new(format!("M{}", n), format!("https://x/{}.html", n), "src")
                    .admit(n)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let result = load_snapshot(&dir.path().join("absent.json")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("movies.json");

        let bytes = save_snapshot(&path, &records()).await.unwrap();
        assert!(bytes > 0);
        assert!(!dir.path().join("nested").join("movies.json.tmp").exists());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["movies"][0]["link"], "https://x/1.html");

        let loaded = load_snapshot(&path).await.unwrap().unwrap();
        assert_eq!(loaded, records());
    }

    #[tokio::test]
    async fn test_loads_legacy_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movies.json");
        std::fs::write(
            &path,
            r#"[{"id":1,"title":"Old","link":"https://x/old.html","thumbnail":"t",
                "year":2020,"category":"Comedy","genres":["Comedy"],"rating":4.5,
                "imdbRating":null,"description":"","quality":"HD","duration":null,
                "isNew":false,"source":"fanproj.net"}]"#,
        )
        .unwrap();

        let loaded = load_snapshot(&path).await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].identity_key, "https://x/old.html");
    }

    #[tokio::test]
    async fn test_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movies.json");
        std::fs::write(&path, r#"{"version": 7, "movies": []}"#).unwrap();

        let result = load_snapshot(&path).await;
        assert!(matches!(result, Err(SnapshotError::UnsupportedVersion(7))));
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movies.json");
        std::fs::write(&path, "not json").unwrap();

        let result = load_snapshot(&path).await;
        assert!(matches!(result, Err(SnapshotError::Json { .. })));
    }
}
