//! Compiled index snapshots.
//!
//! A snapshot is a validated [`IndexTable`] encoded with postcard together with the
//! digest of the sources it was built from. Loading one skips source parsing while
//! the documentation has not been regenerated; the table is still rebuilt through
//! [`IndexStore::build`](crate::search::IndexStore::build), so a snapshot can never
//! publish an index the sources would have rejected.

use crate::error::SnapshotError;
use crate::search::IndexTable;
use postcard::{from_bytes, to_stdvec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bumped whenever the encoded layout changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: u32,
    pub source_digest: u64,
    pub table: IndexTable,
}

impl Snapshot {
    pub fn new(source_digest: u64, table: IndexTable) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            source_digest,
            table,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(to_stdvec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = from_bytes(bytes)?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Reads a snapshot file.
    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = std::fs::read(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes)
    }

    /// Writes a snapshot file, replacing any existing one.
    pub fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        let bytes = self.encode()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SnapshotError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, bytes).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Loads the cached table if it was built from sources with `digest`.
///
/// Stale or unreadable snapshots are deleted so the next store starts clean.
pub async fn load(path: &Path, digest: u64) -> Option<IndexTable> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return None;
    }

    let path = path.to_path_buf();
    // Decode in spawn_blocking since it's CPU intensive
    tokio::task::spawn_blocking(move || match Snapshot::read(&path) {
        Ok(snapshot) if snapshot.source_digest == digest => {
            tracing::debug!("Using snapshot at {} (sources unchanged)", path.display());
            Some(snapshot.table)
        }
        Ok(_) => {
            tracing::info!(
                "Snapshot stale, will rebuild index (file: {})",
                path.display()
            );
            let _ = std::fs::remove_file(&path);
            None
        }
        Err(e) => {
            tracing::warn!("Discarding unreadable snapshot at {}: {}", path.display(), e);
            let _ = std::fs::remove_file(&path);
            None
        }
    })
    .await
    .ok()
    .flatten()
}

/// Stores a snapshot unless another process already wrote one.
pub async fn store(path: &Path, snapshot: Snapshot) {
    let path = path.to_path_buf();

    // Serialize in spawn_blocking since it's CPU intensive
    let result = tokio::task::spawn_blocking(move || {
        let bytes = match snapshot.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to encode snapshot: {}", e);
                return;
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!("Failed to create snapshot directory {}: {}", parent.display(), e);
            return;
        }

        match std::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
        {
            Ok(mut file) => {
                if let Err(e) = std::io::Write::write_all(&mut file, &bytes) {
                    tracing::warn!("Failed to write snapshot to {}: {}", path.display(), e);
                    let _ = std::fs::remove_file(&path);
                } else {
                    tracing::debug!("Cached symbol index snapshot to {}", path.display());
                }
            }
            Err(e) if e.kind() != std::io::ErrorKind::AlreadyExists => {
                tracing::warn!("Failed to create snapshot file {}: {}", path.display(), e);
            }
            _ => {
                // Already exists, another process may have created it
                tracing::debug!("Snapshot already exists at {}", path.display());
            }
        }
    })
    .await;

    if let Err(e) = result {
        tracing::error!("Snapshot store task failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SymbolRecord;
    use assert2::{check, let_assert};
    use tempfile::TempDir;

    fn table() -> IndexTable {
        let mut table = IndexTable::default();
        table.push(
            "packarray",
            vec![
                SymbolRecord::new("packArray", "Cajita::Halo", "h.html#a1").with_signature("(int)"),
                SymbolRecord::new("packArray", "Cajita::Halo", "h.html#a2"),
            ],
        );
        table
    }

    #[test]
    fn test_encode_decode() {
        let snapshot = Snapshot::new(42, table());
        let decoded = Snapshot::decode(&snapshot.encode().unwrap()).unwrap();
        check!(decoded == snapshot);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut snapshot = Snapshot::new(42, table());
        snapshot.format_version = SNAPSHOT_FORMAT_VERSION + 1;
        let bytes = snapshot.encode().unwrap();
        let_assert!(Err(SnapshotError::Version { .. }) = Snapshot::decode(&bytes));
    }

    #[tokio::test]
    async fn test_load_matching_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.snap");
        store(&path, Snapshot::new(7, table())).await;

        check!(load(&path, 7).await == Some(table()));
    }

    #[tokio::test]
    async fn test_stale_snapshot_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.snap");
        Snapshot::new(7, table()).write(&path).unwrap();

        check!(load(&path, 8).await.is_none());
        check!(!path.exists());
    }

    #[tokio::test]
    async fn test_garbage_snapshot_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.snap");
        std::fs::write(&path, b"\xff\xff\xff").unwrap();

        check!(load(&path, 7).await.is_none());
        check!(!path.exists());
    }
}
