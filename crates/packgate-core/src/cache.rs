//! One-time pack loading shared by all requests
//!
//! The artifact on disk is static for the lifetime of the process, so it is
//! parsed exactly once. The memoized result is shared by every caller -
//! including a load failure, which poisons the cache until restart.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::CoreError;
use crate::pack::LoadedPack;

/// Process-lifetime cache around the pack artifact.
///
/// Owned by the service's startup state and handed to each request. Under
/// concurrent first access exactly one caller performs the load; everyone
/// else waits on the cell and shares the completed result.
#[derive(Debug)]
pub struct PackCache {
    path: PathBuf,
    cell: OnceCell<Result<Arc<LoadedPack>, Arc<CoreError>>>,
}

impl PackCache {
    /// Create a cache for the artifact at `path`. Nothing is read until the
    /// first `get`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    /// Path of the underlying artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the loaded pack, reading the artifact at most once per process.
    pub async fn get(&self) -> Result<Arc<LoadedPack>, Arc<CoreError>> {
        self.cell
            .get_or_init(|| async {
                LoadedPack::from_archive(&self.path)
                    .map(Arc::new)
                    .map_err(Arc::new)
            })
            .await
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_challenge_pack;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_concurrent_first_access_shares_one_load() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("challenge.tgz");
        write_challenge_pack(&artifact);

        let cache = Arc::new(PackCache::new(&artifact));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move { cache.get().await }));
        }

        let mut packs = Vec::new();
        for handle in handles {
            packs.push(handle.await.unwrap().unwrap());
        }

        // Every caller observes the identical instance.
        for pack in &packs {
            assert!(Arc::ptr_eq(pack, &packs[0]));
        }
    }

    #[tokio::test]
    async fn test_artifact_read_only_once() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("challenge.tgz");
        write_challenge_pack(&artifact);

        let cache = PackCache::new(&artifact);
        cache.get().await.unwrap();

        // The artifact is gone, but the cached pack keeps serving.
        std::fs::remove_file(&artifact).unwrap();
        let pack = cache.get().await.unwrap();
        assert_eq!(pack.pack.metadata.name, "challenge");
    }

    #[tokio::test]
    async fn test_load_failure_is_cached() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("challenge.tgz");

        let cache = PackCache::new(&artifact);
        assert!(cache.get().await.is_err());

        // Even after the artifact appears, the first result sticks
        // until the process restarts.
        write_challenge_pack(&artifact);
        assert!(cache.get().await.is_err());
    }
}
