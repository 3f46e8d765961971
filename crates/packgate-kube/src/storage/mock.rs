//! Mock storage driver for testing
//!
//! Stores release records in memory, so release-lifecycle behavior can be
//! exercised without a Kubernetes cluster.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::StorageDriver;
use crate::error::{KubeError, Result};
use crate::release::StoredRelease;

/// In-memory storage driver for testing
#[derive(Clone, Default)]
pub struct MockStorageDriver {
    /// Storage: (namespace, name) -> release
    store: Arc<RwLock<HashMap<(String, String), StoredRelease>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub gets: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl MockStorageDriver {
    /// Create a new empty mock driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated releases
    pub fn with_releases(releases: Vec<StoredRelease>) -> Self {
        let driver = Self::new();
        {
            let mut store = driver.store.write().unwrap();
            for release in releases {
                store.insert((release.namespace.clone(), release.name.clone()), release);
            }
        }
        driver
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Get all releases (for testing)
    pub fn all_releases(&self) -> Vec<StoredRelease> {
        self.store.read().unwrap().values().cloned().collect()
    }

    /// Count stored releases
    pub fn release_count(&self) -> usize {
        self.store.read().unwrap().len()
    }
}

#[async_trait]
impl StorageDriver for MockStorageDriver {
    async fn get(&self, namespace: &str, name: &str) -> Result<StoredRelease> {
        self.operations.write().unwrap().gets += 1;

        let store = self.store.read().unwrap();
        store
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| KubeError::ReleaseNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }

    async fn create(&self, release: &StoredRelease) -> Result<()> {
        self.operations.write().unwrap().creates += 1;

        let mut store = self.store.write().unwrap();
        let key = (release.namespace.clone(), release.name.clone());
        if store.contains_key(&key) {
            return Err(KubeError::ReleaseAlreadyExists {
                name: release.name.clone(),
                namespace: release.namespace.clone(),
            });
        }
        store.insert(key, release.clone());
        Ok(())
    }

    async fn update(&self, release: &StoredRelease) -> Result<()> {
        self.operations.write().unwrap().updates += 1;

        let mut store = self.store.write().unwrap();
        let key = (release.namespace.clone(), release.name.clone());
        if !store.contains_key(&key) {
            return Err(KubeError::ReleaseNotFound {
                name: release.name.clone(),
                namespace: release.namespace.clone(),
            });
        }
        store.insert(key, release.clone());
        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<StoredRelease> {
        self.operations.write().unwrap().deletes += 1;

        let mut store = self.store.write().unwrap();
        store
            .remove(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| KubeError::ReleaseNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }
}
