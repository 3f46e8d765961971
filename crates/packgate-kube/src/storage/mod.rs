//! Storage drivers for persisting release records
//!
//! packgate keeps one record per release and supports multiple backends:
//! - **Secrets** (default): releases in Kubernetes Secrets
//! - **ConfigMaps**: releases in ConfigMaps (less secure, more accessible)
//! - **Mock**: in-memory, for tests
//!
//! Records are stored as gzip-compressed JSON, base64-encoded into the
//! backing object.

mod configmap;
mod mock;
mod secrets;

pub use configmap::ConfigMapDriver;
pub use mock::{MockStorageDriver, OperationCounts};
pub use secrets::SecretsDriver;

use std::collections::BTreeMap;
use std::io::{Read, Write};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{KubeError, Result};
use crate::release::StoredRelease;

/// Storage driver trait for release persistence
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Get the record for a release
    async fn get(&self, namespace: &str, name: &str) -> Result<StoredRelease>;

    /// Create a new release record
    async fn create(&self, release: &StoredRelease) -> Result<()>;

    /// Replace an existing release record
    async fn update(&self, release: &StoredRelease) -> Result<()>;

    /// Delete a release record, returning what was stored
    async fn delete(&self, namespace: &str, name: &str) -> Result<StoredRelease>;

    /// Check if a release record exists
    async fn exists(&self, namespace: &str, name: &str) -> Result<bool> {
        match self.get(namespace, name).await {
            Ok(_) => Ok(true),
            Err(KubeError::ReleaseNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl StorageDriver for Box<dyn StorageDriver> {
    async fn get(&self, namespace: &str, name: &str) -> Result<StoredRelease> {
        (**self).get(namespace, name).await
    }

    async fn create(&self, release: &StoredRelease) -> Result<()> {
        (**self).create(release).await
    }

    async fn update(&self, release: &StoredRelease) -> Result<()> {
        (**self).update(release).await
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<StoredRelease> {
        (**self).delete(namespace, name).await
    }
}

/// Encode a release for storage (JSON + gzip + base64)
pub fn encode_release(release: &StoredRelease) -> Result<String> {
    let json = serde_json::to_vec(release).map_err(|e| KubeError::Serialization(e.to_string()))?;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| KubeError::Compression(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| KubeError::Compression(e.to_string()))?;

    Ok(BASE64.encode(compressed))
}

/// Decode a release from storage (base64 + gunzip + JSON)
pub fn decode_release(data: &str) -> Result<StoredRelease> {
    let compressed = BASE64
        .decode(data)
        .map_err(|e| KubeError::Serialization(format!("base64 decode error: {e}")))?;

    let mut decoder = flate2::read::GzDecoder::new(compressed.as_slice());
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| KubeError::Compression(e.to_string()))?;

    serde_json::from_slice(&json).map_err(|e| KubeError::Serialization(e.to_string()))
}

/// Labels applied to all storage objects
pub fn storage_labels(release: &StoredRelease) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        "packgate".to_string(),
    );
    labels.insert(
        "packgate.io/release-name".to_string(),
        release.name.clone(),
    );
    labels.insert(
        "packgate.io/release-namespace".to_string(),
        release.namespace.clone(),
    );
    labels
}
