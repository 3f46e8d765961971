//! Kubernetes Secrets storage driver
//!
//! The default driver, storing each release record in a Secret named
//! `gate.packgate.release.v1.<name>` in the release's namespace.

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Client;
use kube::api::{Api, DeleteParams, PostParams};

use super::{StorageDriver, decode_release, encode_release, storage_labels};
use crate::error::{KubeError, Result};
use crate::release::{StoredRelease, storage_key};

/// Kubernetes Secrets storage driver
pub struct SecretsDriver {
    client: Client,
}

impl SecretsDriver {
    /// Create with an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn secrets_api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn build_secret(&self, release: &StoredRelease, encoded: &str) -> Secret {
        let mut labels = storage_labels(release);
        labels.insert(
            "packgate.io/storage-driver".to_string(),
            "secrets".to_string(),
        );

        let mut data = BTreeMap::new();
        data.insert(
            "release".to_string(),
            k8s_openapi::ByteString(encoded.as_bytes().to_vec()),
        );

        Secret {
            metadata: ObjectMeta {
                name: Some(release.storage_key()),
                namespace: Some(release.namespace.clone()),
                labels: Some(labels),
                ..Default::default()
            },
            type_: Some("packgate.io/release.v1".to_string()),
            data: Some(data),
            ..Default::default()
        }
    }

    fn parse_secret(&self, secret: &Secret) -> Result<StoredRelease> {
        let data = secret
            .data
            .as_ref()
            .and_then(|d| d.get("release"))
            .ok_or_else(|| KubeError::Storage("Secret missing 'release' data".to_string()))?;

        let encoded = String::from_utf8(data.0.clone())
            .map_err(|e| KubeError::Storage(format!("invalid UTF-8 in secret: {e}")))?;

        decode_release(&encoded)
    }
}

#[async_trait]
impl StorageDriver for SecretsDriver {
    async fn get(&self, namespace: &str, name: &str) -> Result<StoredRelease> {
        let api = self.secrets_api(namespace);

        match api.get(&storage_key(name)).await {
            Ok(secret) => self.parse_secret(&secret),
            Err(kube::Error::Api(e)) if e.code == 404 => Err(KubeError::ReleaseNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, release: &StoredRelease) -> Result<()> {
        let api = self.secrets_api(&release.namespace);

        match api.get(&release.storage_key()).await {
            Ok(_) => {
                return Err(KubeError::ReleaseAlreadyExists {
                    name: release.name.clone(),
                    namespace: release.namespace.clone(),
                });
            }
            Err(kube::Error::Api(e)) if e.code == 404 => {}
            Err(e) => return Err(e.into()),
        }

        let encoded = encode_release(release)?;
        let secret = self.build_secret(release, &encoded);
        api.create(&PostParams::default(), &secret).await?;

        Ok(())
    }

    async fn update(&self, release: &StoredRelease) -> Result<()> {
        let api = self.secrets_api(&release.namespace);
        let key = release.storage_key();

        let encoded = encode_release(release)?;
        let mut secret = self.build_secret(release, &encoded);

        // replace() needs the current resourceVersion
        let existing = api.get(&key).await.map_err(|e| match e {
            kube::Error::Api(ref resp) if resp.code == 404 => KubeError::ReleaseNotFound {
                name: release.name.clone(),
                namespace: release.namespace.clone(),
            },
            e => e.into(),
        })?;
        secret.metadata.resource_version = existing.metadata.resource_version;

        api.replace(&key, &PostParams::default(), &secret).await?;

        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<StoredRelease> {
        let release = self.get(namespace, name).await?;

        let api = self.secrets_api(namespace);
        api.delete(&storage_key(name), &DeleteParams::default())
            .await?;

        Ok(release)
    }
}
