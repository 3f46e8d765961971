//! Kubernetes ConfigMap storage driver
//!
//! Same layout as the Secrets driver but backed by ConfigMaps, selected with
//! `PACKGATE_DRIVER=configmaps`. Release payloads are readable by anyone who
//! can read ConfigMaps in the namespace.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Client;
use kube::api::{Api, DeleteParams, PostParams};

use super::{StorageDriver, decode_release, encode_release, storage_labels};
use crate::error::{KubeError, Result};
use crate::release::{StoredRelease, storage_key};

/// Kubernetes ConfigMap storage driver
pub struct ConfigMapDriver {
    client: Client,
}

impl ConfigMapDriver {
    /// Create with an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn configmaps_api(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn build_configmap(&self, release: &StoredRelease, encoded: &str) -> ConfigMap {
        let mut labels = storage_labels(release);
        labels.insert(
            "packgate.io/storage-driver".to_string(),
            "configmaps".to_string(),
        );

        let mut data = std::collections::BTreeMap::new();
        data.insert("release".to_string(), encoded.to_string());

        ConfigMap {
            metadata: ObjectMeta {
                name: Some(release.storage_key()),
                namespace: Some(release.namespace.clone()),
                labels: Some(labels),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        }
    }

    fn parse_configmap(&self, cm: &ConfigMap) -> Result<StoredRelease> {
        let encoded = cm
            .data
            .as_ref()
            .and_then(|d| d.get("release"))
            .ok_or_else(|| KubeError::Storage("ConfigMap missing 'release' data".to_string()))?;

        decode_release(encoded)
    }
}

#[async_trait]
impl StorageDriver for ConfigMapDriver {
    async fn get(&self, namespace: &str, name: &str) -> Result<StoredRelease> {
        let api = self.configmaps_api(namespace);

        match api.get(&storage_key(name)).await {
            Ok(cm) => self.parse_configmap(&cm),
            Err(kube::Error::Api(e)) if e.code == 404 => Err(KubeError::ReleaseNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, release: &StoredRelease) -> Result<()> {
        let api = self.configmaps_api(&release.namespace);

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
        let cm = self.build_configmap(release, &encoded);
        api.create(&PostParams::default(), &cm).await?;

        Ok(())
    }

    async fn update(&self, release: &StoredRelease) -> Result<()> {
        let api = self.configmaps_api(&release.namespace);
        let key = release.storage_key();

        let encoded = encode_release(release)?;
        let mut cm = self.build_configmap(release, &encoded);

        let existing = api.get(&key).await.map_err(|e| match e {
            kube::Error::Api(ref resp) if resp.code == 404 => KubeError::ReleaseNotFound {
                name: release.name.clone(),
                namespace: release.namespace.clone(),
            },
            e => e.into(),
        })?;
        cm.metadata.resource_version = existing.metadata.resource_version;

        api.replace(&key, &PostParams::default(), &cm).await?;

        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<StoredRelease> {
        let release = self.get(namespace, name).await?;

        let api = self.configmaps_api(namespace);
        api.delete(&storage_key(name), &DeleteParams::default())
            .await?;

        Ok(release)
    }
}
