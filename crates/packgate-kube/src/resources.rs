//! Kubernetes resource operations for applying and deleting manifests
//!
//! Applies rendered manifests the way `kubectl apply -f` would, using
//! Server-Side Apply against dynamically discovered resource types, and
//! deletes them in reverse dependency order.

use async_trait::async_trait;
use kube::{
    Client,
    api::{Api, DeleteParams, DynamicObject, Patch, PatchParams},
    core::{GroupVersionKind, TypeMeta},
    discovery::{ApiCapabilities, ApiResource, Discovery, Scope},
};

use crate::error::{KubeError, Result};

/// Field manager name for Server-Side Apply
const FIELD_MANAGER: &str = "packgate";

/// How a manifest application or deletion went, resource by resource
#[derive(Debug, Clone, Default)]
pub struct OperationSummary {
    /// Successfully processed resources
    pub succeeded: Vec<String>,
    /// Failed resources with errors
    pub failed: Vec<(String, String)>,
    /// Skipped resources (e.g. already deleted)
    pub skipped: Vec<(String, String)>,
}

impl OperationSummary {
    /// Check if all operations succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Join failure messages for error reporting
    pub fn failure_message(&self) -> String {
        self.failed
            .iter()
            .map(|(name, err)| format!("{name}: {err}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Applies and deletes rendered manifests against a cluster
///
/// This is the seam between the release client and the control plane, so the
/// release lifecycle can be exercised in tests without a cluster.
#[async_trait]
pub trait ManifestApplier: Send + Sync {
    /// Apply a multi-document manifest; namespaced resources without an
    /// explicit namespace land in `namespace`.
    async fn apply(&self, namespace: &str, manifest: &str) -> Result<()>;

    /// Delete every resource of a multi-document manifest.
    async fn delete(&self, namespace: &str, manifest: &str) -> Result<()>;
}

/// Parsed resource ready for Kubernetes operations
struct ParsedResource {
    obj: DynamicObject,
    gvk: GroupVersionKind,
    api_resource: ApiResource,
    capabilities: ApiCapabilities,
}

impl ParsedResource {
    fn display_name(&self) -> String {
        let name = self.obj.metadata.name.as_deref().unwrap_or("unnamed");
        match &self.obj.metadata.namespace {
            Some(ns) => format!("{}/{}/{}", ns, self.gvk.kind, name),
            None => format!("{}/{}", self.gvk.kind, name),
        }
    }
}

/// Resource manager for applying and deleting Kubernetes resources
pub struct ResourceManager {
    client: Client,
    discovery: Discovery,
}

impl ResourceManager {
    /// Create a new ResourceManager, running API discovery once
    pub async fn new(client: Client) -> Result<Self> {
        let discovery = Discovery::new(client.clone())
            .run()
            .await
            .map_err(KubeError::Api)?;

        Ok(Self { client, discovery })
    }

    /// Parse a multi-document YAML manifest
    fn parse_manifest(&self, manifest: &str, default_namespace: &str) -> Result<Vec<ParsedResource>> {
        let mut resources = Vec::new();

        for (index, doc) in manifest.split("\n---").enumerate() {
            let doc = doc.trim();
            if doc.is_empty()
                || doc
                    .lines()
                    .all(|l| l.trim().is_empty() || l.trim().starts_with('#'))
            {
                continue;
            }

            match self.parse_single_document(doc, default_namespace) {
                Ok(resource) => resources.push(resource),
                Err(e) => {
                    return Err(KubeError::InvalidManifest(format!(
                        "failed to parse document {index}: {e}"
                    )));
                }
            }
        }

        Ok(resources)
    }

    fn parse_single_document(&self, doc: &str, default_namespace: &str) -> Result<ParsedResource> {
        let mut obj: DynamicObject = serde_yaml::from_str(doc)
            .map_err(|e| KubeError::InvalidManifest(format!("YAML parse error: {e}")))?;

        let type_meta = obj
            .types
            .as_ref()
            .ok_or_else(|| KubeError::InvalidManifest("resource missing apiVersion or kind".to_string()))?;

        let gvk = gvk_from_type_meta(type_meta);

        let (api_resource, capabilities) = self.discovery.resolve_gvk(&gvk).ok_or_else(|| {
            KubeError::InvalidManifest(format!(
                "unknown resource type: {}/{}",
                type_meta.api_version, type_meta.kind
            ))
        })?;

        if capabilities.scope == Scope::Namespaced && obj.metadata.namespace.is_none() {
            obj.metadata.namespace = Some(default_namespace.to_string());
        }

        Ok(ParsedResource {
            obj,
            gvk,
            api_resource,
            capabilities,
        })
    }

    async fn apply_resources(&self, resources: &[ParsedResource]) -> OperationSummary {
        let mut summary = OperationSummary::default();

        let mut sorted: Vec<&ParsedResource> = resources.iter().collect();
        sorted.sort_by_key(|r| apply_weight(&r.gvk.kind));

        for resource in sorted {
            let name = resource.display_name();
            match self.apply_single_resource(resource).await {
                Ok(()) => summary.succeeded.push(name),
                Err(e) => summary.failed.push((name, e.to_string())),
            }
        }

        summary
    }

    async fn apply_single_resource(&self, resource: &ParsedResource) -> Result<()> {
        let name = resource
            .obj
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| KubeError::InvalidManifest("resource missing metadata.name".to_string()))?;

        let api = self.api_for_resource(resource);

        let mut params = PatchParams::apply(FIELD_MANAGER);
        params.force = true;

        api.patch(name, &params, &Patch::Apply(&resource.obj))
            .await
            .map_err(KubeError::Api)?;

        Ok(())
    }

    async fn delete_resources(&self, resources: &[ParsedResource]) -> OperationSummary {
        let mut summary = OperationSummary::default();

        // Reverse of creation order: workloads go before the config they use
        let mut sorted: Vec<&ParsedResource> = resources.iter().collect();
        sorted.sort_by_key(|r| std::cmp::Reverse(apply_weight(&r.gvk.kind)));

        for resource in sorted {
            let name = resource.display_name();
            match self.delete_single_resource(resource).await {
                Ok(true) => summary.succeeded.push(name),
                Ok(false) => summary.skipped.push((name, "not found".to_string())),
                Err(e) => summary.failed.push((name, e.to_string())),
            }
        }

        summary
    }

    async fn delete_single_resource(&self, resource: &ParsedResource) -> Result<bool> {
        let name = resource
            .obj
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| KubeError::InvalidManifest("resource missing metadata.name".to_string()))?;

        let api = self.api_for_resource(resource);
        let params = DeleteParams {
            propagation_policy: Some(kube::api::PropagationPolicy::Background),
            ..Default::default()
        };

        match api.delete(name, &params).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Ok(false),
            Err(e) => Err(KubeError::Api(e)),
        }
    }

    fn api_for_resource(&self, resource: &ParsedResource) -> Api<DynamicObject> {
        if resource.capabilities.scope == Scope::Namespaced {
            let ns = resource
                .obj
                .metadata
                .namespace
                .as_deref()
                .unwrap_or("default");
            Api::namespaced_with(self.client.clone(), ns, &resource.api_resource)
        } else {
            Api::all_with(self.client.clone(), &resource.api_resource)
        }
    }
}

#[async_trait]
impl ManifestApplier for ResourceManager {
    async fn apply(&self, namespace: &str, manifest: &str) -> Result<()> {
        let resources = self.parse_manifest(manifest, namespace)?;
        let summary = self.apply_resources(&resources).await;

        if !summary.is_success() {
            return Err(KubeError::OperationFailed(format!(
                "failed to apply resources: {}",
                summary.failure_message()
            )));
        }

        Ok(())
    }

    async fn delete(&self, namespace: &str, manifest: &str) -> Result<()> {
        let resources = self.parse_manifest(manifest, namespace)?;
        let summary = self.delete_resources(&resources).await;

        if !summary.is_success() {
            return Err(KubeError::OperationFailed(format!(
                "failed to delete resources: {}",
                summary.failure_message()
            )));
        }

        Ok(())
    }
}

/// Creation-order weight per resource kind (lower applies first)
fn apply_weight(kind: &str) -> u8 {
    match kind {
        "Namespace" => 0,
        "ServiceAccount" | "Role" | "RoleBinding" | "ClusterRole" | "ClusterRoleBinding" => 1,
        "ConfigMap" | "Secret" => 2,
        "Service" | "NetworkPolicy" => 3,
        _ => 4,
    }
}

/// Convert TypeMeta to GroupVersionKind
///
/// - "apps/v1" -> group="apps", version="v1"
/// - "v1" -> group="", version="v1" (core API)
fn gvk_from_type_meta(tm: &TypeMeta) -> GroupVersionKind {
    let (group, version) = match tm.api_version.rsplit_once('/') {
        Some((g, v)) => (g.to_string(), v.to_string()),
        None => (String::new(), tm.api_version.clone()),
    };

    GroupVersionKind {
        group,
        version,
        kind: tm.kind.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gvk_from_type_meta() {
        let tm = TypeMeta {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
        };
        let gvk = gvk_from_type_meta(&tm);
        assert_eq!(gvk.group, "apps");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk.kind, "Deployment");

        let tm_core = TypeMeta {
            api_version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
        };
        let gvk_core = gvk_from_type_meta(&tm_core);
        assert_eq!(gvk_core.group, "");
        assert_eq!(gvk_core.version, "v1");

        let tm_crd = TypeMeta {
            api_version: "traefik.io/v1alpha1".to_string(),
            kind: "IngressRoute".to_string(),
        };
        let gvk_crd = gvk_from_type_meta(&tm_crd);
        assert_eq!(gvk_crd.group, "traefik.io");
        assert_eq!(gvk_crd.version, "v1alpha1");
    }

    #[test]
    fn test_apply_weight_ordering() {
        assert!(apply_weight("Namespace") < apply_weight("ServiceAccount"));
        assert!(apply_weight("ServiceAccount") < apply_weight("ConfigMap"));
        assert!(apply_weight("Secret") < apply_weight("Service"));
        assert!(apply_weight("NetworkPolicy") < apply_weight("Deployment"));
        assert_eq!(apply_weight("Deployment"), apply_weight("IngressRoute"));
    }

    #[test]
    fn test_operation_summary() {
        let mut summary = OperationSummary::default();
        assert!(summary.is_success());

        summary.failed.push(("default/Service/web".to_string(), "denied".to_string()));
        assert!(!summary.is_success());
        assert_eq!(summary.failure_message(), "default/Service/web: denied");
    }
}
