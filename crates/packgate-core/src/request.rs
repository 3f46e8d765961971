//! Canonical deployment request schema and its translation into `Values`
//!
//! The wire schema is camelCase throughout (`global.baseDomain`,
//! `resources.requests`). Unknown fields are rejected so the retired
//! snake_case variant fails loudly instead of rendering wrong.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::values::Values;

/// Settings shared by every container of a challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Global {
    pub base_domain: String,
    pub tls_cert: String,
}

/// A single environment variable entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// An exposed container port and how it is routed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortSpec {
    pub number: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// One side of a resource requirement (cpu/memory quantities)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

/// Container resource requirements, keyed exactly as the templates consume them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceSpec>,
}

/// One workload container of a challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Container {
    pub image: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_external_network: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
}

/// A full challenge deployment request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChallengeRequest {
    pub global: Global,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub containers: Vec<Container>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<String>,
}

impl ChallengeRequest {
    /// Check that every required field is present and non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.global.base_domain.is_empty() {
            return Err(CoreError::validation("global.baseDomain", "must not be empty"));
        }
        if self.global.tls_cert.is_empty() {
            return Err(CoreError::validation("global.tlsCert", "must not be empty"));
        }
        if self.containers.is_empty() {
            return Err(CoreError::validation(
                "containers",
                "at least one container is required",
            ));
        }
        for (i, container) in self.containers.iter().enumerate() {
            if container.image.is_empty() {
                return Err(CoreError::validation(
                    format!("containers[{i}].image"),
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }

    /// Validate and re-express the request as a template parameter tree.
    ///
    /// The tree mirrors the request's JSON form field for field, so templates
    /// see `values.global.baseDomain`, `values.containers[0].resources.limits.cpu`
    /// and so on under the documented keys.
    pub fn to_values(&self) -> Result<Values> {
        self.validate()?;
        Ok(Values(serde_json::to_value(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_request() -> ChallengeRequest {
        serde_json::from_value(serde_json::json!({
            "global": {"baseDomain": "x.test", "tlsCert": "cert"},
            "containers": [{"image": "nginx", "name": "web"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_minimal_request_translates() {
        let values = minimal_request().to_values().unwrap();

        assert_eq!(values.get("global.baseDomain").unwrap(), "x.test");
        assert_eq!(values.get("global.tlsCert").unwrap(), "cert");
        let containers = values.get("containers").unwrap().as_array().unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0]["image"], "nginx");
        assert_eq!(containers[0]["name"], "web");
    }

    #[test]
    fn test_nested_fields_keep_their_keys() {
        let req: ChallengeRequest = serde_json::from_value(serde_json::json!({
            "global": {"baseDomain": "x.test", "tlsCert": "cert"},
            "labels": {"event": "finals"},
            "containers": [{
                "image": "nginx",
                "name": "web",
                "allowExternalNetwork": true,
                "envs": [{"name": "FLAG", "value": "ctf{...}"}],
                "ports": [{"number": 8080, "protocol": "HTTP", "domain": "web"}],
                "resources": {
                    "requests": {"cpu": "100m", "memory": "64Mi"},
                    "limits": {"cpu": "500m", "memory": "128Mi"}
                }
            }],
            "imagePullSecrets": ["regcred"]
        }))
        .unwrap();

        let values = req.to_values().unwrap();

        let container = &values.get("containers").unwrap().as_array().unwrap()[0];
        assert_eq!(container["allowExternalNetwork"], true);
        assert_eq!(container["envs"][0]["name"], "FLAG");
        assert_eq!(container["ports"][0]["number"], 8080);
        assert_eq!(container["resources"]["requests"]["memory"], "64Mi");
        assert_eq!(container["resources"]["limits"]["cpu"], "500m");
        assert_eq!(values.get("labels.event").unwrap(), "finals");
        assert_eq!(values.get("imagePullSecrets").unwrap()[0], "regcred");
    }

    #[test]
    fn test_round_trip_is_exact() {
        let req: ChallengeRequest = serde_json::from_value(serde_json::json!({
            "global": {"baseDomain": "x.test", "tlsCert": "cert"},
            "containers": [{
                "image": "nginx",
                "ports": [{"number": 80}],
                "resources": {"limits": {"cpu": "1"}}
            }]
        }))
        .unwrap();

        let tree = req.to_values().unwrap();
        let back: ChallengeRequest = serde_json::from_value(tree.into_inner()).unwrap();

        assert_eq!(back, req);
    }

    #[test]
    fn test_empty_containers_rejected() {
        let req: ChallengeRequest = serde_json::from_value(serde_json::json!({
            "global": {"baseDomain": "x.test", "tlsCert": "cert"},
            "containers": []
        }))
        .unwrap();

        let err = req.to_values().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "containers"));
    }

    #[test]
    fn test_empty_image_rejected() {
        let req: ChallengeRequest = serde_json::from_value(serde_json::json!({
            "global": {"baseDomain": "x.test", "tlsCert": "cert"},
            "containers": [{"image": "nginx"}, {"image": ""}]
        }))
        .unwrap();

        let err = req.validate().unwrap_err();
        assert!(
            matches!(err, CoreError::Validation { ref field, .. } if field == "containers[1].image")
        );
    }

    #[test]
    fn test_empty_global_fields_rejected() {
        let req: ChallengeRequest = serde_json::from_value(serde_json::json!({
            "global": {"baseDomain": "", "tlsCert": "cert"},
            "containers": [{"image": "nginx"}]
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_snake_case_variant_rejected() {
        // The retired schema variant must fail deserialization, not half-parse.
        let result: std::result::Result<ChallengeRequest, _> =
            serde_json::from_value(serde_json::json!({
                "globals": {"base_domain": "x.test", "tls_cert": "cert"},
                "containers": [{"image": "nginx"}]
            }));

        assert!(result.is_err());
    }
}
