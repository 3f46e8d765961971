//! Template rendering context

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::identity::ReleaseIdentity;
use crate::pack::PackMetadata;
use crate::values::Values;

/// Context available to all templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    /// Merged values (pack defaults underneath the request tree)
    pub values: JsonValue,

    /// Release information
    pub release: ReleaseInfo,

    /// Pack metadata
    pub pack: PackInfo,
}

/// Release information for templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    /// Release name
    pub name: String,

    /// Target namespace
    pub namespace: String,

    /// Revision number
    pub revision: u32,

    /// Is this an install operation?
    pub is_install: bool,

    /// Is this an upgrade operation?
    pub is_upgrade: bool,

    /// Service (always "packgate")
    pub service: String,
}

impl ReleaseInfo {
    /// Create release info for a new install
    pub fn for_install(identity: &ReleaseIdentity) -> Self {
        Self {
            name: identity.name.clone(),
            namespace: identity.namespace.clone(),
            revision: 1,
            is_install: true,
            is_upgrade: false,
            service: "packgate".to_string(),
        }
    }

    /// Create release info for an upgrade
    pub fn for_upgrade(identity: &ReleaseIdentity, revision: u32) -> Self {
        Self {
            name: identity.name.clone(),
            namespace: identity.namespace.clone(),
            revision,
            is_install: false,
            is_upgrade: true,
            service: "packgate".to_string(),
        }
    }
}

/// Pack information for templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackInfo {
    /// Pack name
    pub name: String,

    /// Pack version
    pub version: String,
}

impl From<&PackMetadata> for PackInfo {
    fn from(meta: &PackMetadata) -> Self {
        Self {
            name: meta.name.clone(),
            version: meta.version.to_string(),
        }
    }
}

impl TemplateContext {
    /// Create a new template context
    pub fn new(values: Values, release: ReleaseInfo, pack: &PackMetadata) -> Self {
        Self {
            values: values.into_inner(),
            release,
            pack: PackInfo::from(pack),
        }
    }
}
