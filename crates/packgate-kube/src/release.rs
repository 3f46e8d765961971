//! The stored release record and its state machine

use chrono::{DateTime, Utc};
use packgate_core::{PackMetadata, ReleaseIdentity, Values};
use serde::{Deserialize, Serialize};

/// The record packgate keeps per release, persisted by a storage driver.
///
/// One record per (name, namespace): created on install, replaced in place on
/// upgrade, removed on uninstall. The cluster is the system of record - this
/// is only what was last applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRelease {
    /// Release name
    pub name: String,

    /// Kubernetes namespace
    pub namespace: String,

    /// Revision number (1-indexed, increments with each upgrade)
    pub version: u32,

    /// Current state
    pub state: ReleaseState,

    /// Pack metadata at deploy time
    pub pack: PackMetadata,

    /// The caller-supplied parameter tree last applied to this release
    pub values: Values,

    /// Rendered manifest (all Kubernetes resources)
    pub manifest: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl StoredRelease {
    /// Create a new release record for installation
    pub fn for_install(
        identity: &ReleaseIdentity,
        pack: PackMetadata,
        values: Values,
        manifest: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: identity.name.clone(),
            namespace: identity.namespace.clone(),
            version: 1,
            state: ReleaseState::Pending,
            pack,
            values,
            manifest,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create the next revision for an upgrade, replacing values and manifest
    pub fn for_upgrade(previous: &StoredRelease, values: Values, manifest: String) -> Self {
        Self {
            name: previous.name.clone(),
            namespace: previous.namespace.clone(),
            version: previous.version + 1,
            state: ReleaseState::Pending,
            pack: previous.pack.clone(),
            values,
            manifest,
            created_at: previous.created_at,
            updated_at: Utc::now(),
        }
    }

    /// Storage key for this release
    pub fn storage_key(&self) -> String {
        storage_key(&self.name)
    }

    /// Mark the release as deployed
    pub fn mark_deployed(&mut self) {
        self.state = ReleaseState::Deployed;
        self.updated_at = Utc::now();
    }

    /// Mark the release as failed
    pub fn mark_failed(&mut self, reason: String) {
        self.state = ReleaseState::Failed {
            reason,
            failed_at: Utc::now(),
        };
        self.updated_at = Utc::now();
    }
}

/// Storage object name for a release
pub fn storage_key(name: &str) -> String {
    format!("gate.packgate.release.v1.{name}")
}

/// Release state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ReleaseState {
    /// An install or upgrade is being applied
    Pending,

    /// Successfully deployed
    Deployed,

    /// The last apply failed
    Failed {
        reason: String,
        failed_at: DateTime<Utc>,
    },
}

impl std::fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Deployed => "deployed",
            Self::Failed { .. } => "failed",
        };
        write!(f, "{s}")
    }
}
