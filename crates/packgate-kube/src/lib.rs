//! Packgate Kube - Kubernetes integration for packgate
//!
//! This crate provides:
//! - **Storage Drivers**: Persist release records in Kubernetes (Secrets, ConfigMaps) or in memory
//! - **Release Client**: Install-or-upgrade and uninstall against a named release
//! - **Render Engine**: MiniJinja rendering of pack templates into manifests
//! - **Resource Manager**: Dynamic apply/delete of rendered manifests
//! - **Release Locks**: Advisory per-release serialization of operations

pub mod client;
pub mod error;
pub mod locks;
pub mod release;
pub mod render;
pub mod resources;
pub mod storage;

pub use client::ReleaseClient;
pub use error::{KubeError, Result};
pub use locks::ReleaseLocks;
pub use release::{ReleaseState, StoredRelease};
pub use render::Engine;
pub use resources::{ManifestApplier, OperationSummary, ResourceManager};
pub use storage::{ConfigMapDriver, MockStorageDriver, SecretsDriver, StorageDriver};
