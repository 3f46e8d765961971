//! Advisory per-release locks
//!
//! Serializes install/upgrade/uninstall for the same (name, namespace)
//! within this process, so an install and an uninstall for one release
//! cannot interleave against the control plane. Operations on different
//! releases proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use packgate_core::ReleaseIdentity;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-release advisory locks
///
/// Entries live for the process lifetime; each is a single async mutex.
#[derive(Default)]
pub struct ReleaseLocks {
    locks: Mutex<HashMap<(String, String), Arc<AsyncMutex<()>>>>,
}

impl ReleaseLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a release, waiting if another operation on the
    /// same release holds it. The guard must be held for the duration of the
    /// operation.
    pub async fn acquire(&self, identity: &ReleaseIdentity) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry((identity.namespace.clone(), identity.name.clone()))
                .or_default()
                .clone()
        };

        lock.lock_owned().await
    }
}
