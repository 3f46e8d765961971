//! Shared application state

use std::sync::Arc;

use packgate_core::PackCache;
use packgate_kube::ReleaseLocks;

use crate::config::ServerConfig;

/// State shared by every handler.
///
/// The pack cache and the lock registry are the only process-wide pieces;
/// cluster clients are built fresh per call.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub pack_cache: Arc<PackCache>,
    pub locks: Arc<ReleaseLocks>,
}

impl AppState {
    /// Build the state owned by the process for its lifetime.
    pub fn new(config: ServerConfig) -> Self {
        let pack_cache = Arc::new(PackCache::new(config.pack_path.clone()));
        Self {
            config: Arc::new(config),
            pack_cache,
            locks: Arc::new(ReleaseLocks::new()),
        }
    }
}
