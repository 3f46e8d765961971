//! Packgate Server - the HTTP surface of the challenge deployment service
//!
//! Exposes install-or-upgrade and uninstall of templated challenge packs as
//! `POST`/`DELETE /api/challenge`, plus a health probe. The release
//! lifecycle itself lives in `packgate-kube`; this crate binds requests,
//! owns the process-wide pack cache and lock registry, and maps errors to
//! HTTP responses.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ServerConfig, StorageKind};
pub use error::AppError;
pub use routes::router;
pub use state::AppState;
