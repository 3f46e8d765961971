//! Packgate Core - foundational types for the challenge deployment service
//!
//! This crate provides the types shared by the rest of packgate:
//! - `LoadedPack`: the template package parsed from its archive
//! - `PackCache`: one-time pack loading shared by all requests
//! - `Values`: the generic parameter tree handed to templates
//! - `ChallengeRequest`: the canonical deployment request schema
//! - `ReleaseIdentity`: release name/namespace resolution

pub mod cache;
pub mod context;
pub mod error;
pub mod identity;
pub mod pack;
pub mod request;
pub mod values;

#[cfg(test)]
pub(crate) mod testutil;

pub use cache::PackCache;
pub use context::{PackInfo, ReleaseInfo, TemplateContext};
pub use error::{CoreError, Result};
pub use identity::ReleaseIdentity;
pub use pack::{LoadedPack, Pack, PackMetadata, TemplateFile};
pub use request::{ChallengeRequest, Container, EnvVar, Global, PortSpec, ResourceSpec, Resources};
pub use values::Values;
