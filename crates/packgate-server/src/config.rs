//! Server configuration from the environment

use std::path::PathBuf;

use anyhow::{Context, bail};

/// Default artifact location inside the service container
pub const DEFAULT_PACK_PATH: &str = "/app/packs/challenge.tgz";

/// Which cluster object backs release records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Secrets,
    ConfigMaps,
}

impl std::str::FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "secrets" | "secret" => Ok(Self::Secrets),
            "configmaps" | "configmap" => Ok(Self::ConfigMaps),
            other => bail!("unknown storage driver '{other}' (expected 'secrets' or 'configmaps')"),
        }
    }
}

/// Runtime configuration, read once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port (`PACKGATE_PORT`, default 8080)
    pub port: u16,

    /// Pack artifact path (`PACKGATE_PACK`)
    pub pack_path: PathBuf,

    /// Release storage driver (`PACKGATE_DRIVER`, default secrets)
    pub driver: StorageKind,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("PACKGATE_PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid PACKGATE_PORT '{raw}'"))?,
            Err(_) => 8080,
        };

        let pack_path = std::env::var("PACKGATE_PACK")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PACK_PATH));

        let driver = match std::env::var("PACKGATE_DRIVER") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageKind::Secrets,
        };

        Ok(Self {
            port,
            pack_path,
            driver,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_parsing() {
        assert_eq!("secrets".parse::<StorageKind>().unwrap(), StorageKind::Secrets);
        assert_eq!("Secret".parse::<StorageKind>().unwrap(), StorageKind::Secrets);
        assert_eq!(
            "configmaps".parse::<StorageKind>().unwrap(),
            StorageKind::ConfigMaps
        );
        assert!("sql".parse::<StorageKind>().is_err());
    }
}
