//! Pack definition and archive loading
//!
//! A pack is the immutable template package packgate deploys: a gzipped tar
//! archive holding `Pack.yaml`, optional `values.yaml` defaults, and the
//! minijinja manifest templates under `templates/`.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use semver::Version;
use serde::{Deserialize, Serialize};
use tar::Archive;

use crate::error::{CoreError, Result};
use crate::values::Values;

/// Supported pack API version
pub const PACK_API_VERSION: &str = "packgate/v1";

/// The parsed `Pack.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    /// API version (packgate/v1)
    pub api_version: String,

    /// Pack metadata
    pub metadata: PackMetadata,
}

/// Pack metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackMetadata {
    /// Pack name (required)
    pub name: String,

    /// Pack version (required, SemVer)
    #[serde(with = "version_serde")]
    pub version: Version,

    /// Description
    #[serde(default)]
    pub description: Option<String>,
}

/// A template source read from the archive
#[derive(Debug, Clone)]
pub struct TemplateFile {
    /// Path relative to `templates/`
    pub name: String,

    /// Raw template source
    pub source: String,
}

impl TemplateFile {
    /// Helper templates (leading underscore) are loaded for macros/includes
    /// but never rendered into the manifest.
    pub fn is_helper(&self) -> bool {
        self.name
            .rsplit('/')
            .next()
            .is_some_and(|base| base.starts_with('_'))
    }

    /// Whether this file produces manifest output when rendered.
    pub fn is_manifest(&self) -> bool {
        !self.is_helper() && !self.name.ends_with("NOTES.txt")
    }
}

/// A pack loaded into memory from its archive
#[derive(Debug, Clone)]
pub struct LoadedPack {
    /// Pack definition
    pub pack: Pack,

    /// Default values from `values.yaml` (empty if absent)
    pub default_values: Values,

    /// Template sources, sorted by name for deterministic rendering
    pub templates: Vec<TemplateFile>,
}

impl LoadedPack {
    /// Load a pack from a `.tar.gz` artifact on disk.
    pub fn from_archive<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::PackNotFound {
                    path: path.display().to_string(),
                }
            } else {
                CoreError::Io(e)
            }
        })?;

        let entries = read_archive_entries(file)?;
        Self::from_entries(entries)
    }

    fn from_entries(entries: HashMap<String, Vec<u8>>) -> Result<Self> {
        let pack_yaml = entries.get("Pack.yaml").ok_or_else(|| CoreError::InvalidPack {
            message: "Pack.yaml not found in archive".to_string(),
        })?;
        let pack: Pack = serde_yaml::from_slice(pack_yaml)?;

        if pack.api_version != PACK_API_VERSION {
            return Err(CoreError::InvalidPack {
                message: format!(
                    "unsupported API version: {}. Expected: {}",
                    pack.api_version, PACK_API_VERSION
                ),
            });
        }

        let default_values = match entries.get("values.yaml") {
            Some(bytes) => Values::from_yaml(&into_utf8("values.yaml", bytes)?)?,
            None => Values::new(),
        };

        let mut templates = Vec::new();
        for (path, bytes) in &entries {
            let Some(rel) = path.strip_prefix("templates/") else {
                continue;
            };
            if rel.is_empty() {
                continue;
            }
            templates.push(TemplateFile {
                name: rel.to_string(),
                source: into_utf8(path, bytes)?,
            });
        }
        templates.sort_by(|a, b| a.name.cmp(&b.name));

        if !templates.iter().any(|t| t.is_manifest()) {
            return Err(CoreError::InvalidPack {
                message: "archive contains no manifest templates".to_string(),
            });
        }

        Ok(Self {
            pack,
            default_values,
            templates,
        })
    }
}

/// Read all files from a gzipped tar archive in a single pass.
fn read_archive_entries<R: Read>(reader: R) -> Result<HashMap<String, Vec<u8>>> {
    let decoder = GzDecoder::new(reader);
    let mut archive = Archive::new(decoder);
    let mut contents = HashMap::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.header().entry_type().is_dir() {
            continue;
        }

        let path = entry.path()?.to_string_lossy().to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        contents.insert(path, data);
    }

    Ok(contents)
}

fn into_utf8(path: &str, bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| CoreError::InvalidPack {
        message: format!("{path} is not valid UTF-8: {e}"),
    })
}

/// Custom serde for semver::Version
mod version_serde {
    use semver::Version;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(version: &Version, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&version.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Version, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}
