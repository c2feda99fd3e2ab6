//! appstore.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::OperatingMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppStoreConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub gitops: GitOpsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    /// Server-wide operating mode. Records keep the mode they were created under.
    #[serde(default)]
    pub mode: OperatingMode,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            mode: OperatingMode::default(),
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitOpsSection {
    /// Root directory the GitOps engine writes application manifests into.
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,
}

impl Default for GitOpsSection {
    fn default() -> Self {
        Self {
            manifest_dir: default_manifest_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/appstore")
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from("/var/lib/appstore/gitops")
}

impl AppStoreConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a config rooted at `data_dir` for the given mode.
    pub fn scaffold(mode: OperatingMode, data_dir: &Path) -> Self {
        AppStoreConfig {
            server: ServerSection {
                mode,
                data_dir: data_dir.to_path_buf(),
            },
            gitops: GitOpsSection {
                manifest_dir: data_dir.join("gitops"),
            },
            logging: LoggingSection {
                filter: Some("info,appstore=debug".to_string()),
            },
        }
    }

    /// Path of the redb database inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.server.data_dir.join("appstore.redb")
    }
}
