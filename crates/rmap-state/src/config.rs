//! Engine configuration.
//!
//! Loaded from YAML (file or string) or from environment variables with
//! defaults. Only identifier allocation and the administrator agent are
//! configurable; everything else about the engine is fixed behaviour.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rmap_core::Iri;
use serde::{Deserialize, Serialize};

use crate::idservice::{IdService, RandomStringIdService, UuidIdService};

/// How new identifiers are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// Prefix plus random lowercase alphanumerics.
    #[default]
    Random,
    /// `urn:uuid:` plus a v4 UUID.
    Uuid,
}

impl std::str::FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "uuid" => Ok(Self::Uuid),
            other => Err(format!("unknown id scheme {other:?} (expected random or uuid)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdServiceConfig {
    pub scheme: IdScheme,
    /// Prefix for `random` ids.
    pub prefix: String,
    /// Random suffix length for `random` ids.
    pub length: usize,
}

impl Default for IdServiceConfig {
    fn default() -> Self {
        Self {
            scheme: IdScheme::Random,
            prefix: RandomStringIdService::DEFAULT_PREFIX.to_string(),
            length: RandomStringIdService::DEFAULT_LENGTH,
        }
    }
}

impl IdServiceConfig {
    /// Build the configured identifier service.
    pub fn build(&self) -> Result<Arc<dyn IdService>, ConfigError> {
        match self.scheme {
            IdScheme::Random => RandomStringIdService::new(self.prefix.clone(), self.length)
                .map(|svc| Arc::new(svc) as Arc<dyn IdService>)
                .map_err(|e| ConfigError::Invalid {
                    field: "id_service".to_string(),
                    reason: e.to_string(),
                }),
            IdScheme::Uuid => Ok(Arc::new(UuidIdService)),
        }
    }
}

/// Lifecycle engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub id_service: IdServiceConfig,
    /// Agent allowed to act on any DiSCO in creator checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_agent: Option<Iri>,
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(ConfigError::Yaml)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `RMAP_ID_SCHEME` (`random` or `uuid`, default: `random`)
    /// - `RMAP_ID_PREFIX` (default: `rmap:`)
    /// - `RMAP_ID_LENGTH` (default: 10)
    /// - `RMAP_ADMIN_AGENT` (default: none)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`EngineConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = IdServiceConfig::default();
        let scheme = match lookup("RMAP_ID_SCHEME") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidVar {
                var: "RMAP_ID_SCHEME".to_string(),
                reason,
            })?,
            None => defaults.scheme,
        };
        let length = match lookup("RMAP_ID_LENGTH") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                var: "RMAP_ID_LENGTH".to_string(),
                reason: format!("{raw:?} is not a positive integer"),
            })?,
            None => defaults.length,
        };
        let admin_agent = lookup("RMAP_ADMIN_AGENT")
            .map(|raw| {
                Iri::new(raw).map_err(|e| ConfigError::InvalidVar {
                    var: "RMAP_ADMIN_AGENT".to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        Ok(Self {
            id_service: IdServiceConfig {
                scheme,
                prefix: lookup("RMAP_ID_PREFIX").unwrap_or(defaults.prefix),
                length,
            },
            admin_agent,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid YAML configuration: {0}")]
    Yaml(serde_yaml::Error),
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: String, reason: String },
    #[error("invalid {field} configuration: {reason}")]
    Invalid { field: String, reason: String },
}
