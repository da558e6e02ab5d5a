//! Configuration schema for Cachegate
//!
//! Configuration is stored at `~/.config/cachegate/config.toml`

use crate::error::{GatewayError, GatewayResult};
use crate::generation::GenerationId;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation identity
    pub generation: GenerationConfig,

    /// Cache pre-warm settings
    pub cache: CacheConfig,

    /// Network settings
    pub network: NetworkConfig,
}

/// Generation identity: app name plus semantic version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Application name the cache belongs to
    pub app: String,

    /// Semantic version; bump to invalidate all previously cached data
    pub version: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            app: "app".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}

/// Cache pre-warm and fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Resource paths fetched and stored at install time
    pub manifest: Vec<String>,

    /// Cached document served when a navigation request fails offline
    pub fallback_document: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            manifest: vec!["./".to_string(), "./index.html".to_string()],
            fallback_document: "./index.html".to_string(),
        }
    }
}

/// Network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Origin that manifest-relative paths resolve against
    pub origin: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080/".to_string(),
        }
    }
}

impl Config {
    /// The generation identifier this configuration names
    pub fn generation_id(&self) -> GatewayResult<GenerationId> {
        GenerationId::parse_version(&self.generation.app, &self.generation.version)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> GatewayResult<()> {
        self.generation_id()?;

        if self.cache.manifest.is_empty() {
            return Err(GatewayError::Internal(
                "manifest must list at least one resource path".to_string(),
            ));
        }

        // A fallback that was never pre-warmed can never be served.
        if !self
            .cache
            .manifest
            .contains(&self.cache.fallback_document)
        {
            return Err(GatewayError::Internal(format!(
                "fallback document '{}' is not in the manifest",
                self.cache.fallback_document
            )));
        }

        Ok(())
    }
}
