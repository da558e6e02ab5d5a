//! Error types for Cachegate
//!
//! All modules use `GatewayResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// All errors that can occur in the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid generation identifier '{value}': {reason}")]
    GenerationInvalid { value: String, reason: String },

    // Pre-warm errors
    #[error("Pre-warm failed for manifest entry '{path}': {reason}")]
    PrewarmFetch { path: String, reason: String },

    #[error("Pre-warm got status {status} for manifest entry '{path}'")]
    PrewarmStatus { path: String, status: u16 },

    // Network errors
    #[error("Network unreachable for {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Invalid URL '{url}': {reason}")]
    UrlInvalid { url: String, reason: String },

    // Storage errors
    #[error("Cache storage {operation} failed: {reason}")]
    Storage { operation: String, reason: String },

    // Runtime control errors
    #[error("Host runtime rejected {signal} signal: {reason}")]
    HostSignal { signal: String, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a storage error with operation context
    pub fn storage(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the network could not be reached at all,
    /// as opposed to the server answering with an error status.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}
