//! Generation identifiers
//!
//! A generation names one versioned snapshot of the cache store. The
//! identifier embeds a semantic version so that any change meant to
//! invalidate old cached data is expressed as a new identifier.

use crate::error::{GatewayError, GatewayResult};
use semver::Version;
use std::fmt;
use std::str::FromStr;

/// A version-tagged cache generation name (`{app}-v{version}`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationId {
    app: String,
    version: Version,
}

impl GenerationId {
    /// Create a generation identifier for an app at a version
    pub fn new(app: impl Into<String>, version: Version) -> Self {
        Self {
            app: app.into(),
            version,
        }
    }

    /// Build from an app name and a semver string
    pub fn parse_version(app: impl Into<String>, version: &str) -> GatewayResult<Self> {
        let version = Version::parse(version).map_err(|e| GatewayError::GenerationInvalid {
            value: version.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(app, version))
    }

    /// The app this generation belongs to
    pub fn app(&self) -> &str {
        &self.app
    }

    /// The embedded semantic version
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The store name for this generation
    pub fn as_store_name(&self) -> String {
        format!("{}-v{}", self.app, self.version)
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-v{}", self.app, self.version)
    }
}

impl FromStr for GenerationId {
    type Err = GatewayError;

    /// Parse a store name back into its parts.
    ///
    /// The version is whatever follows the last `-v` separator, so app
    /// names may themselves contain `-v`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (app, version) = s.rsplit_once("-v").ok_or_else(|| {
            GatewayError::GenerationInvalid {
                value: s.to_string(),
                reason: "missing '-v' version separator".to_string(),
            }
        })?;

        if app.is_empty() {
            return Err(GatewayError::GenerationInvalid {
                value: s.to_string(),
                reason: "empty app name".to_string(),
            });
        }

        let version = Version::parse(version).map_err(|e| GatewayError::GenerationInvalid {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            app: app.to_string(),
            version,
        })
    }
}
