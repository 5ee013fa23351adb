//! Server configuration.
//!
//! Loaded once at start-up from a YAML file under the Thunder home
//! directory. Store-mode selection is resolved here: the per-kind option
//! wins when it parses; unknown or absent values silently fall back to the
//! global `immutable_resources.enabled` flag. Composite is never implicit.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use thunder_store::StoreMode;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8090;

/// Default bind hostname.
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Listener settings
    #[serde(default)]
    pub server: ListenerConfig,
    /// Per-kind store selection for organization units
    #[serde(default)]
    pub organization_unit: OrganizationUnitConfig,
    /// Global immutable-resources flag
    #[serde(default)]
    pub immutable_resources: ImmutableResourcesConfig,
}

/// Listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerConfig {
    /// Hostname to bind
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Serve plain HTTP. TLS termination belongs to the fronting proxy;
    /// start-up refuses a `false` here rather than pretending to terminate.
    #[serde(default = "default_http_only")]
    pub http_only: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
            http_only: default_http_only(),
        }
    }
}

/// Organization-unit specific options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationUnitConfig {
    /// Store mode: `mutable`, `immutable`, or `composite`
    #[serde(default)]
    pub store: Option<String>,
}

/// Global immutable-resources flag, the fallback when a per-kind mode is
/// absent or unrecognized.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImmutableResourcesConfig {
    /// `true` selects the immutable wiring, `false` the mutable one
    #[serde(default)]
    pub enabled: bool,
}

/// Configuration loading failures. All fatal to start-up.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for the expected shape
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        /// Offending path
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_yaml::Error,
    },
}

impl ServerConfig {
    /// Load the configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolved store mode for organization units.
    #[must_use]
    pub fn organization_unit_store_mode(&self) -> StoreMode {
        self.organization_unit
            .store
            .as_deref()
            .and_then(StoreMode::parse)
            .unwrap_or_else(|| self.fallback_mode())
    }

    /// Resolved store mode for applications. Applications have no per-kind
    /// option; they follow the global flag.
    #[must_use]
    pub fn application_store_mode(&self) -> StoreMode {
        self.fallback_mode()
    }

    fn fallback_mode(&self) -> StoreMode {
        if self.immutable_resources.enabled {
            StoreMode::Immutable
        } else {
            StoreMode::Mutable
        }
    }
}

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_http_only() -> bool {
    true
}
