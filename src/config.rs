//! Layered runtime configuration.
//!
//! Values resolve in order: built-in defaults, then an optional YAML
//! file, then `TICKETING_*` environment variables (nested keys joined
//! with `__`, e.g. `TICKETING_SERVER__PORT`).

use crate::error::Result;
use crate::events::DEFAULT_BUS_CAPACITY;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "TICKETING";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("org", "linagora", "ticketing"));

/// Default data directory, platform-specific when resolvable.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    PROJECT_DIRS.as_ref().map_or_else(
        || PathBuf::from(".ticketing"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Default location of the YAML configuration file.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    PROJECT_DIRS
        .as_ref()
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Where the file store keeps its documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Event bus sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub events: EventsConfig,
}

impl Config {
    /// Load configuration, layering the optional file at `path` (or the
    /// default location) and the environment over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("storage.data_dir", default_data_dir().display().to_string())?
            .set_default("events.capacity", DEFAULT_BUS_CAPACITY as i64)?;

        if let Some(file) = path.map(Path::to_path_buf).or_else(default_config_path) {
            builder = builder.add_source(config::File::from(file).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Load from the default locations.
    pub fn load_or_default() -> Result<Self> {
        Self::load(None)
    }

    /// `host:port` string for the HTTP listener.
    #[must_use]
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
