use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Result, fs::config_dir};

const FILE_NAME: &str = "config.toml";

/// Overrides [`CoreConfig::base_endpoint`] when set.
pub const BASE_ENDPOINT_VAR: &str = "TOUCHLINE_BASE_ENDPOINT";

/// Handle to the core configuration shared between components
pub type Cfg = Arc<RwLock<CoreConfig>>;

/// The core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Root of the content server. Relative image paths returned by the API are resolved
    /// against it.
    pub base_endpoint: String,
    /// Path segment between [`Self::base_endpoint`] and the REST resources.
    pub api_prefix: String,
    /// Shown when a profile has no avatar.
    pub placeholder_avatar: String,
    pub toast_duration_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            base_endpoint: "http://localhost:1337".into(),
            api_prefix: "api".into(),
            placeholder_avatar: "https://via.placeholder.com/150".into(),
            toast_duration_secs: 3,
            request_timeout_secs: 30,
        }
    }
}

impl CoreConfig {
    /// Load the configuration from the XDG config directory, writing the defaults out if no
    /// file exists yet. The environment is consulted last.
    pub fn load() -> Result<Self> {
        let cfg = Self::load_from(&Self::path()?)?;
        Ok(cfg.with_env_overrides(env::var(BASE_ENDPOINT_VAR).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            debug!("Wrote default configuration to {}", path.display());
            Ok(cfg)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_duration_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Wrap this configuration in a shareable [`Cfg`] handle.
    pub fn into_handle(self) -> Cfg {
        Arc::new(RwLock::new(self))
    }

    fn with_env_overrides(mut self, base_endpoint: Option<String>) -> Self {
        if let Some(endpoint) = base_endpoint.filter(|e| !e.trim().is_empty()) {
            self.base_endpoint = endpoint;
        }
        self
    }

    fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join(FILE_NAME))
    }
}
