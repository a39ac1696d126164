//! Dashboard configuration
//!
//! Read from a TOML file (`--config`, or `hmc-dashboard/config.toml` under
//! the OS config directory when present). Every field has a default, so an
//! absent file means a local server with the stock views.

use crate::data::{ViewCatalog, ViewSpec};
use directories::BaseDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const CONFIG_DIR_NAME: &str = "hmc-dashboard";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid server url `{url}`: {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("Default view `{0}` is not in the view catalog")]
    UnknownDefaultView(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server_url: String,
    pub default_user: String,
    pub default_view: String,
    pub metadata_file: PathBuf,
    pub connect_timeout_secs: u64,
    /// Unset means reads wait as long as the server takes.
    pub read_timeout_secs: Option<u64>,
    pub views: Vec<ViewSpec>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            default_user: "demo-user-1".to_string(),
            default_view: "sleep".to_string(),
            metadata_file: PathBuf::from("user_metadata.csv"),
            connect_timeout_secs: 10,
            read_timeout_secs: None,
            views: ViewCatalog::default().views().to_vec(),
        }
    }
}

impl DashboardConfig {
    /// Load from `explicit` if given, else the per-user config file if it
    /// exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|path| path.is_file()),
        };
        let Some(path) = path else {
            tracing::debug!("No config file; using defaults");
            return Ok(Self::default());
        };
        let config = Self::from_file(&path)?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check cross-field constraints and return the parsed server url.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let url = self.server_url()?;
        let catalog = self.view_catalog();
        if !catalog.is_empty() && !catalog.contains(&self.default_view) {
            return Err(ConfigError::UnknownDefaultView(self.default_view.clone()));
        }
        Ok(url)
    }

    pub fn server_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidServerUrl {
            url: self.server_url.clone(),
            reason,
        };
        let url = Url::parse(&self.server_url).map_err(|err| invalid(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme `{}`", other))),
        }
    }

    pub fn view_catalog(&self) -> ViewCatalog {
        ViewCatalog::new(self.views.clone())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

/// `<config dir>/hmc-dashboard/config.toml`, when a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| {
        dirs.config_dir()
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    })
}
