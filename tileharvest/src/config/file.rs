//! Configuration file handling for ~/.tileharvest/config.ini.
//!
//! ```ini
//! [server]
//! url = http://localhost:8080
//!
//! [download]
//! parallel = 4
//! timeout = 30
//! poll_interval = 5
//!
//! [output]
//! directory = tiles
//! zoom = 17
//! source = Bing Maps Satellite
//! ```

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::download::DownloadConfig;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 4;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "tiles";
pub const DEFAULT_SOURCE: &str = "Bing Maps Satellite";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Base URL of the tile backend
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub parallel: usize,
    /// Per-request timeout in seconds
    pub timeout: u64,
    /// Seconds between task status queries
    pub poll_interval: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub directory: String,
    /// Zoom level used when none is given on the command line
    pub zoom: Option<u8>,
    /// Preset name or URL template
    pub source: String,
}

/// User configuration, defaults overlaid with the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub download: DownloadSettings,
    pub output: OutputSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                url: DEFAULT_SERVER_URL.to_string(),
            },
            download: DownloadSettings {
                parallel: DEFAULT_PARALLEL_DOWNLOADS,
                timeout: DEFAULT_TIMEOUT_SECS,
                poll_interval: DEFAULT_POLL_INTERVAL_SECS,
            },
            output: OutputSettings {
                directory: DEFAULT_OUTPUT_DIRECTORY.to_string(),
                zoom: None,
                source: DEFAULT_SOURCE.to_string(),
            },
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.tileharvest/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Download settings as a [`DownloadConfig`].
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig::new()
            .with_timeout_secs(self.download.timeout)
            .with_parallel_downloads(self.download.parallel)
            .with_poll_interval_secs(self.download.poll_interval)
    }
}

/// Get the path to the config directory (~/.tileharvest).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tileharvest")
}

/// Get the path to the config file (~/.tileharvest/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
