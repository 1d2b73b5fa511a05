//! Configuration
//!
//! [`ConfigFile`] holds user settings loaded from `~/.tileharvest/config.ini`;
//! [`DownloadConfig`] is the subset a download run needs.

mod download;
mod file;
mod parser;

pub use download::DownloadConfig;
pub use file::{
    config_directory, config_file_path, ConfigFile, ConfigFileError, DownloadSettings,
    OutputSettings, ServerSettings, DEFAULT_OUTPUT_DIRECTORY, DEFAULT_PARALLEL_DOWNLOADS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SERVER_URL, DEFAULT_SOURCE, DEFAULT_TIMEOUT_SECS,
};
