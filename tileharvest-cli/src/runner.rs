//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, config loading and runtime creation
//! so command handlers only deal with their own work.

use std::sync::Arc;

use tileharvest::backend::ReqwestBackend;
use tileharvest::config::{ConfigFile, DownloadConfig};
use tileharvest::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&default_log_dir(), default_log_file())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Tileharvest v{}", tileharvest::VERSION);
        info!(
            log = %self.logging_guard.log_path().display(),
            "Tileharvest CLI: {} command", command
        );
    }

    /// Backend client for `server`, or the configured server when `None`.
    pub fn create_backend(
        &self,
        server: Option<String>,
        download: &DownloadConfig,
    ) -> Result<Arc<ReqwestBackend>, CliError> {
        let url = server.unwrap_or_else(|| self.config.server.url.clone());
        info!(url = %url, timeout_secs = download.timeout_secs(), "Creating backend client");
        let backend = ReqwestBackend::with_timeout(url, download.timeout())?;
        Ok(Arc::new(backend))
    }

    /// Multi-threaded runtime for the async download and polling work.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }
}
