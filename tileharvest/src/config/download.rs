//! Download and polling configuration.

use std::time::Duration;

use super::file::{DEFAULT_PARALLEL_DOWNLOADS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS};

/// Configuration for a download run.
///
/// # Example
///
/// ```
/// use tileharvest::config::DownloadConfig;
///
/// let config = DownloadConfig::default();
/// assert_eq!(config.timeout_secs(), 30);
/// assert_eq!(config.parallel_downloads(), 4);
/// assert_eq!(config.poll_interval_secs(), 5);
///
/// let config = DownloadConfig::new()
///     .with_timeout_secs(60)
///     .with_parallel_downloads(8);
/// assert_eq!(config.timeout().as_secs(), 60);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Per-request timeout for every backend call (seconds)
    timeout_secs: u64,
    /// Tile requests in flight at once
    parallel_downloads: usize,
    /// Delay between generation status queries (seconds)
    poll_interval_secs: u64,
}

impl DownloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout in seconds. A timeout counts as a transport failure.
    pub fn with_timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout;
        self
    }

    /// Set how many tiles are requested concurrently.
    pub fn with_parallel_downloads(mut self, parallel: usize) -> Self {
        self.parallel_downloads = parallel;
        self
    }

    /// Set the delay between task status queries in seconds.
    pub fn with_poll_interval_secs(mut self, interval: u64) -> Self {
        self.poll_interval_secs = interval;
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn parallel_downloads(&self) -> usize {
        self.parallel_downloads
    }

    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            parallel_downloads: DEFAULT_PARALLEL_DOWNLOADS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}
