//! Events and tallies reported by a download run.

use std::fmt;

use crate::backend::TilePayload;
use crate::coord::TileCoord;

/// Why a tile failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileFailure {
    /// The backend answered with a non-success code.
    Application { code: i64, message: String },
    /// No usable answer (network, timeout, malformed reply).
    Transport(String),
}

impl fmt::Display for TileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileFailure::Application { code, message } if message.is_empty() => {
                write!(f, "{} Error downloading tile", code)
            }
            TileFailure::Application { code, message } => {
                write!(f, "{} Error downloading tile: {}", code, message)
            }
            TileFailure::Transport(reason) => write!(f, "Error while relaying tile: {}", reason),
        }
    }
}

/// Terminal result of one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileResult {
    Succeeded(TilePayload),
    Failed(TileFailure),
    Cancelled,
}

/// Aggregate counts for a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadTally {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Whether cancellation was requested before the run finished.
    pub was_cancelled: bool,
}

impl DownloadTally {
    /// Tiles in a terminal state.
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.completed() == self.total
    }
}

impl fmt::Display for DownloadTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} cancelled (of {})",
            self.succeeded, self.failed, self.cancelled, self.total
        )
    }
}

/// Events emitted while a job runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// A tile reached its terminal state.
    TileResult { coord: TileCoord, result: TileResult },
    /// Follows every terminal transition. `completed` never decreases.
    Progress { completed: usize, total: usize },
    /// Sent exactly once, after the last tile is terminal.
    Complete(DownloadTally),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_completed() {
        let tally = DownloadTally {
            total: 12,
            succeeded: 5,
            failed: 2,
            cancelled: 5,
            was_cancelled: true,
        };
        assert_eq!(tally.completed(), 12);
        assert!(tally.is_finished());
        assert_eq!(
            tally.to_string(),
            "5 succeeded, 2 failed, 5 cancelled (of 12)"
        );
    }

    #[test]
    fn test_failure_messages() {
        let app = TileFailure::Application {
            code: 404,
            message: String::new(),
        };
        assert_eq!(app.to_string(), "404 Error downloading tile");

        let transport = TileFailure::Transport("timed out".to_string());
        assert_eq!(
            transport.to_string(),
            "Error while relaying tile: timed out"
        );
    }
}
