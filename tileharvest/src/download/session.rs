//! Mutable state of one running job.
//!
//! The tile-state table and counters live behind a single lock. Cancelling
//! takes the same lock, so a result is either committed before the cancel
//! (and keeps its outcome) or after it (and is recorded as cancelled); there
//! is no window in between.

use parking_lot::Mutex;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, info};

use super::job::DownloadJob;
use super::progress::{DownloadTally, TileFailure, TileResult};
use super::state::TileState;
use crate::backend::TileResponse;

#[derive(Debug)]
struct SessionState {
    tiles: Vec<TileState>,
    tally: DownloadTally,
}

impl SessionState {
    fn transition(&mut self, index: usize, next: TileState) -> bool {
        let Some(current) = self.tiles.get_mut(index) else {
            return false;
        };
        if !current.can_transition_to(next) {
            return false;
        }
        *current = next;
        match next {
            TileState::Succeeded => self.tally.succeeded += 1,
            TileState::Failed => self.tally.failed += 1,
            TileState::Cancelled => self.tally.cancelled += 1,
            TileState::Pending | TileState::InFlight => {}
        }
        true
    }
}

/// Outcome of committing one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub result: TileResult,
    /// Terminal tiles after this commit.
    pub completed: usize,
}

/// Owns one job's tile table, cancellation token and counters.
#[derive(Debug)]
pub struct DownloadSession {
    job: DownloadJob,
    token: CancellationToken,
    state: Mutex<SessionState>,
}

impl DownloadSession {
    pub fn new(job: DownloadJob) -> Self {
        let total = job.len();
        Self {
            state: Mutex::new(SessionState {
                tiles: vec![TileState::Pending; total],
                tally: DownloadTally {
                    total,
                    ..DownloadTally::default()
                },
            }),
            job,
            token: CancellationToken::new(),
        }
    }

    pub fn job(&self) -> &DownloadJob {
        &self.job
    }

    pub fn total(&self) -> usize {
        self.job.len()
    }

    /// Requests cancellation. Idempotent; the token is never reset.
    pub fn cancel(&self) {
        let state = self.state.lock();
        if !self.token.is_cancelled() {
            info!(
                completed = state.tally.completed(),
                total = state.tally.total,
                "Download cancellation requested"
            );
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Moves a tile from Pending to InFlight.
    ///
    /// Returns `false`, leaving the tile untouched, once cancellation has been
    /// requested or if the tile is not pending.
    pub fn begin(&self, index: usize) -> bool {
        let mut state = self.state.lock();
        if self.token.is_cancelled() {
            return false;
        }
        state.transition(index, TileState::InFlight)
    }

    /// Records the result of an in-flight tile.
    ///
    /// `None` means the request was aborted. Any result arriving after
    /// cancellation is recorded as cancelled. Returns `None` if the tile was
    /// not in flight.
    pub fn commit(&self, index: usize, response: Option<TileResponse>) -> Option<Commit> {
        let mut state = self.state.lock();

        let (next, result) = match response {
            _ if self.token.is_cancelled() => (TileState::Cancelled, TileResult::Cancelled),
            None => (TileState::Cancelled, TileResult::Cancelled),
            Some(TileResponse::Success(payload)) => {
                (TileState::Succeeded, TileResult::Succeeded(payload))
            }
            Some(TileResponse::ApplicationError { code, message }) => (
                TileState::Failed,
                TileResult::Failed(TileFailure::Application { code, message }),
            ),
            Some(TileResponse::TransportError(reason)) => (
                TileState::Failed,
                TileResult::Failed(TileFailure::Transport(reason)),
            ),
        };

        if !state.transition(index, next) {
            return None;
        }
        Some(Commit {
            result,
            completed: state.tally.completed(),
        })
    }

    /// Marks every tile still pending as cancelled.
    ///
    /// Returns one `(index, commit)` pair per cancelled tile, in grid order,
    /// so each transition can be reported like any other. Does nothing until
    /// cancellation has been requested.
    pub fn cancel_pending(&self) -> Vec<(usize, Commit)> {
        let mut state = self.state.lock();
        if !self.token.is_cancelled() {
            return Vec::new();
        }
        let pending: Vec<usize> = state
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == TileState::Pending)
            .map(|(i, _)| i)
            .collect();

        let mut cancelled = Vec::with_capacity(pending.len());
        for index in pending {
            if state.transition(index, TileState::Cancelled) {
                let commit = Commit {
                    result: TileResult::Cancelled,
                    completed: state.tally.completed(),
                };
                cancelled.push((index, commit));
            }
        }
        if !cancelled.is_empty() {
            debug!(count = cancelled.len(), "Cancelled undispatched tiles");
        }
        cancelled
    }

    pub fn state(&self, index: usize) -> Option<TileState> {
        self.state.lock().tiles.get(index).copied()
    }

    /// Snapshot of every tile's state, in grid order.
    pub fn states(&self) -> Vec<TileState> {
        self.state.lock().tiles.clone()
    }

    pub fn tally(&self) -> DownloadTally {
        let state = self.state.lock();
        DownloadTally {
            was_cancelled: self.token.is_cancelled(),
            ..state.tally
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TilePayload;
    use crate::download::job::tests::{cells, params};

    fn session(count: u32) -> DownloadSession {
        DownloadSession::new(DownloadJob::new(cells(count, 10), 2, params(10)).unwrap())
    }

    fn success() -> Option<TileResponse> {
        Some(TileResponse::Success(TilePayload {
            message: "ok".to_string(),
            image: None,
        }))
    }

    #[test]
    fn test_new_session_all_pending() {
        let session = session(3);
        assert_eq!(session.states(), vec![TileState::Pending; 3]);
        assert_eq!(session.tally().total, 3);
        assert!(!session.is_cancelled());
    }

    #[test]
    fn test_begin_and_commit() {
        let session = session(3);
        assert!(session.begin(0));
        assert_eq!(session.state(0), Some(TileState::InFlight));

        let commit = session.commit(0, success()).unwrap();
        assert!(matches!(commit.result, TileResult::Succeeded(_)));
        assert_eq!(commit.completed, 1);
        assert_eq!(session.state(0), Some(TileState::Succeeded));
    }

    #[test]
    fn test_commit_requires_in_flight() {
        let session = session(2);
        assert!(session.commit(0, success()).is_none());
        assert_eq!(session.state(0), Some(TileState::Pending));
    }

    #[test]
    fn test_double_commit_ignored() {
        let session = session(1);
        session.begin(0);
        session.commit(0, success()).unwrap();
        assert!(session.commit(0, None).is_none());
        assert_eq!(session.tally().succeeded, 1);
        assert_eq!(session.tally().cancelled, 0);
    }

    #[test]
    fn test_failures_classified() {
        let session = session(2);
        session.begin(0);
        session.begin(1);

        let app = session
            .commit(
                0,
                Some(TileResponse::ApplicationError {
                    code: 500,
                    message: "boom".to_string(),
                }),
            )
            .unwrap();
        assert!(matches!(
            app.result,
            TileResult::Failed(TileFailure::Application { code: 500, .. })
        ));

        let transport = session
            .commit(1, Some(TileResponse::TransportError("timeout".to_string())))
            .unwrap();
        assert!(matches!(
            transport.result,
            TileResult::Failed(TileFailure::Transport(_))
        ));
        assert_eq!(session.tally().failed, 2);
    }

    #[test]
    fn test_no_dispatch_after_cancel() {
        let session = session(3);
        session.cancel();
        assert!(!session.begin(0));
        assert_eq!(session.state(0), Some(TileState::Pending));
    }

    #[test]
    fn test_result_after_cancel_is_cancelled() {
        let session = session(2);
        session.begin(0);
        session.cancel();

        let commit = session.commit(0, success()).unwrap();
        assert_eq!(commit.result, TileResult::Cancelled);
        assert_eq!(session.state(0), Some(TileState::Cancelled));
        assert_eq!(session.tally().succeeded, 0);
    }

    #[test]
    fn test_succeeded_stays_succeeded_after_cancel() {
        let session = session(3);
        session.begin(0);
        session.commit(0, success());
        session.cancel();

        let cancelled = session.cancel_pending();
        let indices: Vec<usize> = cancelled.iter().map(|(i, _)| *i).collect();
        let completed: Vec<usize> = cancelled.iter().map(|(_, c)| c.completed).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(completed, vec![2, 3]);
        assert!(cancelled
            .iter()
            .all(|(_, c)| c.result == TileResult::Cancelled));
        assert_eq!(session.state(0), Some(TileState::Succeeded));
        let tally = session.tally();
        assert_eq!(tally.succeeded, 1);
        assert_eq!(tally.cancelled, 2);
        assert!(tally.was_cancelled);
        assert!(tally.is_finished());
    }

    #[test]
    fn test_cancel_pending_without_cancel_is_noop() {
        let session = session(3);
        assert!(session.cancel_pending().is_empty());
        assert_eq!(session.states(), vec![TileState::Pending; 3]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let session = session(1);
        session.cancel();
        session.cancel();
        assert!(session.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let session = session(1);
        session.cancel();
        session.cancelled().await;
    }
}
