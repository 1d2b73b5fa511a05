//! Bounded-concurrency tile dispatch.
//!
//! The orchestrator keeps a sliding window of tile requests:
//! 1. Dispatch up to `concurrency` tiles in grid order
//! 2. As each completes, commit its result and dispatch the next
//! 3. Once cancelled, stop dispatching, abort what is in flight, and mark
//!    the undispatched remainder cancelled
//!
//! In-flight requests race the session's cancellation; when cancellation
//! wins the request future is dropped, which aborts the HTTP call.

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::progress::{DownloadEvent, DownloadTally, TileResult};
use super::session::DownloadSession;
use crate::backend::{BackendClient, TileRequest, TileResponse};

/// Drives a [`DownloadSession`] against a backend.
pub struct DownloadOrchestrator<B> {
    backend: B,
}

impl<B: BackendClient> DownloadOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetches one tile unless cancellation arrives first.
    async fn fetch(
        &self,
        session: &DownloadSession,
        index: usize,
    ) -> (usize, Option<TileResponse>) {
        let cell = &session.job().tiles()[index];
        let request = TileRequest::new(cell.coord, session.job().params());

        let response = tokio::select! {
            biased;
            _ = session.cancelled() => None,
            response = self.backend.download_tile(&request) => Some(response),
        };
        (index, response)
    }

    /// Runs the session to completion and returns the final tally.
    ///
    /// Every terminal transition is followed by a `Progress` event; a single
    /// `Complete` event carrying the returned tally ends the run. A closed
    /// event receiver does not stop the downloads.
    pub async fn run(
        &self,
        session: &DownloadSession,
        events: &mpsc::UnboundedSender<DownloadEvent>,
    ) -> DownloadTally {
        let total = session.total();
        let limit = session.job().concurrency().max(1);

        info!(
            total,
            parallel = limit,
            zoom = session.job().zoom(),
            "Starting tile downloads"
        );

        let mut in_flight = FuturesUnordered::new();
        let mut next = 0usize;

        loop {
            // Top the window up, in grid order
            while in_flight.len() < limit && next < total {
                if !session.begin(next) {
                    break;
                }
                in_flight.push(self.fetch(session, next));
                next += 1;
            }

            let Some((index, response)) = in_flight.next().await else {
                break;
            };

            let coord = session.job().tiles()[index].coord;
            let Some(commit) = session.commit(index, response) else {
                continue;
            };

            match &commit.result {
                TileResult::Succeeded(payload) => {
                    debug!(tile = %coord, message = %payload.message, "Tile downloaded");
                }
                TileResult::Failed(failure) => {
                    warn!(tile = %coord, error = %failure, "Tile failed");
                }
                TileResult::Cancelled => {
                    debug!(tile = %coord, "Tile cancelled");
                }
            }

            let _ = events.send(DownloadEvent::TileResult {
                coord,
                result: commit.result,
            });
            let _ = events.send(DownloadEvent::Progress {
                completed: commit.completed,
                total,
            });
        }

        // Tiles never dispatched are reported one by one like any other result
        for (index, commit) in session.cancel_pending() {
            let coord = session.job().tiles()[index].coord;
            debug!(tile = %coord, "Tile cancelled before dispatch");
            let _ = events.send(DownloadEvent::TileResult {
                coord,
                result: commit.result,
            });
            let _ = events.send(DownloadEvent::Progress {
                completed: commit.completed,
                total,
            });
        }

        let tally = session.tally();
        if tally.was_cancelled {
            info!(
                succeeded = tally.succeeded,
                failed = tally.failed,
                cancelled = tally.cancelled,
                "Tile downloads cancelled"
            );
        } else {
            info!(
                succeeded = tally.succeeded,
                failed = tally.failed,
                total,
                "Tile downloads complete"
            );
        }

        let _ = events.send(DownloadEvent::Complete(tally));
        tally
    }
}
