//! End-to-end download workflow.
//!
//! 1. [`prepare`] snaps the selection, enumerates the grid and builds a
//!    validated [`DownloadJob`]. Nothing touches the network.
//! 2. [`Workflow::run`] announces the launch location, opens the job on the
//!    backend, downloads every tile, and, unless the job was cancelled,
//!    closes it and waits for the generation task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::backend::{BackendClient, BackendError, JobParams, OutputTarget};
use crate::coord::{CoordError, GeoPoint};
use crate::download::{
    DownloadEvent, DownloadJob, DownloadOrchestrator, DownloadSession, DownloadTally, JobError,
};
use crate::grid::GridBuilder;
use crate::poller::{PollEvent, PollOutcome, TaskPoller, DEFAULT_POLL_INTERVAL};
use crate::region::{launch_location, snap, Region, SelectionError, SnappedRegion};

/// Errors that stop a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error("backend refused to start the download: {0}")]
    StartDownload(#[source] BackendError),

    #[error("backend failed to finish the download: {0}")]
    EndDownload(#[source] BackendError),
}

/// What the operator asked for.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub region: Region,
    pub zoom: u8,
    pub parallel: usize,
    pub output: OutputTarget,
    /// Tile source URL template.
    pub source: String,
    /// Operator-chosen launch point; the region centre when absent.
    pub launch_point: Option<GeoPoint>,
}

/// A validated job and the square it was built from.
#[derive(Debug, Clone)]
pub struct PreparedJob {
    pub snapped: SnappedRegion,
    pub job: DownloadJob,
}

/// Snaps the request's region and builds the job for it.
pub fn prepare(request: &DownloadRequest) -> Result<PreparedJob, WorkflowError> {
    let snapped = snap(&request.region.bounds(), request.zoom)?;
    let region = snapped.to_region();
    let cells = GridBuilder::new(request.zoom)?.build(&region);

    let bounds = snapped.bounds();
    let params = JobParams {
        max_zoom: request.zoom,
        output: request.output.clone(),
        source: request.source.clone(),
        timestamp: Utc::now().timestamp_millis(),
        bounds,
        center: bounds.center(),
        launch_location: launch_location(&bounds, request.launch_point),
        area_m2: region.area_m2(),
    };

    info!(
        zoom = request.zoom,
        square = snapped.size(),
        tiles = cells.len(),
        bounds = %bounds,
        "Prepared download job"
    );

    let job = DownloadJob::new(cells, request.parallel, params)?;
    Ok(PreparedJob { snapped, job })
}

/// Final result of a workflow run.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowOutcome {
    pub tally: DownloadTally,
    /// `None` when the job was cancelled and polling never started.
    pub poll: Option<PollOutcome>,
}

/// Runs jobs against one backend.
pub struct Workflow<B> {
    backend: Arc<B>,
    poll_interval: Duration,
}

impl<B: BackendClient> Workflow<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Runs `session` through the full backend protocol.
    ///
    /// `stop_polling` abandons the status polling phase; cancelling the
    /// session itself is done through [`DownloadSession::cancel`].
    pub async fn run(
        &self,
        session: &DownloadSession,
        download_events: &mpsc::UnboundedSender<DownloadEvent>,
        poll_events: &mpsc::UnboundedSender<PollEvent>,
        stop_polling: &CancellationToken,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let params = session.job().params();
        let orchestrator = DownloadOrchestrator::new(Arc::clone(&self.backend));

        // A job cancelled before it starts never reaches the backend
        if session.is_cancelled() {
            info!("Download cancelled before start, backend not contacted");
            let tally = orchestrator.run(session, download_events).await;
            return Ok(WorkflowOutcome { tally, poll: None });
        }

        if let Err(e) = self.backend.update_point(params.launch_location).await {
            warn!(error = %e, "Failed to announce launch location");
        }

        self.backend
            .start_download(params)
            .await
            .map_err(WorkflowError::StartDownload)?;

        let tally = orchestrator.run(session, download_events).await;

        if tally.was_cancelled {
            info!("Download cancelled, skipping world generation");
            return Ok(WorkflowOutcome { tally, poll: None });
        }

        self.backend
            .end_download(params)
            .await
            .map_err(WorkflowError::EndDownload)?;
        info!("Starting world generation");

        let poller = TaskPoller::new(Arc::clone(&self.backend)).with_interval(self.poll_interval);
        let poll = poller.run(poll_events, stop_polling).await;

        Ok(WorkflowOutcome {
            tally,
            poll: Some(poll),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::backend::mock::{ok_tile, MockBackend, MockTile};
    use crate::backend::{TaskStatus, TaskStatusReply};
    use crate::download::TileResult;
    use crate::coord::{tile_x_to_lon, tile_y_to_lat, BoundingBox};

    /// A selection spanning tiles 300..=302 by 380..=383 at zoom 10.
    fn request(parallel: usize) -> DownloadRequest {
        let zoom = 10;
        let bounds = BoundingBox::new(
            tile_x_to_lon(300, zoom) + 0.01,
            tile_y_to_lat(383, zoom) + 0.01,
            tile_x_to_lon(302, zoom) + 0.01,
            tile_y_to_lat(380, zoom) - 0.01,
        );
        DownloadRequest {
            region: Region::from_bounds(&bounds),
            zoom,
            parallel,
            output: OutputTarget::new("world"),
            source: "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            launch_point: None,
        }
    }

    #[test]
    fn test_prepare_builds_job_from_snapped_square() {
        let prepared = prepare(&request(4)).unwrap();

        assert_eq!(prepared.snapped.size(), 2);
        assert_eq!(prepared.job.len(), 9);
        assert_eq!(prepared.job.zoom(), 10);

        let params = prepared.job.params();
        assert_eq!(params.bounds, prepared.snapped.bounds());
        assert_eq!(params.center, params.bounds.center());
        assert_eq!(params.launch_location, params.center);
        assert!(params.area_m2 > 0.0);
        assert!(params.timestamp > 0);
    }

    #[test]
    fn test_prepare_clamps_launch_point() {
        let mut req = request(4);
        req.launch_point = Some(GeoPoint::new(89.0, 179.0));
        let prepared = prepare(&req).unwrap();

        let params = prepared.job.params();
        assert!(params.bounds.contains(&params.launch_location));
        assert_eq!(params.launch_location.latitude, params.bounds.north());
        assert_eq!(params.launch_location.longitude, params.bounds.east());
    }

    #[test]
    fn test_prepare_rejects_zero_parallel() {
        assert!(matches!(
            prepare(&request(0)),
            Err(WorkflowError::Job(JobError::ZeroConcurrency))
        ));
    }

    #[test]
    fn test_prepare_rejects_degenerate_selection() {
        let mut req = request(4);
        req.region = Region::from_bounds(&BoundingBox::new(10.0, 10.0, 10.001, 10.001));
        assert!(matches!(
            prepare(&req),
            Err(WorkflowError::Selection(SelectionError::Degenerate { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run() {
        let backend = Arc::new(MockBackend::new().with_statuses([
            Ok(TaskStatusReply::new(200, TaskStatus::InProgress)),
            Ok(TaskStatusReply::new(200, TaskStatus::Completed)),
        ]));
        let session = DownloadSession::new(prepare(&request(4)).unwrap().job);
        let (dtx, _drx) = mpsc::unbounded_channel();
        let (ptx, _prx) = mpsc::unbounded_channel();

        let outcome = Workflow::new(Arc::clone(&backend))
            .run(&session, &dtx, &ptx, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.tally.succeeded, 9);
        assert_eq!(outcome.poll, Some(PollOutcome::Completed));
        assert_eq!(
            backend.calls(),
            vec!["/update-point", "/start-download", "/end-download"]
        );
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_start_failure_dispatches_nothing() {
        let backend = Arc::new(MockBackend::new().failing_start(BackendError::HttpStatus {
            endpoint: "/start-download",
            status: 500,
        }));
        let session = DownloadSession::new(prepare(&request(4)).unwrap().job);
        let (dtx, _drx) = mpsc::unbounded_channel();
        let (ptx, _prx) = mpsc::unbounded_channel();

        let result = Workflow::new(Arc::clone(&backend))
            .run(&session, &dtx, &ptx, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(WorkflowError::StartDownload(_))));
        assert_eq!(backend.tile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_end_failure_is_reported() {
        let backend = Arc::new(MockBackend::new().failing_end(BackendError::Transport {
            endpoint: "/end-download",
            reason: "reset".to_string(),
        }));
        let session = DownloadSession::new(prepare(&request(4)).unwrap().job);
        let (dtx, _drx) = mpsc::unbounded_channel();
        let (ptx, _prx) = mpsc::unbounded_channel();

        let result = Workflow::new(Arc::clone(&backend))
            .run(&session, &dtx, &ptx, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(WorkflowError::EndDownload(_))));
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_job_skips_end_and_polling() {
        let backend = Arc::new(MockBackend::with_responder(|coord| {
            if coord.x == 300 {
                MockTile::Respond(ok_tile(coord))
            } else {
                MockTile::Hang
            }
        }));
        let session = DownloadSession::new(prepare(&request(2)).unwrap().job);
        let (dtx, mut drx) = mpsc::unbounded_channel();
        let (ptx, _prx) = mpsc::unbounded_channel();

        let workflow = Workflow::new(Arc::clone(&backend));
        let stop_polling = CancellationToken::new();
        let run = workflow.run(&session, &dtx, &ptx, &stop_polling);
        let cancel_on_first = async {
            while let Some(event) = drx.recv().await {
                if matches!(event, DownloadEvent::Progress { .. }) {
                    session.cancel();
                    break;
                }
            }
        };
        let (result, _) = tokio::join!(run, cancel_on_first);

        let outcome = result.unwrap();
        assert!(outcome.tally.was_cancelled);
        assert_eq!(outcome.poll, None);
        assert!(!backend.calls().contains(&"/end-download"));
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_backend_calls() {
        let backend = Arc::new(MockBackend::new());
        let session = DownloadSession::new(prepare(&request(2)).unwrap().job);
        let total = session.total();
        session.cancel();
        let (dtx, mut drx) = mpsc::unbounded_channel();
        let (ptx, _prx) = mpsc::unbounded_channel();

        let workflow = Workflow::new(Arc::clone(&backend));
        let stop_polling = CancellationToken::new();
        let outcome = workflow
            .run(&session, &dtx, &ptx, &stop_polling)
            .await
            .unwrap();

        assert!(backend.calls().is_empty());
        assert_eq!(backend.tile_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.poll, None);
        assert_eq!(outcome.tally.cancelled, total);

        let mut cancelled = 0;
        let mut last = None;
        while let Ok(event) = drx.try_recv() {
            if let DownloadEvent::TileResult {
                result: TileResult::Cancelled,
                ..
            } = event
            {
                cancelled += 1;
            }
            last = Some(event);
        }
        assert_eq!(cancelled, total);
        assert!(matches!(last, Some(DownloadEvent::Complete(_))));
    }
}
