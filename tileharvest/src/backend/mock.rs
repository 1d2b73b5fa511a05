//! In-memory backend for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::{
    BackendClient, BackendError, JobParams, TaskStatus, TaskStatusReply, TilePayload, TileRequest,
    TileResponse,
};
use crate::coord::{GeoPoint, TileCoord};

/// How the mock answers one tile.
#[derive(Debug, Clone)]
pub enum MockTile {
    Respond(TileResponse),
    /// Answer after sleeping on the tokio clock.
    Delayed(Duration, TileResponse),
    /// Never answer; only cancellation ends the request.
    Hang,
}

pub fn ok_tile(coord: TileCoord) -> TileResponse {
    TileResponse::Success(TilePayload {
        message: format!("saved {}", coord),
        image: None,
    })
}

type Responder = Box<dyn Fn(TileCoord) -> MockTile + Send + Sync>;

pub struct MockBackend {
    responder: Responder,
    statuses: Mutex<VecDeque<Result<TaskStatusReply, BackendError>>>,
    start_error: Option<BackendError>,
    end_error: Option<BackendError>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub tile_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    /// Job-level calls in the order they arrived.
    pub calls: Mutex<Vec<&'static str>>,
    pub dispatched: Mutex<Vec<TileCoord>>,
    pub points: Mutex<Vec<GeoPoint>>,
}

impl MockBackend {
    /// Every tile succeeds immediately and the task reports completed.
    pub fn new() -> Self {
        Self::with_responder(|coord| MockTile::Respond(ok_tile(coord)))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(TileCoord) -> MockTile + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            statuses: Mutex::new(VecDeque::new()),
            start_error: None,
            end_error: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            tile_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            dispatched: Mutex::new(Vec::new()),
            points: Mutex::new(Vec::new()),
        }
    }

    /// Scripts `/task-status` replies. Once exhausted the task reports completed.
    pub fn with_statuses(
        self,
        statuses: impl IntoIterator<Item = Result<TaskStatusReply, BackendError>>,
    ) -> Self {
        *self.statuses.lock() = statuses.into_iter().collect();
        self
    }

    pub fn failing_start(mut self, error: BackendError) -> Self {
        self.start_error = Some(error);
        self
    }

    pub fn failing_end(mut self, error: BackendError) -> Self {
        self.end_error = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter even when the request future is dropped.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl BackendClient for MockBackend {
    async fn update_point(&self, point: GeoPoint) -> Result<(), BackendError> {
        self.calls.lock().push("/update-point");
        self.points.lock().push(point);
        Ok(())
    }

    async fn start_download(&self, _params: &JobParams) -> Result<(), BackendError> {
        self.calls.lock().push("/start-download");
        match &self.start_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn download_tile(&self, request: &TileRequest<'_>) -> TileResponse {
        self.tile_calls.fetch_add(1, Ordering::SeqCst);
        self.dispatched.lock().push(request.coord);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        match (self.responder)(request.coord) {
            MockTile::Respond(response) => {
                tokio::task::yield_now().await;
                response
            }
            MockTile::Delayed(delay, response) => {
                tokio::time::sleep(delay).await;
                response
            }
            MockTile::Hang => std::future::pending().await,
        }
    }

    async fn end_download(&self, _params: &JobParams) -> Result<(), BackendError> {
        self.calls.lock().push("/end-download");
        match &self.end_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn task_status(&self) -> Result<TaskStatusReply, BackendError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(TaskStatusReply::new(200, TaskStatus::Completed)))
    }
}
