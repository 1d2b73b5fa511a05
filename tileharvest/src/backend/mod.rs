//! Tile backend abstraction
//!
//! The backend is the HTTP service that fetches tiles from the configured
//! source, stores them, and runs a generation task once a job is finished.
//! [`BackendClient`] is the seam the download and polling code are written
//! against; [`ReqwestBackend`] is the real implementation.

mod http;
#[cfg(test)]
pub mod mock;
mod types;

pub use http::{ReqwestBackend, DEFAULT_TIMEOUT};
pub use types::{
    BackendError, JobParams, OutputTarget, TaskStatus, TaskStatusReply, TilePayload, TileRequest,
    TileResponse, SUCCESS_CODE,
};

use std::future::Future;

use crate::coord::GeoPoint;

/// Asynchronous operations offered by the tile backend.
pub trait BackendClient: Send + Sync {
    /// Announces the launch location. The reply carries nothing of interest.
    fn update_point(
        &self,
        point: GeoPoint,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Opens a job. Must succeed before any tile is requested.
    fn start_download(
        &self,
        params: &JobParams,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Fetches one tile. Never fails outright; failures are typed in the response.
    fn download_tile(&self, request: &TileRequest<'_>) -> impl Future<Output = TileResponse> + Send;

    /// Closes a job whose tiles all reached a terminal state.
    fn end_download(
        &self,
        params: &JobParams,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Queries the generation task started by `end_download`.
    fn task_status(&self) -> impl Future<Output = Result<TaskStatusReply, BackendError>> + Send;
}

impl<T: BackendClient> BackendClient for std::sync::Arc<T> {
    fn update_point(
        &self,
        point: GeoPoint,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        (**self).update_point(point)
    }

    fn start_download(
        &self,
        params: &JobParams,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        (**self).start_download(params)
    }

    fn download_tile(
        &self,
        request: &TileRequest<'_>,
    ) -> impl Future<Output = TileResponse> + Send {
        (**self).download_tile(request)
    }

    fn end_download(
        &self,
        params: &JobParams,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        (**self).end_download(params)
    }

    fn task_status(&self) -> impl Future<Output = Result<TaskStatusReply, BackendError>> + Send {
        (**self).task_status()
    }
}
