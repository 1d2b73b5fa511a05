//! Download job definition and validation.

use thiserror::Error;

use crate::backend::{JobParams, OutputTarget};
use crate::grid::GridCell;

/// Reasons a job is rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("region contains no tiles")]
    NoTiles,

    #[error("parallel downloads must be at least 1")]
    ZeroConcurrency,

    #[error("tile {tile} is at zoom {found}, job zoom is {expected}")]
    ZoomMismatch { tile: String, expected: u8, found: u8 },
}

/// Tiles to fetch plus everything the backend needs to know about the job.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    tiles: Vec<GridCell>,
    concurrency: usize,
    params: JobParams,
}

impl DownloadJob {
    /// Validates and builds a job. The grid is moved in.
    pub fn new(
        tiles: Vec<GridCell>,
        concurrency: usize,
        params: JobParams,
    ) -> Result<Self, JobError> {
        if tiles.is_empty() {
            return Err(JobError::NoTiles);
        }
        if concurrency == 0 {
            return Err(JobError::ZeroConcurrency);
        }
        if let Some(cell) = tiles.iter().find(|c| c.coord.z != params.max_zoom) {
            return Err(JobError::ZoomMismatch {
                tile: cell.coord.to_string(),
                expected: params.max_zoom,
                found: cell.coord.z,
            });
        }

        Ok(Self {
            tiles,
            concurrency,
            params,
        })
    }

    pub fn tiles(&self) -> &[GridCell] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn zoom(&self) -> u8 {
        self.params.max_zoom
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn output(&self) -> &OutputTarget {
        &self.params.output
    }

    pub fn params(&self) -> &JobParams {
        &self.params
    }
}
