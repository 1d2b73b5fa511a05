//! Tile download orchestration
//!
//! A [`DownloadJob`] is validated up front and handed to a
//! [`DownloadSession`], which owns all mutable state for that job. The
//! [`DownloadOrchestrator`] dispatches the job's tiles against a
//! [`BackendClient`](crate::backend::BackendClient) with at most
//! `concurrency` requests in flight, reporting through [`DownloadEvent`]s.
//!
//! # Example
//!
//! ```ignore
//! use tileharvest::download::{DownloadJob, DownloadOrchestrator, DownloadSession};
//!
//! let job = DownloadJob::new(cells, 4, params)?;
//! let session = DownloadSession::new(job);
//! let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//! let tally = DownloadOrchestrator::new(backend).run(&session, &tx).await;
//! ```

mod job;
mod orchestrator;
mod progress;
mod session;
mod state;

pub use job::{DownloadJob, JobError};
pub use orchestrator::DownloadOrchestrator;
pub use progress::{DownloadEvent, DownloadTally, TileFailure, TileResult};
pub use session::{Commit, DownloadSession};
pub use state::TileState;
