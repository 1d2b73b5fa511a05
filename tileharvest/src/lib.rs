//! Tileharvest - tile-aligned region download for world generation
//!
//! This library turns a selected map region into a tile-aligned square,
//! enumerates the tiles covering it, downloads them through a tile backend
//! with bounded concurrency, and then waits for the backend's generation
//! task to finish.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use tileharvest::backend::ReqwestBackend;
//! use tileharvest::download::DownloadSession;
//! use tileharvest::workflow::{prepare, DownloadRequest, Workflow};
//!
//! let prepared = prepare(&request)?;
//! let session = DownloadSession::new(prepared.job);
//! let backend = Arc::new(ReqwestBackend::new("http://localhost:8080")?);
//! let outcome = Workflow::new(backend)
//!     .run(&session, &download_tx, &poll_tx, &stop_polling)
//!     .await?;
//! ```

pub mod backend;
pub mod config;
pub mod coord;
pub mod download;
pub mod grid;
pub mod logging;
pub mod poller;
pub mod region;
pub mod sources;
pub mod workflow;

/// Version of the tileharvest library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
