//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`snap`] - Snap a region to a square of whole tiles
//! - [`grid`] - List the tiles covering a region
//! - [`sources`] - List built-in tile sources
//! - [`download`] - Download a region through the backend and wait for generation
//! - [`status`] - Query the backend's generation task

pub mod common;
pub mod download;
pub mod grid;
pub mod progress;
pub mod snap;
pub mod sources;
pub mod status;
