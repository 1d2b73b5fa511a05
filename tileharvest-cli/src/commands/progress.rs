//! Terminal progress display driven by download and polling events.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tileharvest::download::{DownloadEvent, TileResult};
use tileharvest::poller::PollEvent;
use tokio::sync::mpsc;

const BAR_TEMPLATE: &str =
    "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tiles {msg}";

/// Tile progress bar.
pub struct DownloadProgress {
    bar: ProgressBar,
    failed: usize,
}

impl DownloadProgress {
    pub fn new(total: usize) -> Self {
        Self::with_bar(ProgressBar::new(total as u64))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar, failed: 0 }
    }

    pub fn handle(&mut self, event: &DownloadEvent) {
        match event {
            DownloadEvent::TileResult {
                coord,
                result: TileResult::Failed(failure),
            } => {
                self.failed += 1;
                self.bar.println(format!("tile {}: {}", coord, failure));
                self.bar.set_message(format!("({} failed)", self.failed));
            }
            DownloadEvent::TileResult { .. } => {}
            DownloadEvent::Progress { completed, .. } => {
                self.bar.set_position(*completed as u64);
            }
            DownloadEvent::Complete(tally) if tally.was_cancelled => {
                self.bar.abandon_with_message(format!("cancelled: {}", tally));
            }
            DownloadEvent::Complete(tally) => {
                self.bar.finish_with_message(tally.to_string());
            }
        }
    }

    /// Drains `events` until the sender side is dropped.
    pub async fn drive(mut self, mut events: mpsc::UnboundedReceiver<DownloadEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(&event);
        }
    }
}

/// Spinner shown while waiting for the generation task.
pub struct PollProgress {
    spinner: ProgressBar,
}

impl PollProgress {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message("Waiting for world generation...");
        Self { spinner }
    }

    pub fn handle(&self, event: &PollEvent) {
        match event {
            PollEvent::InProgress { attempt } => self
                .spinner
                .set_message(format!("World generation in progress (check {})", attempt)),
            PollEvent::Retrying { attempt, error } => self.spinner.set_message(format!(
                "Status check {} failed, retrying: {}",
                attempt, error
            )),
            PollEvent::Completed { .. } => {
                self.spinner.finish_with_message("World generation completed")
            }
            PollEvent::Unexpected { reason } => self.spinner.abandon_with_message(reason.clone()),
        }
    }

    pub async fn drive(self, mut events: mpsc::UnboundedReceiver<PollEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(&event);
        }
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
