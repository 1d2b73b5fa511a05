//! Download command - snap a region, download its tiles through the backend
//! and wait for world generation.

use std::sync::Arc;

use tileharvest::backend::OutputTarget;
use tileharvest::coord::GeoPoint;
use tileharvest::download::DownloadSession;
use tileharvest::poller::PollOutcome;
use tileharvest::workflow::{prepare, DownloadRequest, Workflow};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{resolve_source_template, resolve_zoom, RegionArgs};
use super::progress::{DownloadProgress, PollProgress};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the download command.
pub struct DownloadArgs {
    pub region: RegionArgs,
    pub zoom: Option<u8>,
    pub parallel: Option<usize>,
    pub timeout: Option<u64>,
    pub server: Option<String>,
    pub output: Option<String>,
    pub source: Option<String>,
    pub launch: Option<GeoPoint>,
}

/// Run the download command.
pub fn run(args: DownloadArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("download");
    let config = runner.config();

    // Resolve settings from CLI and config
    let zoom = resolve_zoom(args.zoom, config)?;
    let mut download_config = config.download_config();
    if let Some(parallel) = args.parallel {
        download_config = download_config.with_parallel_downloads(parallel);
    }
    if let Some(timeout) = args.timeout {
        download_config = download_config.with_timeout_secs(timeout);
    }

    let request = DownloadRequest {
        region: args.region.to_region()?,
        zoom,
        parallel: download_config.parallel_downloads(),
        output: OutputTarget::new(args.output.unwrap_or_else(|| config.output.directory.clone())),
        source: resolve_source_template(args.source, config),
        launch_point: args.launch,
    };
    let prepared = prepare(&request)?;
    let backend = runner.create_backend(args.server, &download_config)?;

    println!("Tileharvest v{}", tileharvest::VERSION);
    println!("==================");
    println!();
    println!("Backend:    {}", backend.base_url());
    println!("Zoom:       {}", zoom);
    println!(
        "Square:     {}x{} tiles",
        prepared.snapped.size(),
        prepared.snapped.size()
    );
    println!("Bounds:     {}", prepared.snapped.bounds());
    println!("Launch:     {}", prepared.job.params().launch_location);
    println!("Tiles:      {}", prepared.job.len());
    println!("Parallel:   {}", prepared.job.concurrency());
    println!("Output:     {}", prepared.job.output().directory);
    println!();
    println!("Press Ctrl+C to cancel");
    println!();

    let total = prepared.job.len();
    let session = Arc::new(DownloadSession::new(prepared.job));
    let stop_polling = CancellationToken::new();

    // Set up signal handler for cancellation
    {
        let session = Arc::clone(&session);
        let stop_polling = stop_polling.clone();
        ctrlc::set_handler(move || {
            eprintln!();
            eprintln!("Received interrupt, cancelling download...");
            session.cancel();
            stop_polling.cancel();
        })
        .map_err(|e| CliError::Signal(e.to_string()))?;
    }

    let workflow = Workflow::new(backend).with_poll_interval(download_config.poll_interval());
    let runtime = runner.runtime()?;

    let outcome = runtime.block_on(async {
        let (download_tx, download_rx) = mpsc::unbounded_channel();
        let (poll_tx, poll_rx) = mpsc::unbounded_channel();

        let download_view = tokio::spawn(DownloadProgress::new(total).drive(download_rx));
        // Spinner only appears once polling actually starts
        let poll_view = tokio::spawn(async move {
            let mut poll_rx = poll_rx;
            if let Some(first) = poll_rx.recv().await {
                let progress = PollProgress::new();
                progress.handle(&first);
                progress.drive(poll_rx).await;
            }
        });

        let outcome = workflow
            .run(&session, &download_tx, &poll_tx, &stop_polling)
            .await;

        drop(download_tx);
        drop(poll_tx);
        let _ = download_view.await;
        let _ = poll_view.await;
        outcome
    })?;

    info!(tally = %outcome.tally, poll = ?outcome.poll, "Download workflow finished");

    println!();
    println!("Download Summary");
    println!("────────────────");
    println!("  Succeeded: {}", outcome.tally.succeeded);
    println!("  Failed:    {}", outcome.tally.failed);
    println!("  Cancelled: {}", outcome.tally.cancelled);
    println!();

    match outcome.poll {
        None => println!("Download cancelled; world generation was not started."),
        Some(PollOutcome::Completed) => println!("World generation completed."),
        Some(PollOutcome::Unexpected(reason)) => {
            println!("World generation stopped: {}", reason)
        }
        Some(PollOutcome::Abandoned) => {
            println!("Stopped waiting; world generation continues on the backend.")
        }
    }

    Ok(())
}
