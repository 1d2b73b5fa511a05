//! Status command - query the backend's world generation task.

use tileharvest::backend::{BackendClient, TaskStatus};
use tileharvest::poller::{PollOutcome, TaskPoller};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::progress::PollProgress;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the status command.
pub struct StatusArgs {
    pub server: Option<String>,
    /// Keep polling until the task settles
    pub wait: bool,
}

/// Run the status command.
pub fn run(args: StatusArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("status");

    let download_config = runner.config().download_config();
    let backend = runner.create_backend(args.server, &download_config)?;
    let runtime = runner.runtime()?;

    if !args.wait {
        let reply = runtime.block_on(backend.task_status())?;
        let status = match reply.status {
            Some(TaskStatus::InProgress) => "in progress".to_string(),
            Some(TaskStatus::Completed) => "completed".to_string(),
            Some(TaskStatus::Other(s)) => s,
            None => "(none)".to_string(),
        };
        println!("Code:   {}", reply.code);
        println!("Status: {}", status);
        return Ok(());
    }

    let stop = CancellationToken::new();
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.cancel()).map_err(|e| CliError::Signal(e.to_string()))?;
    }

    let poller = TaskPoller::new(backend).with_interval(download_config.poll_interval());
    let outcome = runtime.block_on(async {
        let (tx, rx) = mpsc::unbounded_channel();
        let view = tokio::spawn(PollProgress::new().drive(rx));
        let outcome = poller.run(&tx, &stop).await;
        drop(tx);
        let _ = view.await;
        outcome
    });

    match outcome {
        PollOutcome::Completed => Ok(()),
        PollOutcome::Abandoned => {
            println!("Stopped waiting.");
            Ok(())
        }
        PollOutcome::Unexpected(reason) => Err(CliError::Task(reason)),
    }
}
