//! Generation task status polling
//!
//! After a job's tiles are all terminal the backend starts a generation task.
//! [`TaskPoller`] queries its status at a fixed interval until it completes,
//! reports something unexpected, or the caller gives up.
//!
//! ```text
//!            in_progress
//!           ┌──────────┐
//!           ▼          │
//! ──► Polling ─────────┴──► Completed
//!      │   ▲   other status / bad code
//!      │   │  ─────────────────────────► Unexpected
//!      ▼   │
//!  ErroredRetrying   (query failed, retried after the interval)
//! ```

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{BackendClient, BackendError, TaskStatus, SUCCESS_CODE};

/// Default delay between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound on a single status query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the poller currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Polling,
    Completed,
    Unexpected,
    ErroredRetrying,
}

impl PollState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PollState::Completed | PollState::Unexpected)
    }
}

/// Notifications emitted while polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// The task is still running.
    InProgress { attempt: u32 },
    /// The task finished.
    Completed { attempt: u32 },
    /// The reply was not understood; polling stops.
    Unexpected { reason: String },
    /// The query failed; another follows after the interval.
    Retrying { attempt: u32, error: String },
}

impl PollEvent {
    /// State the poller is in after this event.
    pub fn state(&self) -> PollState {
        match self {
            PollEvent::InProgress { .. } => PollState::Polling,
            PollEvent::Completed { .. } => PollState::Completed,
            PollEvent::Unexpected { .. } => PollState::Unexpected,
            PollEvent::Retrying { .. } => PollState::ErroredRetrying,
        }
    }
}

/// How polling ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    Unexpected(String),
    /// The caller cancelled before a terminal state was reached.
    Abandoned,
}

/// Polls `/task-status` until the generation task settles.
pub struct TaskPoller<B> {
    backend: B,
    interval: Duration,
    query_timeout: Duration,
    state: Mutex<PollState>,
}

impl<B: BackendClient> TaskPoller<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            interval: DEFAULT_POLL_INTERVAL,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            state: Mutex::new(PollState::Polling),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> PollState {
        *self.state.lock()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn emit(&self, events: &mpsc::UnboundedSender<PollEvent>, event: PollEvent) {
        *self.state.lock() = event.state();
        let _ = events.send(event);
    }

    async fn query(&self) -> Result<(i64, Option<TaskStatus>), BackendError> {
        match tokio::time::timeout(self.query_timeout, self.backend.task_status()).await {
            Ok(reply) => reply.map(|r| (r.code, r.status)),
            Err(_) => Err(BackendError::Transport {
                endpoint: "/task-status",
                reason: format!("timed out after {:?}", self.query_timeout),
            }),
        }
    }

    /// Polls until a terminal state or until `cancel` fires.
    ///
    /// Query failures are retried indefinitely at the poll interval.
    pub async fn run(
        &self,
        events: &mpsc::UnboundedSender<PollEvent>,
        cancel: &CancellationToken,
    ) -> PollOutcome {
        *self.state.lock() = PollState::Polling;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.abandon(attempt),
                reply = self.query() => reply,
            };

            match reply {
                Ok((code, _)) if code != SUCCESS_CODE => {
                    let reason = format!("Unexpected response code: {}", code);
                    warn!(code, "Task status query returned an error code");
                    self.emit(events, PollEvent::Unexpected { reason: reason.clone() });
                    return PollOutcome::Unexpected(reason);
                }
                Ok((_, Some(TaskStatus::Completed))) => {
                    info!(attempt, "Generation task completed");
                    self.emit(events, PollEvent::Completed { attempt });
                    return PollOutcome::Completed;
                }
                Ok((_, Some(TaskStatus::InProgress))) => {
                    debug!(attempt, "Generation task in progress");
                    self.emit(events, PollEvent::InProgress { attempt });
                }
                Ok((_, status)) => {
                    let reason = match status {
                        Some(TaskStatus::Other(s)) => format!("Unexpected status: {}", s),
                        _ => "Task status reply carried no status".to_string(),
                    };
                    warn!(%reason, "Generation task reported an unexpected status");
                    self.emit(events, PollEvent::Unexpected { reason: reason.clone() });
                    return PollOutcome::Unexpected(reason);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Error while checking task status, retrying");
                    self.emit(
                        events,
                        PollEvent::Retrying {
                            attempt,
                            error: e.to_string(),
                        },
                    );
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.abandon(attempt),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    fn abandon(&self, attempt: u32) -> PollOutcome {
        info!(attempt, state = ?self.state(), "Task polling abandoned");
        PollOutcome::Abandoned
    }
}
