//! Fixed-interval status polling bound to one upload session.
//!
//! Each session gets its own task and cancellation token. Replacing the
//! session cancels the token, so a response that lands late is dropped
//! instead of overwriting the new session's state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::logging::{log_debug, log_info, log_warn, COMPONENT_POLLER};

use super::{ProcessingStatus, StatusSource};

#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub file_identifier: String,
    pub status: ProcessingStatus,
}

/// How a poll loop ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Queries that came back, successfully or not
    pub queries: u32,
    pub failures: u32,
    pub completed: bool,
}

#[derive(Clone)]
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    interval: Duration,
}

impl std::fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("source", &"<status source>")
            .field("interval", &self.interval)
            .finish()
    }
}

impl StatusPoller {
    pub fn new(source: Arc<dyn StatusSource>, interval: Duration) -> Self {
        Self { source, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the poll loop. The first query happens one interval from now.
    pub fn start(
        &self,
        file_identifier: String,
        updates: mpsc::UnboundedSender<StatusUpdate>,
    ) -> PollerHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            self.interval,
            file_identifier.clone(),
            updates,
            token.clone(),
        ));

        log_debug(
            COMPONENT_POLLER,
            &format!("Polling {} every {:?}", file_identifier, self.interval),
        )
        .unwrap_or_default();

        PollerHandle {
            file_identifier,
            token,
            task,
        }
    }
}

async fn poll_loop(
    source: Arc<dyn StatusSource>,
    period: Duration,
    file_identifier: String,
    updates: mpsc::UnboundedSender<StatusUpdate>,
    token: CancellationToken,
) -> PollSummary {
    let mut summary = PollSummary::default();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = source.processing_status(&file_identifier) => {
                summary.queries += 1;
                result
            }
        };

        match result {
            Ok(status) => {
                if token.is_cancelled() {
                    break;
                }

                let completed = status.is_completed();
                let update = StatusUpdate {
                    file_identifier: file_identifier.clone(),
                    status,
                };
                if updates.send(update).is_err() {
                    // Nobody is listening any more
                    break;
                }

                if completed {
                    summary.completed = true;
                    log_info(
                        COMPONENT_POLLER,
                        &format!("✓ Processing completed for {}", file_identifier),
                    )
                    .unwrap_or_default();
                    break;
                }
            }
            Err(e) => {
                summary.failures += 1;
                log_warn(
                    COMPONENT_POLLER,
                    &format!("Error checking file status for {}: {}", file_identifier, e),
                )
                .unwrap_or_default();
            }
        }
    }

    summary
}

/// Owner of one running poll loop
#[derive(Debug)]
pub struct PollerHandle {
    file_identifier: String,
    token: CancellationToken,
    task: JoinHandle<PollSummary>,
}

impl PollerHandle {
    pub fn file_identifier(&self) -> &str {
        &self.file_identifier
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to end on its own (completion or cancellation)
    pub async fn join(mut self) -> PollSummary {
        (&mut self.task).await.unwrap_or_default()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
