//! Completion Poller
//!
//! Bounded-wait state machine shared by explicit sync (blocking and callback surfaces)
//! and context clearance. The service reconciles asynchronously; the poller repeatedly
//! reads its status until every relevant item is terminal or the deadline passes.
//!
//! ```text
//! Pending -> Polling -> { Succeeded | Failed | TimedOut }
//! ```
//!
//! The poll interval is fixed.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::error::ApiError;

/// Default delay between status reads
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);
/// Default deadline for an explicit sync (150 polls at the default interval)
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(225);
/// Default deadline for a context clear
pub const DEFAULT_CLEAR_TIMEOUT: Duration = Duration::from_secs(60);

/// Poll run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollState {
    Pending,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl PollState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PollState::Succeeded | PollState::Failed | PollState::TimedOut
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PollState::Pending => "pending",
            PollState::Polling => "polling",
            PollState::Succeeded => "succeeded",
            PollState::Failed => "failed",
            PollState::TimedOut => "timed_out",
        }
    }
}

/// What one status read says about the operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Pending,
    Succeeded,
    Failed,
}

/// Result of a poll run. `last` holds the final observation, superseding earlier ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport<T> {
    pub state: PollState,
    pub polls: u32,
    pub elapsed: Duration,
    pub last: Option<T>,
}

impl<T> PollReport<T> {
    pub fn succeeded(&self) -> bool {
        self.state == PollState::Succeeded
    }

    pub fn timed_out(&self) -> bool {
        self.state == PollState::TimedOut
    }
}

/// Fixed-interval, deadline-bounded poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionPoller {
    poll_interval: Duration,
    timeout: Duration,
}

impl Default for CompletionPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_SYNC_TIMEOUT)
    }
}

impl CompletionPoller {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll `check` until it reports a terminal verdict or the deadline passes.
    ///
    /// A terminal verdict or a timeout ends the run with `Ok`; deciding whether a
    /// timeout is fatal is left to the caller. A `check` error ends the run and is
    /// returned unchanged.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut check: F) -> Result<PollReport<T>, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(Verdict, T), ApiError>>,
    {
        let start = Instant::now();
        let mut state = PollState::Pending;
        let mut polls: u32 = 0;
        advance(operation, &mut state, PollState::Polling);

        loop {
            let (verdict, observation) = match check().await {
                Ok(read) => read,
                Err(err) => {
                    warn!(
                        operation = operation,
                        polls = polls,
                        error = %err,
                        "Status read failed, abandoning poll"
                    );
                    return Err(err);
                }
            };
            polls += 1;
            let elapsed = start.elapsed();

            let terminal = match verdict {
                Verdict::Succeeded => Some(PollState::Succeeded),
                Verdict::Failed => Some(PollState::Failed),
                Verdict::Pending => None,
            };
            if let Some(final_state) = terminal {
                advance(operation, &mut state, final_state);
                info!(
                    operation = operation,
                    state = final_state.as_str(),
                    polls = polls,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Poll reached terminal state"
                );
                return Ok(PollReport {
                    state,
                    polls,
                    elapsed,
                    last: Some(observation),
                });
            }

            if elapsed >= self.timeout {
                advance(operation, &mut state, PollState::TimedOut);
                warn!(
                    operation = operation,
                    polls = polls,
                    elapsed_ms = elapsed.as_millis() as u64,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Poll deadline passed before a terminal state"
                );
                return Ok(PollReport {
                    state,
                    polls,
                    elapsed,
                    last: Some(observation),
                });
            }

            let remaining = self.timeout - elapsed;
            debug!(
                operation = operation,
                polls = polls,
                remaining_ms = remaining.as_millis() as u64,
                "Not terminal yet"
            );
            sleep(self.poll_interval.min(remaining)).await;
        }
    }
}

fn advance(operation: &str, state: &mut PollState, next: PollState) {
    debug!(
        operation = operation,
        from = state.as_str(),
        to = next.as_str(),
        "Poll state transition"
    );
    *state = next;
}
