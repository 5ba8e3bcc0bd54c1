//! Explicit context sync: one trigger-and-poll operation behind two surfaces.
//!
//! Wait mode awaits the poll in the caller's task. Callback mode returns once the
//! trigger is accepted and runs the same poll on a spawned task, handing the result to
//! the caller's `on_complete`.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::context::status::{self, SyncScope, SyncStatus, SyncStatusEntry};
use crate::error::ApiError;
use crate::poller::{CompletionPoller, PollState};
use crate::session::Session;

/// Completion callback for [`SyncMode::Callback`]; invoked exactly once.
pub type OnComplete = Box<dyn FnOnce(SyncResult) + Send + 'static>;

/// How [`Session::sync`] waits for the triggered cycle
pub enum SyncMode {
    /// Poll in the caller's task. `None` uses the configured sync timeout.
    Wait { timeout: Option<Duration> },
    /// Poll on a background task and report through `on_complete`.
    Callback {
        timeout: Option<Duration>,
        on_complete: OnComplete,
    },
}

impl SyncMode {
    pub fn wait() -> Self {
        SyncMode::Wait { timeout: None }
    }

    pub fn wait_for(timeout: Duration) -> Self {
        SyncMode::Wait {
            timeout: Some(timeout),
        }
    }

    pub fn callback<F>(on_complete: F) -> Self
    where
        F: FnOnce(SyncResult) + Send + 'static,
    {
        SyncMode::Callback {
            timeout: None,
            on_complete: Box::new(on_complete),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            SyncMode::Wait { .. } => SyncMode::Wait {
                timeout: Some(timeout),
            },
            SyncMode::Callback { on_complete, .. } => SyncMode::Callback {
                timeout: Some(timeout),
                on_complete,
            },
        }
    }
}

impl fmt::Debug for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Wait { timeout } => f.debug_struct("Wait").field("timeout", timeout).finish(),
            SyncMode::Callback { timeout, .. } => f
                .debug_struct("Callback")
                .field("timeout", timeout)
                .finish_non_exhaustive(),
        }
    }
}

/// Service acknowledgement of a sync trigger
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAck {
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Outcome of an explicit sync cycle.
///
/// `success` is true only when every relevant path succeeded. Per-path failures and
/// timeouts are reported here rather than raised; inspect `entries` for detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub success: bool,
    pub state: PollState,
    /// Last observed status of every relevant path
    pub entries: Vec<SyncStatusEntry>,
    pub polls: u32,
    pub elapsed: Duration,
    pub message: Option<String>,
    /// Request id of the trigger
    pub request_id: Option<String>,
}

impl SyncResult {
    pub fn failed_entries(&self) -> impl Iterator<Item = &SyncStatusEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == SyncStatus::Failed)
    }

    /// Result delivered to a callback when a status read fails mid-poll.
    fn from_error(err: &ApiError, request_id: Option<String>) -> Self {
        Self {
            success: false,
            state: PollState::Failed,
            entries: Vec::new(),
            polls: 0,
            elapsed: Duration::ZERO,
            message: Some(format!("Status polling failed: {}", err)),
            request_id,
        }
    }
}

/// Handle to a callback-mode sync whose poll is still running.
///
/// Dropping the handle does not stop the poll; [`abandon`](Self::abandon) does.
#[derive(Debug)]
pub struct PendingSync {
    ack: SyncAck,
    handle: JoinHandle<()>,
}

impl PendingSync {
    pub fn ack(&self) -> &SyncAck {
        &self.ack
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop waiting locally. The remote sync is not cancelled and the callback will
    /// not run.
    pub fn abandon(self) {
        self.handle.abort();
    }

    /// Wait until the callback has run. Returns false if the poll was aborted or the
    /// callback panicked.
    pub async fn delivered(self) -> bool {
        self.handle.await.is_ok()
    }
}

/// What [`Session::sync`] returns
#[derive(Debug)]
pub enum SyncOutcome {
    Completed(SyncResult),
    Pending(PendingSync),
}

impl SyncOutcome {
    pub fn into_completed(self) -> Option<SyncResult> {
        match self {
            SyncOutcome::Completed(result) => Some(result),
            SyncOutcome::Pending(_) => None,
        }
    }

    pub fn into_pending(self) -> Option<PendingSync> {
        match self {
            SyncOutcome::Completed(_) => None,
            SyncOutcome::Pending(pending) => Some(pending),
        }
    }
}

impl Session {
    /// Trigger an explicit sync of every binding on top of the automatic policy.
    pub async fn sync(&self, mode: SyncMode) -> Result<SyncOutcome, ApiError> {
        self.trigger_and_poll(SyncScope::all(), mode).await
    }

    /// Trigger an explicit sync limited to `scope`.
    pub async fn sync_scoped(
        &self,
        scope: SyncScope,
        mode: SyncMode,
    ) -> Result<SyncOutcome, ApiError> {
        self.trigger_and_poll(scope, mode).await
    }

    /// Sync every binding and wait with the configured sync timeout.
    pub async fn sync_and_wait(&self) -> Result<SyncResult, ApiError> {
        let scope = SyncScope::all();
        let ack = self.trigger(&scope).await?;
        self.poll_sync(&scope, self.settings.sync_timeout(), ack.request_id)
            .await
    }

    async fn trigger_and_poll(
        &self,
        scope: SyncScope,
        mode: SyncMode,
    ) -> Result<SyncOutcome, ApiError> {
        let ack = self.trigger(&scope).await?;
        match mode {
            SyncMode::Wait { timeout } => {
                let timeout = timeout.unwrap_or_else(|| self.settings.sync_timeout());
                let result = self.poll_sync(&scope, timeout, ack.request_id).await?;
                Ok(SyncOutcome::Completed(result))
            }
            SyncMode::Callback {
                timeout,
                on_complete,
            } => {
                let timeout = timeout.unwrap_or_else(|| self.settings.sync_timeout());
                let session = self.clone();
                let request_id = ack.request_id.clone();
                let handle = tokio::spawn(async move {
                    let result = match session
                        .poll_sync(&scope, timeout, request_id.clone())
                        .await
                    {
                        Ok(result) => result,
                        Err(err) => SyncResult::from_error(&err, request_id),
                    };
                    on_complete(result);
                });
                Ok(SyncOutcome::Pending(PendingSync { ack, handle }))
            }
        }
    }

    async fn trigger(&self, scope: &SyncScope) -> Result<SyncAck, ApiError> {
        let ack = self.api.trigger_context_sync(self.id(), scope).await?;
        info!(
            session_id = %self.id(),
            request_id = ?ack.request_id,
            context_id = ?scope.context_id,
            path = ?scope.path,
            "Triggered context sync"
        );
        Ok(ack)
    }

    async fn poll_sync(
        &self,
        scope: &SyncScope,
        timeout: Duration,
        request_id: Option<String>,
    ) -> Result<SyncResult, ApiError> {
        let poller = CompletionPoller::new(self.settings.poll_interval(), timeout);
        let api = &self.api;
        let session_id = self.id();

        let report = poller
            .run("context_sync", move || async move {
                let entries = scope.filter(api.get_context_status(session_id).await?);
                Ok((status::verdict(&entries), entries))
            })
            .await?;

        let success = report.succeeded();
        let entries = report.last.unwrap_or_default();
        let failed = entries
            .iter()
            .filter(|entry| entry.status == SyncStatus::Failed)
            .count();
        let message = match report.state {
            PollState::Succeeded if entries.is_empty() => Some("No sync tasks found".to_string()),
            PollState::Succeeded => None,
            PollState::Failed => Some(format!(
                "{} of {} paths failed to sync",
                failed,
                entries.len()
            )),
            _ => Some(format!(
                "Sync did not finish within {:.1}s and may still be running; check info() later",
                timeout.as_secs_f64()
            )),
        };
        if report.state == PollState::Failed {
            for entry in entries.iter().filter(|e| e.status == SyncStatus::Failed) {
                warn!(
                    session_id = %session_id,
                    context_id = %entry.context_id,
                    path = %entry.path,
                    error = ?entry.error_message,
                    "Path failed to sync"
                );
            }
        }

        Ok(SyncResult {
            success,
            state: report.state,
            entries,
            polls: report.polls,
            elapsed: report.elapsed,
            message,
            request_id,
        })
    }
}
