//! Shared context types used by the registry, the remote API and session operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::poller::{PollState, Verdict};

/// Lifecycle state of a context as reported by the service.
///
/// Unrecognised values are kept verbatim in [`ContextState::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContextState {
    Available,
    InUse,
    Clearing,
    Failed,
    Other(String),
}

impl ContextState {
    pub fn as_str(&self) -> &str {
        match self {
            ContextState::Available => "available",
            ContextState::InUse => "in-use",
            ContextState::Clearing => "clearing",
            ContextState::Failed => "failed",
            ContextState::Other(value) => value.as_str(),
        }
    }

    /// How a clear operation reads this state.
    pub fn clear_verdict(&self) -> Verdict {
        match self {
            ContextState::Available | ContextState::InUse => Verdict::Succeeded,
            ContextState::Failed => Verdict::Failed,
            ContextState::Clearing | ContextState::Other(_) => Verdict::Pending,
        }
    }
}

impl From<String> for ContextState {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "available" => ContextState::Available,
            "in-use" | "in_use" | "inuse" => ContextState::InUse,
            "clearing" => ContextState::Clearing,
            "failed" | "clear-failed" => ContextState::Failed,
            _ => ContextState::Other(value),
        }
    }
}

impl From<ContextState> for String {
    fn from(state: ContextState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A durable, named storage unit that outlives sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Server-assigned identifier
    pub id: String,
    /// Caller-chosen name, unique per account
    pub name: String,
    pub state: ContextState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Paging parameters for context listing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl ContextFilter {
    pub fn with_max_results(max_results: u32) -> Self {
        Self {
            max_results: Some(max_results),
            next_token: None,
        }
    }
}

/// One page of contexts
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPage {
    #[serde(default)]
    pub contexts: Vec<Context>,
    /// Continuation token; absent or empty on the last page
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl ContextPage {
    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Whether [`crate::context::ContextRegistry::clear`] waits for the clear to finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearMode {
    /// Poll until the context leaves the clearing state or the deadline passes
    #[default]
    Wait,
    /// Return as soon as the service accepts the request
    Async,
}

impl ClearMode {
    pub fn to_wire(self) -> &'static str {
        match self {
            ClearMode::Wait => "wait",
            ClearMode::Async => "async",
        }
    }
}

/// Service acknowledgement of a clear request
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearAck {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub context_id: String,
}

/// Final observation of a waited clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearResult {
    pub success: bool,
    pub context_id: String,
    pub state: ContextState,
    pub poll_state: PollState,
    pub polls: u32,
    pub elapsed: Duration,
    pub request_id: Option<String>,
}

/// Outcome of [`crate::context::ContextRegistry::clear`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// `ClearMode::Async`: accepted, not awaited
    Submitted(ClearAck),
    /// `ClearMode::Wait`: the context reached a terminal state
    Finished(ClearResult),
}

impl ClearOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            ClearOutcome::Submitted(_) => true,
            ClearOutcome::Finished(result) => result.success,
        }
    }
}
