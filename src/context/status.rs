//! Per-path sync status as reported by the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::poller::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    Queued,
    Syncing,
    Succeeded,
    Failed,
}

impl SyncStatus {
    /// Succeeded and Failed do not change without a new trigger.
    pub fn is_terminal(self) -> bool {
        matches!(self, SyncStatus::Succeeded | SyncStatus::Failed)
    }

    pub fn to_wire(self) -> &'static str {
        match self {
            SyncStatus::Queued => "Queued",
            SyncStatus::Syncing => "Syncing",
            SyncStatus::Succeeded => "Succeeded",
            SyncStatus::Failed => "Failed",
        }
    }

    /// Parse a service status. `Pending`, `Running` and `Success` are older spellings.
    pub fn from_wire(value: &str) -> Result<Self, ApiError> {
        match value {
            "Queued" | "Pending" => Ok(SyncStatus::Queued),
            "Syncing" | "Running" => Ok(SyncStatus::Syncing),
            "Succeeded" | "Success" => Ok(SyncStatus::Succeeded),
            "Failed" => Ok(SyncStatus::Failed),
            other => Err(ApiError::InvalidWire(format!("unknown sync status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    Upload,
    Download,
}

impl TaskType {
    pub fn to_wire(self) -> &'static str {
        match self {
            TaskType::Upload => "upload",
            TaskType::Download => "download",
        }
    }

    pub fn from_wire(value: &str) -> Result<Self, ApiError> {
        match value.to_ascii_lowercase().as_str() {
            "upload" => Ok(TaskType::Upload),
            "download" => Ok(TaskType::Download),
            _ => Err(ApiError::InvalidWire(format!("unknown task type '{}'", value))),
        }
    }
}

/// Sync state of one bound path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatusEntry {
    pub context_id: String,
    pub path: String,
    pub status: SyncStatus,
    pub task_type: TaskType,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncStatusEntry {
    pub fn new(
        context_id: impl Into<String>,
        path: impl Into<String>,
        status: SyncStatus,
        task_type: TaskType,
    ) -> Self {
        Self {
            context_id: context_id.into(),
            path: path.into(),
            status,
            task_type,
            error_message: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn from_wire(wire: &WireStatusEntry) -> Result<Self, ApiError> {
        Ok(Self {
            context_id: wire.context_id.clone(),
            path: wire.path.clone(),
            status: SyncStatus::from_wire(&wire.status)?,
            task_type: TaskType::from_wire(&wire.task_type)?,
            error_message: wire.error_message.clone().filter(|msg| !msg.is_empty()),
            started_at: wire.start_time,
            finished_at: wire.finish_time,
        })
    }

    pub fn to_wire(&self) -> WireStatusEntry {
        WireStatusEntry {
            context_id: self.context_id.clone(),
            path: self.path.clone(),
            status: self.status.to_wire().to_string(),
            task_type: self.task_type.to_wire().to_string(),
            error_message: self.error_message.clone(),
            start_time: self.started_at,
            finish_time: self.finished_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStatusEntry {
    pub context_id: String,
    pub path: String,
    pub status: String,
    pub task_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<DateTime<Utc>>,
}

/// Narrows a sync trigger and the status entries it waits on.
///
/// The default scope covers every binding on the session in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(
        rename = "mode",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_direction"
    )]
    pub direction: Option<TaskType>,
}

fn serialize_direction<S>(direction: &Option<TaskType>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match direction {
        Some(task_type) => serializer.serialize_str(task_type.to_wire()),
        None => serializer.serialize_none(),
    }
}

impl SyncScope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn context(context_id: impl Into<String>) -> Self {
        Self {
            context_id: Some(context_id.into()),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_direction(mut self, direction: TaskType) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn matches(&self, entry: &SyncStatusEntry) -> bool {
        self.context_id
            .as_deref()
            .map_or(true, |id| id == entry.context_id)
            && self.path.as_deref().map_or(true, |path| path == entry.path)
            && self.direction.map_or(true, |task| task == entry.task_type)
    }

    pub fn filter(&self, entries: Vec<SyncStatusEntry>) -> Vec<SyncStatusEntry> {
        entries.into_iter().filter(|entry| self.matches(entry)).collect()
    }
}

/// Aggregate a batched status read into one verdict.
///
/// Any non-terminal entry keeps the batch pending. Once all are terminal, a single
/// Failed entry fails the batch. An empty batch has nothing left to wait for.
pub fn verdict(entries: &[SyncStatusEntry]) -> Verdict {
    if entries.iter().any(|entry| !entry.status.is_terminal()) {
        return Verdict::Pending;
    }
    if entries.iter().any(|entry| entry.status == SyncStatus::Failed) {
        Verdict::Failed
    } else {
        Verdict::Succeeded
    }
}
