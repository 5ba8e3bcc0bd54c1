//! Sessions: creation with context bindings, explicit sync, status reads and release.
//!
//! [`SessionContextOrchestrator`] owns the local checks that run before a session
//! exists. [`Session`] is the handle for everything afterwards.

pub mod handle;
pub mod orchestrator;
pub mod sync;

pub use handle::Session;
pub use orchestrator::SessionContextOrchestrator;
pub use sync::{OnComplete, PendingSync, SyncAck, SyncMode, SyncOutcome, SyncResult};

use crate::context::binding::{ContextSync, PersistenceData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-side parameters for a new session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionParams {
    pub image_id: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub context_syncs: Vec<ContextSync>,
}

impl SessionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = Some(image_id.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Build the wire request. Callers go through the orchestrator, which checks the
    /// bindings first.
    pub(crate) fn to_request(&self) -> CreateSessionRequest {
        CreateSessionRequest {
            image_id: self.image_id.clone(),
            labels: self.labels.clone(),
            persistence_data_list: self.context_syncs.iter().map(ContextSync::to_wire).collect(),
        }
    }
}

/// Session-creation payload sent to the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub persistence_data_list: Vec<PersistenceData>,
}

/// Session as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub resource_url: Option<String>,
}
