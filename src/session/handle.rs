//! Handle to a created session.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SyncSettings;
use crate::context::binding::ContextSync;
use crate::context::status::{SyncScope, SyncStatusEntry};
use crate::error::{ApiError, RemoteError};
use crate::remote::RemoteContextApi;
use crate::session::SessionRecord;

/// A live session and the context bindings it was created with.
///
/// Cloning is cheap; clones share the remote client.
#[derive(Clone)]
pub struct Session {
    pub(crate) api: Arc<dyn RemoteContextApi>,
    record: SessionRecord,
    bindings: Arc<[ContextSync]>,
    pub(crate) settings: SyncSettings,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("record", &self.record)
            .field("bindings", &self.bindings)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(
        api: Arc<dyn RemoteContextApi>,
        record: SessionRecord,
        bindings: Vec<ContextSync>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            api,
            record,
            bindings: bindings.into(),
            settings,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.session_id
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn bindings(&self) -> &[ContextSync] {
        &self.bindings
    }

    /// Current sync status of every context attached to this session.
    ///
    /// One batched read; nothing is cached between calls.
    pub async fn info(&self) -> Result<Vec<SyncStatusEntry>, ApiError> {
        self.api.get_context_status(self.id()).await
    }

    /// [`info`](Self::info) narrowed to `scope`.
    pub async fn info_filtered(&self, scope: &SyncScope) -> Result<Vec<SyncStatusEntry>, ApiError> {
        Ok(scope.filter(self.info().await?))
    }

    /// Release the session, optionally syncing and waiting first.
    ///
    /// An unsuccessful or failed pre-release sync is logged but does not block the
    /// release: the contexts keep whatever the service already persisted.
    pub async fn release(&self, sync_first: bool) -> Result<(), ApiError> {
        if sync_first && !self.bindings.is_empty() {
            match self.sync_and_wait().await {
                Ok(result) if !result.success => warn!(
                    session_id = %self.id(),
                    failed = result.failed_entries().count(),
                    message = ?result.message,
                    "Sync before release did not fully succeed"
                ),
                Ok(_) => {}
                Err(err) => warn!(
                    session_id = %self.id(),
                    error = %err,
                    "Sync before release failed"
                ),
            }
        }
        if !self.api.release_session(self.id()).await? {
            return Err(RemoteError::new("release_session", "service declined to release session")
                .with_request_id(self.record.request_id.clone())
                .into());
        }
        info!(session_id = %self.id(), "Released session");
        Ok(())
    }
}
