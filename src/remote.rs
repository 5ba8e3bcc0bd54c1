//! Remote Session Service
//!
//! The control-plane operations this crate consumes. Everything above this trait
//! (registry, orchestrator, sessions, poller) takes an `Arc<dyn RemoteContextApi>`,
//! so tests and embedders can substitute their own transport.

use async_trait::async_trait;

use crate::context::status::{SyncScope, SyncStatusEntry};
use crate::context::types::{ClearAck, ClearMode, Context, ContextFilter, ContextPage};
use crate::error::ApiError;
use crate::session::{CreateSessionRequest, SessionRecord, SyncAck};

pub mod http;
pub mod scripted;

pub use http::HttpRemoteClient;
pub use scripted::{CallCounts, ScriptedRemote};

/// Control-plane client for contexts and sessions
#[async_trait]
pub trait RemoteContextApi: Send + Sync {
    /// Look up a context by name, creating it when `allow_create` is set.
    async fn get_context(&self, name: &str, allow_create: bool)
        -> Result<Option<Context>, ApiError>;

    /// Fetch a context by id, including its current state.
    async fn describe_context(&self, context_id: &str) -> Result<Context, ApiError>;

    async fn list_contexts(&self, filter: &ContextFilter) -> Result<ContextPage, ApiError>;

    async fn update_context(&self, context: &Context) -> Result<bool, ApiError>;

    async fn delete_context(&self, context: &Context) -> Result<bool, ApiError>;

    async fn clear_context(&self, context_id: &str, mode: ClearMode)
        -> Result<ClearAck, ApiError>;

    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<SessionRecord, ApiError>;

    async fn release_session(&self, session_id: &str) -> Result<bool, ApiError>;

    async fn trigger_context_sync(
        &self,
        session_id: &str,
        scope: &SyncScope,
    ) -> Result<SyncAck, ApiError>;

    /// Batched status of every binding on the session.
    async fn get_context_status(&self, session_id: &str)
        -> Result<Vec<SyncStatusEntry>, ApiError>;
}
