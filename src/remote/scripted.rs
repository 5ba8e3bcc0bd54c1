//! In-memory session service for tests and offline embedding.
//!
//! Contexts, sessions and bindings live in a mutex-guarded store. Sync status and clear
//! progress can be scripted step by step; when a script runs dry its last step repeats.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::context::binding::PersistenceData;
use crate::context::status::{SyncScope, SyncStatus, SyncStatusEntry, TaskType};
use crate::context::types::{
    ClearAck, ClearMode, Context, ContextFilter, ContextPage, ContextState,
};
use crate::error::{ApiError, RemoteError};
use crate::remote::RemoteContextApi;
use crate::session::{CreateSessionRequest, SessionRecord, SyncAck};

const DEFAULT_PAGE_SIZE: usize = 10;

/// Number of calls received per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_context: u32,
    pub describe_context: u32,
    pub list_contexts: u32,
    pub update_context: u32,
    pub delete_context: u32,
    pub clear_context: u32,
    pub create_session: u32,
    pub release_session: u32,
    pub trigger_sync: u32,
    pub get_status: u32,
}

#[derive(Default)]
struct State {
    contexts: BTreeMap<String, Context>,
    next_id: u64,
    sessions: HashMap<String, Vec<PersistenceData>>,
    created: Vec<CreateSessionRequest>,
    triggers: Vec<SyncScope>,
    clear_modes: Vec<ClearMode>,
    status_script: VecDeque<Vec<SyncStatusEntry>>,
    clear_script: VecDeque<ContextState>,
    failures: HashMap<String, RemoteError>,
    calls: CallCounts,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn take_failure(&mut self, operation: &str) -> Result<(), ApiError> {
        match self.failures.remove(operation) {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn context_by_name(&self, name: &str) -> Option<&Context> {
        self.contexts.values().find(|context| context.name == name)
    }
}

/// Pop the next scripted step, keeping the last one in place.
fn next_step<T: Clone>(script: &mut VecDeque<T>) -> Option<T> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

/// Scriptable in-memory [`RemoteContextApi`]
#[derive(Default)]
pub struct ScriptedRemote {
    state: Mutex<State>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one batched status read. Without a script, status is derived from the
    /// session's bindings and every path reports Succeeded.
    pub fn push_status(&self, entries: Vec<SyncStatusEntry>) {
        self.state.lock().status_script.push_back(entries);
    }

    /// Queue the state a clearing context reports on its next describe. Without a
    /// script a clearing context turns available on the first describe.
    pub fn push_clear_state(&self, state: ContextState) {
        self.state.lock().clear_script.push_back(state);
    }

    /// Store a context directly, bypassing get-or-create.
    pub fn insert_context(&self, context: Context) {
        self.state
            .lock()
            .contexts
            .insert(context.id.clone(), context);
    }

    /// Seed `count` contexts named `{prefix}-{i}`.
    pub fn seed_contexts(&self, prefix: &str, count: usize) -> Vec<Context> {
        let mut state = self.state.lock();
        (0..count)
            .map(|i| {
                let context = Context {
                    id: state.next_id("ctx"),
                    name: format!("{}-{}", prefix, i),
                    state: ContextState::Available,
                    os_type: None,
                    created_at: None,
                    last_used_at: None,
                };
                state.contexts.insert(context.id.clone(), context.clone());
                context
            })
            .collect()
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: &str, error: RemoteError) {
        self.state
            .lock()
            .failures
            .insert(operation.to_string(), error);
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    /// Every create-session payload received, in order.
    pub fn created_sessions(&self) -> Vec<CreateSessionRequest> {
        self.state.lock().created.clone()
    }

    /// Every sync trigger received, in order.
    pub fn sync_triggers(&self) -> Vec<SyncScope> {
        self.state.lock().triggers.clone()
    }

    pub fn clear_modes(&self) -> Vec<ClearMode> {
        self.state.lock().clear_modes.clone()
    }

    pub fn context(&self, context_id: &str) -> Option<Context> {
        self.state.lock().contexts.get(context_id).cloned()
    }

    pub fn is_session_live(&self, session_id: &str) -> bool {
        self.state.lock().sessions.contains_key(session_id)
    }
}

#[async_trait]
impl RemoteContextApi for ScriptedRemote {
    async fn get_context(
        &self,
        name: &str,
        allow_create: bool,
    ) -> Result<Option<Context>, ApiError> {
        let mut state = self.state.lock();
        state.calls.get_context += 1;
        state.take_failure("get_context")?;

        if let Some(context) = state.context_by_name(name) {
            return Ok(Some(context.clone()));
        }
        if !allow_create {
            return Ok(None);
        }
        let context = Context {
            id: state.next_id("ctx"),
            name: name.to_string(),
            state: ContextState::Available,
            os_type: None,
            created_at: None,
            last_used_at: None,
        };
        state.contexts.insert(context.id.clone(), context.clone());
        Ok(Some(context))
    }

    async fn describe_context(&self, context_id: &str) -> Result<Context, ApiError> {
        let mut state = self.state.lock();
        state.calls.describe_context += 1;
        state.take_failure("describe_context")?;

        let clearing = match state.contexts.get(context_id) {
            Some(context) => context.state == ContextState::Clearing,
            None => {
                return Err(RemoteError::new(
                    "describe_context",
                    format!("context {} does not exist", context_id),
                )
                .with_code("InvalidContext.NotFound")
                .into())
            }
        };
        if clearing {
            let next = next_step(&mut state.clear_script).unwrap_or(ContextState::Available);
            if let Some(context) = state.contexts.get_mut(context_id) {
                context.state = next;
            }
        }
        state.contexts.get(context_id).cloned().ok_or_else(|| {
            RemoteError::new("describe_context", "context vanished during describe").into()
        })
    }

    async fn list_contexts(&self, filter: &ContextFilter) -> Result<ContextPage, ApiError> {
        let mut state = self.state.lock();
        state.calls.list_contexts += 1;
        state.take_failure("list_contexts")?;

        let offset = match filter.next_token.as_deref() {
            Some(token) if !token.is_empty() => token.parse::<usize>().map_err(|_| {
                ApiError::from(
                    RemoteError::new("list_contexts", format!("invalid next token '{}'", token))
                        .with_code("InvalidParameter"),
                )
            })?,
            _ => 0,
        };
        let page_size = filter
            .max_results
            .map(|max| max.max(1) as usize)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let total = state.contexts.len();
        let contexts: Vec<Context> = state
            .contexts
            .values()
            .skip(offset)
            .take(page_size)
            .cloned()
            .collect();
        let end = offset + contexts.len();
        Ok(ContextPage {
            contexts,
            next_token: (end < total).then(|| end.to_string()),
            total_count: Some(total as u64),
        })
    }

    async fn update_context(&self, context: &Context) -> Result<bool, ApiError> {
        let mut state = self.state.lock();
        state.calls.update_context += 1;
        state.take_failure("update_context")?;

        match state.contexts.get_mut(&context.id) {
            Some(stored) => {
                stored.name = context.name.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_context(&self, context: &Context) -> Result<bool, ApiError> {
        let mut state = self.state.lock();
        state.calls.delete_context += 1;
        state.take_failure("delete_context")?;
        Ok(state.contexts.remove(&context.id).is_some())
    }

    async fn clear_context(&self, context_id: &str, mode: ClearMode) -> Result<ClearAck, ApiError> {
        let mut state = self.state.lock();
        state.calls.clear_context += 1;
        state.take_failure("clear_context")?;

        let request_id = state.next_id("req");
        state.clear_modes.push(mode);
        match state.contexts.get_mut(context_id) {
            Some(context) => {
                context.state = ContextState::Clearing;
                Ok(ClearAck {
                    request_id: Some(request_id),
                    context_id: context_id.to_string(),
                })
            }
            None => Err(RemoteError::new(
                "clear_context",
                format!("context {} does not exist", context_id),
            )
            .with_request_id(Some(request_id))
            .with_code("InvalidContext.NotFound")
            .into()),
        }
    }

    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<SessionRecord, ApiError> {
        let mut state = self.state.lock();
        state.calls.create_session += 1;
        state.take_failure("create_session")?;

        let session_id = state.next_id("session");
        let request_id = state.next_id("req");
        state.created.push(request.clone());
        state
            .sessions
            .insert(session_id.clone(), request.persistence_data_list.clone());
        Ok(SessionRecord {
            session_id,
            request_id: Some(request_id),
            resource_url: None,
        })
    }

    async fn release_session(&self, session_id: &str) -> Result<bool, ApiError> {
        let mut state = self.state.lock();
        state.calls.release_session += 1;
        state.take_failure("release_session")?;
        Ok(state.sessions.remove(session_id).is_some())
    }

    async fn trigger_context_sync(
        &self,
        session_id: &str,
        scope: &SyncScope,
    ) -> Result<SyncAck, ApiError> {
        let mut state = self.state.lock();
        state.calls.trigger_sync += 1;
        state.take_failure("trigger_context_sync")?;

        if !state.sessions.contains_key(session_id) {
            return Err(session_not_found("trigger_context_sync", session_id));
        }
        state.triggers.push(scope.clone());
        let request_id = state.next_id("req");
        Ok(SyncAck {
            request_id: Some(request_id),
        })
    }

    async fn get_context_status(
        &self,
        session_id: &str,
    ) -> Result<Vec<SyncStatusEntry>, ApiError> {
        let mut state = self.state.lock();
        state.calls.get_status += 1;
        state.take_failure("get_context_status")?;

        let bindings = match state.sessions.get(session_id) {
            Some(bindings) => bindings.clone(),
            None => return Err(session_not_found("get_context_status", session_id)),
        };
        if let Some(entries) = next_step(&mut state.status_script) {
            return Ok(entries);
        }
        Ok(bindings
            .iter()
            .map(|binding| {
                if state.contexts.contains_key(&binding.context_id) {
                    SyncStatusEntry::new(
                        binding.context_id.clone(),
                        binding.path.clone(),
                        SyncStatus::Succeeded,
                        TaskType::Upload,
                    )
                } else {
                    SyncStatusEntry::new(
                        binding.context_id.clone(),
                        binding.path.clone(),
                        SyncStatus::Failed,
                        TaskType::Upload,
                    )
                    .with_error("context not found")
                }
            })
            .collect())
    }
}

fn session_not_found(operation: &str, session_id: &str) -> ApiError {
    RemoteError::new(operation, format!("session {} does not exist", session_id))
        .with_code("InvalidSession.NotFound")
        .into()
}
