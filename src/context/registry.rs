//! Named-context CRUD and bounded clear.

use futures::stream::{self, Stream, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::SyncSettings;
use crate::context::types::{
    ClearMode, ClearOutcome, ClearResult, Context, ContextFilter, ContextPage, ContextState,
};
use crate::error::{ApiError, ClearanceTimeoutError, RemoteError, ValidationError};
use crate::poller::CompletionPoller;
use crate::remote::RemoteContextApi;

/// Thin client over the service's context operations.
///
/// Holds no cache: every call is a fresh request.
#[derive(Clone)]
pub struct ContextRegistry {
    api: Arc<dyn RemoteContextApi>,
    settings: SyncSettings,
}

impl ContextRegistry {
    pub fn new(api: Arc<dyn RemoteContextApi>, settings: SyncSettings) -> Self {
        Self { api, settings }
    }

    /// Look up a context by name, creating it when `create` is set.
    ///
    /// Returns `None` only when the context is absent and `create` is false.
    pub async fn get(&self, name: &str, create: bool) -> Result<Option<Context>, ApiError> {
        if name.trim().is_empty() {
            return Err(ValidationError::Empty("name").into());
        }
        let context = self.api.get_context(name, create).await?;
        debug!(
            name = name,
            create = create,
            found = context.is_some(),
            "Context lookup"
        );
        Ok(context)
    }

    /// One page of contexts.
    pub async fn list(&self, filter: &ContextFilter) -> Result<ContextPage, ApiError> {
        self.api.list_contexts(filter).await
    }

    /// Every context, following continuation tokens page by page.
    ///
    /// Pages are fetched lazily as the stream is consumed. The first failed page ends
    /// the stream with that error.
    pub fn list_all(
        &self,
        filter: ContextFilter,
    ) -> impl Stream<Item = Result<Context, ApiError>> + '_ {
        stream::try_unfold(Some(filter), move |next| async move {
            let filter = match next {
                Some(filter) => filter,
                None => return Ok::<_, ApiError>(None),
            };
            let page = self.api.list_contexts(&filter).await?;
            let following = page.next_token().map(|token| ContextFilter {
                max_results: filter.max_results,
                next_token: Some(token.to_string()),
            });
            debug!(
                contexts = page.contexts.len(),
                more = following.is_some(),
                "Fetched context page"
            );
            let contexts = stream::iter(page.contexts.into_iter().map(Ok::<_, ApiError>));
            Ok(Some((contexts, following)))
        })
        .try_flatten()
    }

    /// Rename a context. The service matches on `context.id`.
    pub async fn update(&self, context: &Context) -> Result<(), ApiError> {
        if context.name.trim().is_empty() {
            return Err(ValidationError::Empty("name").into());
        }
        if !self.api.update_context(context).await? {
            return Err(RemoteError::new(
                "update_context",
                format!("service declined to update context {}", context.id),
            )
            .into());
        }
        info!(context_id = %context.id, name = %context.name, "Updated context");
        Ok(())
    }

    pub async fn delete(&self, context: &Context) -> Result<(), ApiError> {
        if !self.api.delete_context(context).await? {
            return Err(RemoteError::new(
                "delete_context",
                format!("service declined to delete context {}", context.id),
            )
            .into());
        }
        info!(context_id = %context.id, name = %context.name, "Deleted context");
        Ok(())
    }

    /// Wipe a context's stored data.
    ///
    /// `ClearMode::Async` returns as soon as the service accepts the request. In
    /// `ClearMode::Wait` the context state is polled until it leaves clearing. A failed
    /// clear comes back as an unsuccessful [`ClearResult`]; running out of time is a
    /// [`ClearanceTimeoutError`] because the outcome is unknown.
    ///
    /// `timeout` and `poll_interval` fall back to the configured sync settings.
    pub async fn clear(
        &self,
        context: &Context,
        mode: ClearMode,
        timeout: Option<Duration>,
        poll_interval: Option<Duration>,
    ) -> Result<ClearOutcome, ApiError> {
        let ack = self.api.clear_context(&context.id, mode).await?;
        info!(
            context_id = %context.id,
            request_id = ?ack.request_id,
            mode = mode.to_wire(),
            "Clear requested"
        );
        if mode == ClearMode::Async {
            return Ok(ClearOutcome::Submitted(ack));
        }

        let poller = CompletionPoller::new(
            poll_interval.unwrap_or_else(|| self.settings.poll_interval()),
            timeout.unwrap_or_else(|| self.settings.clear_timeout()),
        );
        let api = &self.api;
        let context_id = context.id.as_str();
        let report = poller
            .run("context_clear", move || async move {
                let current = api.describe_context(context_id).await?;
                Ok((current.state.clear_verdict(), current.state))
            })
            .await?;

        if report.timed_out() {
            return Err(ClearanceTimeoutError {
                context_id: context.id.clone(),
                elapsed: report.elapsed,
            }
            .into());
        }

        let state = report.last.clone().unwrap_or(ContextState::Clearing);
        let success = report.succeeded();
        if !success {
            warn!(context_id = %context.id, state = %state, "Clear failed");
        }
        Ok(ClearOutcome::Finished(ClearResult {
            success,
            context_id: context.id.clone(),
            state,
            poll_state: report.state,
            polls: report.polls,
            elapsed: report.elapsed,
            request_id: ack.request_id,
        }))
    }

    /// One-shot read of a context's state, e.g. to follow an async clear.
    pub async fn clear_status(&self, context: &Context) -> Result<ContextState, ApiError> {
        Ok(self.api.describe_context(&context.id).await?.state)
    }
}
