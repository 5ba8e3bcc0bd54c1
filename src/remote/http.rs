//! HTTP transport for the session service.
//!
//! One JSON POST per action to `{endpoint}/{Action}` with bearer auth. Every response
//! uses the same envelope: `{requestId, success, code, message, data}`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;
use crate::context::status::{SyncScope, SyncStatusEntry, TaskType, WireStatusEntry};
use crate::context::types::{ClearAck, ClearMode, Context, ContextFilter, ContextPage};
use crate::error::{ApiError, RemoteError};
use crate::remote::RemoteContextApi;
use crate::session::{CreateSessionRequest, SessionRecord, SyncAck};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error codes the service uses for a missing context
const CONTEXT_NOT_FOUND_CODES: [&str; 2] = ["InvalidContext.NotFound", "ContextNotFound"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

fn default_success() -> bool {
    true
}

impl<T> Envelope<T> {
    fn is_context_not_found(&self) -> bool {
        self.code
            .as_deref()
            .map_or(false, |code| CONTEXT_NOT_FOUND_CODES.contains(&code))
    }

    fn is_not_found(&self) -> bool {
        self.code
            .as_deref()
            .map_or(false, |code| code.ends_with("NotFound"))
    }

    /// Turn a `success == false` envelope into a [`RemoteError`].
    fn into_checked(self, operation: &str) -> Result<Self, ApiError> {
        if self.success {
            return Ok(self);
        }
        let mut err = RemoteError::new(
            operation,
            self.message
                .clone()
                .unwrap_or_else(|| "service reported failure".to_string()),
        )
        .with_request_id(self.request_id.clone());
        if let Some(code) = &self.code {
            err = err.with_code(code.clone());
        }
        Err(err.into())
    }

    fn require_data(self, operation: &str) -> Result<(Option<String>, T), ApiError> {
        match self.data {
            Some(data) => Ok((self.request_id, data)),
            None => Err(RemoteError::new(operation, "response carried no data")
                .with_request_id(self.request_id)
                .into()),
        }
    }
}

/// Rebuild an error body as a failed envelope so callers apply their usual
/// not-found and failure handling to non-2xx replies.
fn failure_envelope<R>(status: StatusCode, body: &str) -> Option<Envelope<R>> {
    let envelope = serde_json::from_str::<Envelope<serde_json::Value>>(body).ok()?;
    Some(Envelope {
        request_id: envelope.request_id,
        success: false,
        code: envelope.code.or_else(|| Some(status.as_u16().to_string())),
        message: envelope.message.or_else(|| Some(status.to_string())),
        data: None,
    })
}

/// Entries for task types other than upload and download are skipped.
fn decode_status_entries(wire: &[WireStatusEntry]) -> Result<Vec<SyncStatusEntry>, ApiError> {
    let mut entries = Vec::with_capacity(wire.len());
    for entry in wire {
        if TaskType::from_wire(&entry.task_type).is_err() {
            debug!(
                context_id = %entry.context_id,
                path = %entry.path,
                task_type = %entry.task_type,
                "Skipping status entry with unsupported task type"
            );
            continue;
        }
        entries.push(SyncStatusEntry::from_wire(entry)?);
    }
    Ok(entries)
}

fn map_http_error(operation: &str, error: reqwest::Error) -> ApiError {
    let (code, message) = if let Some(status) = error.status() {
        match status.as_u16() {
            401 | 403 => ("Unauthorized", format!("Authentication failed: {}", error)),
            429 => ("Throttling", format!("Rate limit exceeded: {}", error)),
            _ => ("HttpStatus", format!("Request failed with status {}: {}", status, error)),
        }
    } else if error.is_timeout() {
        ("Timeout", format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ("Connect", format!("Connection error: {}", error))
    } else {
        ("Transport", format!("HTTP error: {}", error))
    };
    RemoteError::new(operation, message).with_code(code).into()
}

/// Session service client over HTTPS
pub struct HttpRemoteClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpRemoteClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeouts(
            endpoint,
            api_key,
            DEFAULT_CONNECT_TIMEOUT,
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    pub fn with_timeouts(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ApiError::ConfigError(
                    "API key is not configured (set api_key or CTXSYNC_API_KEY)".to_string(),
                )
            })?;
        Self::with_timeouts(
            config.endpoint.clone(),
            api_key,
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn action_url(&self, action: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), action)
    }

    async fn call<B, R>(&self, operation: &str, action: &str, body: &B) -> Result<Envelope<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.action_url(action);
        debug!(operation = operation, url = %url, "Calling session service");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| map_http_error(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if let Some(envelope) = failure_envelope(status, &error_text) {
                debug!(
                    operation = operation,
                    status = %status,
                    code = ?envelope.code,
                    "Service refused request"
                );
                return Ok(envelope);
            }
            return Err(RemoteError::new(
                operation,
                format!("Request failed with status {}: {}", status, error_text),
            )
            .with_code(status.as_u16().to_string())
            .into());
        }

        response.json::<Envelope<R>>().await.map_err(|e| {
            ApiError::from(
                RemoteError::new(operation, format!("Failed to parse response: {}", e))
                    .with_code("InvalidResponse"),
            )
        })
    }

    /// `false` when the target no longer exists, an error for any other refusal.
    fn ensure_accepted(operation: &str, envelope: Envelope<serde_json::Value>) -> Result<bool, ApiError> {
        if !envelope.success && envelope.is_not_found() {
            return Ok(false);
        }
        Ok(envelope.into_checked(operation)?.success)
    }
}

#[async_trait]
impl RemoteContextApi for HttpRemoteClient {
    async fn get_context(
        &self,
        name: &str,
        allow_create: bool,
    ) -> Result<Option<Context>, ApiError> {
        let envelope: Envelope<Context> = self
            .call(
                "get_context",
                "GetContext",
                &json!({ "name": name, "allowCreate": allow_create }),
            )
            .await?;
        if !allow_create && envelope.is_context_not_found() {
            return Ok(None);
        }
        Ok(envelope.into_checked("get_context")?.data)
    }

    async fn describe_context(&self, context_id: &str) -> Result<Context, ApiError> {
        let envelope: Envelope<Context> = self
            .call(
                "describe_context",
                "DescribeContext",
                &json!({ "contextId": context_id }),
            )
            .await?;
        let (_, context) = envelope
            .into_checked("describe_context")?
            .require_data("describe_context")?;
        Ok(context)
    }

    async fn list_contexts(&self, filter: &ContextFilter) -> Result<ContextPage, ApiError> {
        let envelope: Envelope<ContextPage> =
            self.call("list_contexts", "ListContexts", filter).await?;
        Ok(envelope.into_checked("list_contexts")?.data.unwrap_or_default())
    }

    async fn update_context(&self, context: &Context) -> Result<bool, ApiError> {
        let envelope = self
            .call(
                "update_context",
                "ModifyContext",
                &json!({ "id": context.id, "name": context.name }),
            )
            .await?;
        Self::ensure_accepted("update_context", envelope)
    }

    async fn delete_context(&self, context: &Context) -> Result<bool, ApiError> {
        let envelope = self
            .call("delete_context", "DeleteContext", &json!({ "id": context.id }))
            .await?;
        Self::ensure_accepted("delete_context", envelope)
    }

    async fn clear_context(&self, context_id: &str, mode: ClearMode) -> Result<ClearAck, ApiError> {
        let envelope: Envelope<ClearAck> = self
            .call(
                "clear_context",
                "ClearContext",
                &json!({ "contextId": context_id, "mode": mode.to_wire() }),
            )
            .await?;
        let envelope = envelope.into_checked("clear_context")?;
        let mut ack = envelope.data.unwrap_or_default();
        if ack.context_id.is_empty() {
            ack.context_id = context_id.to_string();
        }
        if ack.request_id.is_none() {
            ack.request_id = envelope.request_id;
        }
        Ok(ack)
    }

    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<SessionRecord, ApiError> {
        let envelope: Envelope<SessionRecord> = self
            .call("create_session", "CreateSession", request)
            .await?;
        let (request_id, mut record) = envelope
            .into_checked("create_session")?
            .require_data("create_session")?;
        if record.request_id.is_none() {
            record.request_id = request_id;
        }
        Ok(record)
    }

    async fn release_session(&self, session_id: &str) -> Result<bool, ApiError> {
        let envelope = self
            .call(
                "release_session",
                "ReleaseSession",
                &json!({ "sessionId": session_id }),
            )
            .await?;
        Self::ensure_accepted("release_session", envelope)
    }

    async fn trigger_context_sync(
        &self,
        session_id: &str,
        scope: &SyncScope,
    ) -> Result<SyncAck, ApiError> {
        let body = sync_request_body(session_id, scope);
        let envelope: Envelope<serde_json::Value> = self
            .call("trigger_context_sync", "SyncContext", &body)
            .await?;
        let envelope = envelope.into_checked("trigger_context_sync")?;
        Ok(SyncAck {
            request_id: envelope.request_id,
        })
    }

    async fn get_context_status(
        &self,
        session_id: &str,
    ) -> Result<Vec<SyncStatusEntry>, ApiError> {
        let envelope: Envelope<Vec<WireStatusEntry>> = self
            .call(
                "get_context_status",
                "GetContextInfo",
                &json!({ "sessionId": session_id }),
            )
            .await?;
        let wire = envelope
            .into_checked("get_context_status")?
            .data
            .unwrap_or_default();
        decode_status_entries(&wire)
    }
}

fn sync_request_body(session_id: &str, scope: &SyncScope) -> serde_json::Value {
    let mut body = serde_json::to_value(scope).unwrap_or_else(|_| json!({}));
    if let Some(map) = body.as_object_mut() {
        map.insert("sessionId".to_string(), json!(session_id));
    }
    body
}
