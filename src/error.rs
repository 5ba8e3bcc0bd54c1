//! Error types for the context synchronization client.

use std::time::Duration;
use thiserror::Error;

/// Local policy and binding validation failures.
///
/// These are always raised before any request reaches the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "Wildcard patterns are not supported in {field}. Got: '{value}'. \
         Use exact directory paths instead"
    )]
    Wildcard { field: String, value: String },

    #[error("Duplicate mount path '{path}' (bound to context '{first}' and context '{second}')")]
    DuplicateMountPath {
        path: String,
        first: String,
        second: String,
    },

    #[error("Upload period must be positive under PeriodicUpload, got {0}")]
    NonPositivePeriod(i32),

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("Mount path must be absolute, got '{0}'")]
    RelativeMountPath(String),
}

/// A failed call against the remote session service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed{}: {message}", request_suffix(.request_id, .code))]
pub struct RemoteError {
    /// Remote operation that failed (e.g. `get_context_status`)
    pub operation: String,
    /// Request id assigned by the service, when the call reached it
    pub request_id: Option<String>,
    /// Service or transport error code
    pub code: Option<String>,
    pub message: String,
}

fn request_suffix(request_id: &Option<String>, code: &Option<String>) -> String {
    match (request_id, code) {
        (Some(id), Some(code)) => format!(" (request {}, code {})", id, code),
        (Some(id), None) => format!(" (request {})", id),
        (None, Some(code)) => format!(" (code {})", code),
        (None, None) => String::new(),
    }
}

impl RemoteError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            request_id: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// A bounded clear ran out of time before the context reached a terminal state.
///
/// The outcome is unknown: the clear may still complete on the service side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Clearing context '{context_id}' did not reach a terminal state within {:.1}s; outcome unknown",
    .elapsed.as_secs_f64()
)]
pub struct ClearanceTimeoutError {
    pub context_id: String,
    pub elapsed: Duration,
}

/// Crate-wide error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote operation error: {0}")]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    ClearanceTimeout(#[from] ClearanceTimeoutError),

    #[error("Invalid wire value: {0}")]
    InvalidWire(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// Returns the validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ApiError::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_clearance_timeout(&self) -> bool {
        matches!(self, ApiError::ClearanceTimeout(_))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
