//! Context bindings: a context mounted at a session path under a sync policy.

use crate::error::ValidationError;
use crate::policy::wire::WireSyncPolicy;
use crate::policy::SyncPolicy;
use serde::Serialize;

/// Validated binding of a context to a mount path.
///
/// Only constructible through [`ContextSync::new`], which validates the whole policy,
/// and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSync {
    context_id: String,
    path: String,
    policy: SyncPolicy,
}

impl ContextSync {
    /// Bind `context_id` at `path`.
    ///
    /// `path` must be absolute. Every white list is re-validated, so a policy mutated after its parts were
    /// constructed is still caught here. No network call is made.
    pub fn new(
        context_id: impl Into<String>,
        path: impl Into<String>,
        policy: SyncPolicy,
    ) -> Result<Self, ValidationError> {
        let context_id = context_id.into();
        let path = path.into();
        if context_id.trim().is_empty() {
            return Err(ValidationError::Empty("context_id"));
        }
        if path.trim().is_empty() {
            return Err(ValidationError::Empty("path"));
        }
        if !path.starts_with('/') {
            return Err(ValidationError::RelativeMountPath(path));
        }
        policy.validate()?;
        Ok(Self {
            context_id,
            path,
            policy,
        })
    }

    /// Bind with [`SyncPolicy::default`].
    pub fn with_default_policy(
        context_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(context_id, path, SyncPolicy::default())
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Mount path used for uniqueness checks: trailing separators are ignored.
    pub fn mount_key(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        if trimmed.is_empty() {
            "/"
        } else {
            trimmed
        }
    }

    pub fn to_wire(&self) -> PersistenceData {
        PersistenceData {
            context_id: self.context_id.clone(),
            path: self.path.clone(),
            policy: self.policy.to_wire(),
        }
    }
}

/// Serialized binding inside a session-creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceData {
    pub context_id: String,
    pub path: String,
    pub policy: WireSyncPolicy,
}
