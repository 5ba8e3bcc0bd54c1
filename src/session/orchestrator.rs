//! Attaching context bindings to session creation.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SyncSettings;
use crate::context::binding::ContextSync;
use crate::error::{ApiError, ValidationError};
use crate::remote::RemoteContextApi;
use crate::session::{Session, SessionParams};

/// Attaches validated bindings to session parameters and creates sessions.
///
/// Every check here is local: an invalid binding list never produces a request.
#[derive(Clone)]
pub struct SessionContextOrchestrator {
    api: Arc<dyn RemoteContextApi>,
    settings: SyncSettings,
}

impl SessionContextOrchestrator {
    pub fn new(api: Arc<dyn RemoteContextApi>, settings: SyncSettings) -> Self {
        Self { api, settings }
    }

    /// Append `context_syncs` to `params` after checking the combined list.
    pub fn attach(
        &self,
        mut params: SessionParams,
        context_syncs: Vec<ContextSync>,
    ) -> Result<SessionParams, ApiError> {
        params.context_syncs.extend(context_syncs);
        check_bindings(&params.context_syncs)?;
        debug!(
            bindings = params.context_syncs.len(),
            "Attached context bindings to session parameters"
        );
        Ok(params)
    }

    /// Create a session with the bindings on `params`.
    ///
    /// The bindings are checked again so parameters assembled by hand get the same
    /// guarantees as those built through [`attach`](Self::attach).
    pub async fn create_session(&self, params: SessionParams) -> Result<Session, ApiError> {
        check_bindings(&params.context_syncs)?;
        let request = params.to_request();
        let record = self.api.create_session(&request).await?;
        info!(
            session_id = %record.session_id,
            request_id = ?record.request_id,
            bindings = params.context_syncs.len(),
            "Created session"
        );
        Ok(Session::new(
            Arc::clone(&self.api),
            record,
            params.context_syncs,
            self.settings.clone(),
        ))
    }
}

/// Validate each binding's policy and require pairwise-distinct mount paths.
pub fn check_bindings(bindings: &[ContextSync]) -> Result<(), ValidationError> {
    let mut mounts: HashMap<&str, &str> = HashMap::new();
    for binding in bindings {
        binding.policy().validate()?;
        if let Some(first) = mounts.insert(binding.mount_key(), binding.context_id()) {
            return Err(ValidationError::DuplicateMountPath {
                path: binding.path().to_string(),
                first: first.to_string(),
                second: binding.context_id().to_string(),
            });
        }
    }
    Ok(())
}
