//! Client entry point
//!
//! [`SessionClient`] bundles one remote client with the context registry and the
//! session orchestrator, so both share a transport and the same sync settings.

use std::sync::Arc;
use tracing::debug;

use crate::config::{ClientConfig, ConfigLoader, SyncSettings};
use crate::context::ContextRegistry;
use crate::error::ApiError;
use crate::remote::{HttpRemoteClient, RemoteContextApi};
use crate::session::SessionContextOrchestrator;

#[derive(Clone)]
pub struct SessionClient {
    api: Arc<dyn RemoteContextApi>,
    contexts: ContextRegistry,
    sessions: SessionContextOrchestrator,
    settings: SyncSettings,
}

impl SessionClient {
    pub fn new(api: Arc<dyn RemoteContextApi>, settings: SyncSettings) -> Self {
        Self {
            contexts: ContextRegistry::new(Arc::clone(&api), settings.clone()),
            sessions: SessionContextOrchestrator::new(Arc::clone(&api), settings.clone()),
            api,
            settings,
        }
    }

    /// Validate `config` and connect over HTTP.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        config.ensure_valid()?;
        let remote = HttpRemoteClient::from_config(config)?;
        debug!(endpoint = %config.endpoint, "Created session client");
        Ok(Self::new(Arc::new(remote), config.sync.clone()))
    }

    /// Load configuration from the default sources and connect.
    pub fn from_env() -> Result<Self, ApiError> {
        let config = ConfigLoader::load()?;
        Self::from_config(&config)
    }

    pub fn contexts(&self) -> &ContextRegistry {
        &self.contexts
    }

    pub fn sessions(&self) -> &SessionContextOrchestrator {
        &self.sessions
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn remote(&self) -> &Arc<dyn RemoteContextApi> {
        &self.api
    }
}
