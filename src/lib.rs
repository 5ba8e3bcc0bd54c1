//! ctxsync: Context Synchronization Client
//!
//! Client for a cloud session service whose sessions can mount durable, named
//! contexts. Contexts are bound to session paths under a sync policy, synced
//! explicitly on demand, and tracked through batched per-path status reads.
//!
//! Local checks (policy validation, wildcard rejection, mount-path uniqueness) run
//! before any request is sent. The remote service sits behind
//! [`remote::RemoteContextApi`], injected as an `Arc<dyn RemoteContextApi>`.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod poller;
pub mod policy;
pub mod remote;
pub mod session;

pub use api::SessionClient;
pub use config::{ClientConfig, ConfigLoader, SyncSettings};
pub use context::{
    ClearMode, ClearOutcome, Context, ContextRegistry, ContextSync, SyncScope, SyncStatus,
    SyncStatusEntry,
};
pub use error::{ApiError, ClearanceTimeoutError, RemoteError, ValidationError};
pub use poller::{CompletionPoller, PollState};
pub use policy::SyncPolicy;
pub use remote::{HttpRemoteClient, RemoteContextApi, ScriptedRemote};
pub use session::{
    Session, SessionContextOrchestrator, SessionParams, SyncMode, SyncOutcome, SyncResult,
};
