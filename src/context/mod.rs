//! Contexts: durable named storage, its bindings to sessions, and per-path sync status.

pub mod binding;
pub mod registry;
pub mod status;
pub mod types;

pub use binding::{ContextSync, PersistenceData};
pub use registry::ContextRegistry;
pub use status::{SyncScope, SyncStatus, SyncStatusEntry, TaskType};
pub use types::{
    ClearAck, ClearMode, ClearOutcome, ClearResult, Context, ContextFilter, ContextPage,
    ContextState,
};
