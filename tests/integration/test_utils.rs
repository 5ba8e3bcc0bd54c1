//! Shared fixtures: an in-memory service and helpers for building sessions on it.

use ctxsync::context::{ContextSync, SyncStatus, SyncStatusEntry, TaskType};
use ctxsync::remote::ScriptedRemote;
use ctxsync::session::{Session, SessionParams};
use ctxsync::{SessionClient, SyncSettings};
use std::sync::Arc;

pub fn scripted_client() -> (Arc<ScriptedRemote>, SessionClient) {
    let remote = Arc::new(ScriptedRemote::new());
    let client = SessionClient::new(remote.clone(), SyncSettings::default());
    (remote, client)
}

pub fn upload(context_id: &str, path: &str, status: SyncStatus) -> SyncStatusEntry {
    SyncStatusEntry::new(context_id, path, status, TaskType::Upload)
}

/// Create a session with one default-policy binding per `(context name, mount path)`.
pub async fn session_with_bindings(client: &SessionClient, mounts: &[(&str, &str)]) -> Session {
    let mut bindings = Vec::new();
    for (name, path) in mounts {
        let context = client.contexts().get(name, true).await.unwrap().unwrap();
        bindings.push(ContextSync::with_default_policy(context.id, *path).unwrap());
    }
    let params = client
        .sessions()
        .attach(SessionParams::new(), bindings)
        .unwrap();
    client.sessions().create_session(params).await.unwrap()
}
