//! Integration tests for session creation, explicit sync, status reads and release

use crate::integration::test_utils::{scripted_client, session_with_bindings, upload};
use ctxsync::context::{ContextSync, SyncScope, SyncStatus};
use ctxsync::policy::{BwList, DownloadPolicy, DownloadStrategy, SyncPolicy, UploadPolicy, WhiteList};
use ctxsync::session::{SessionParams, SyncMode, SyncOutcome};
use ctxsync::{PollState, RemoteError, ValidationError};
use std::time::Duration;
use tokio::sync::oneshot;

#[tokio::test(start_paused = true)]
async fn test_sync_wait_succeeds_after_second_poll() {
    let (remote, client) = scripted_client();
    let session = session_with_bindings(&client, &[("demo", "/mnt/demo")]).await;
    remote.push_status(vec![upload("ctx-1", "/mnt/demo", SyncStatus::Syncing)]);
    remote.push_status(vec![upload("ctx-1", "/mnt/demo", SyncStatus::Succeeded)]);

    let result = session
        .sync(SyncMode::wait())
        .await
        .unwrap()
        .into_completed()
        .unwrap();

    assert!(result.success);
    assert_eq!(result.state, PollState::Succeeded);
    assert_eq!(result.polls, 2);
    assert_eq!(result.elapsed, Duration::from_millis(1500));
    assert!(result.request_id.is_some());
    assert_eq!(remote.calls().get_status, 2);
}

#[tokio::test(start_paused = true)]
async fn test_sync_wait_times_out_without_raising() {
    let (remote, client) = scripted_client();
    let session = session_with_bindings(&client, &[("demo", "/mnt/demo")]).await;
    remote.push_status(vec![upload("ctx-1", "/mnt/demo", SyncStatus::Syncing)]);

    let result = session
        .sync(SyncMode::wait_for(Duration::from_secs(5)))
        .await
        .unwrap()
        .into_completed()
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.state, PollState::TimedOut);
    assert_eq!(result.elapsed, Duration::from_secs(5));
    assert_eq!(result.entries[0].status, SyncStatus::Syncing);
    assert!(result.message.unwrap().contains("did not finish"));
}

#[tokio::test(start_paused = true)]
async fn test_partial_failure_is_reported_in_result() {
    let (remote, client) = scripted_client();
    let session =
        session_with_bindings(&client, &[("a", "/mnt/a"), ("b", "/mnt/b")]).await;
    remote.push_status(vec![
        upload("ctx-1", "/mnt/a", SyncStatus::Succeeded),
        upload("ctx-2", "/mnt/b", SyncStatus::Failed).with_error("quota exceeded"),
    ]);

    let result = session
        .sync(SyncMode::wait())
        .await
        .unwrap()
        .into_completed()
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.state, PollState::Failed);
    assert_eq!(result.entries.len(), 2);
    let failed: Vec<_> = result.failed_entries().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].path, "/mnt/b");
    assert_eq!(failed[0].error_message.as_deref(), Some("quota exceeded"));
    assert_eq!(result.message.as_deref(), Some("1 of 2 paths failed to sync"));
}

#[tokio::test]
async fn test_duplicate_mount_path_never_reaches_service() {
    let (remote, client) = scripted_client();
    let bindings = vec![
        ContextSync::with_default_policy("ctx-1", "/mnt/shared").unwrap(),
        ContextSync::with_default_policy("ctx-2", "/mnt/shared").unwrap(),
    ];

    let err = client
        .sessions()
        .attach(SessionParams::new(), bindings.clone())
        .unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::DuplicateMountPath { path, .. }) if path == "/mnt/shared"
    ));

    // Parameters assembled by hand are checked again at creation
    let params = SessionParams {
        context_syncs: bindings,
        ..SessionParams::default()
    };
    let err = client.sessions().create_session(params).await.unwrap_err();
    assert!(err.to_string().contains("/mnt/shared"));
    assert_eq!(remote.calls().create_session, 0);
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_demo_flow() {
    let (remote, client) = scripted_client();
    let context = client.contexts().get("demo", true).await.unwrap().unwrap();

    let policy = SyncPolicy::default()
        .with_upload_policy(UploadPolicy::periodic(15))
        .with_download_policy(DownloadPolicy {
            auto_download: true,
            download_strategy: DownloadStrategy::DownloadSync,
        })
        .with_bw_list(BwList::new(vec![WhiteList::new(
            "/workspace",
            vec!["/workspace/.git".to_string()],
        )
        .unwrap()]));
    let binding = ContextSync::new(context.id.clone(), "/mnt/demo", policy).unwrap();

    let params = client
        .sessions()
        .attach(SessionParams::new().with_image("linux_latest"), vec![binding])
        .unwrap();
    let session = client.sessions().create_session(params).await.unwrap();

    let created = remote.created_sessions();
    assert_eq!(created.len(), 1);
    let payload = serde_json::to_value(&created[0]).unwrap();
    assert_eq!(payload["persistenceDataList"][0]["contextId"], context.id.as_str());
    assert_eq!(payload["persistenceDataList"][0]["path"], "/mnt/demo");
    assert_eq!(
        payload["persistenceDataList"][0]["policy"]["uploadPolicy"]["uploadStrategy"],
        "PeriodicUpload"
    );
    assert_eq!(
        payload["persistenceDataList"][0]["policy"]["uploadPolicy"]["period"],
        15
    );

    remote.push_status(vec![upload(&context.id, "/mnt/demo", SyncStatus::Syncing)]);
    remote.push_status(vec![upload(&context.id, "/mnt/demo", SyncStatus::Succeeded)]);
    let result = session
        .sync(SyncMode::wait())
        .await
        .unwrap()
        .into_completed()
        .unwrap();
    assert!(result.success);
    assert_eq!(result.polls, 2);
}

#[tokio::test(start_paused = true)]
async fn test_callback_mode_delivers_result_once() {
    let (remote, client) = scripted_client();
    let session = session_with_bindings(&client, &[("demo", "/mnt/demo")]).await;
    remote.push_status(vec![upload("ctx-1", "/mnt/demo", SyncStatus::Queued)]);
    remote.push_status(vec![upload("ctx-1", "/mnt/demo", SyncStatus::Syncing)]);
    remote.push_status(vec![upload("ctx-1", "/mnt/demo", SyncStatus::Succeeded)]);

    let (tx, rx) = oneshot::channel();
    let outcome = session
        .sync(SyncMode::callback(move |result| {
            let _ = tx.send(result);
        }))
        .await
        .unwrap();
    let pending = match outcome {
        SyncOutcome::Pending(pending) => pending,
        SyncOutcome::Completed(_) => panic!("callback mode must not block"),
    };
    assert!(pending.ack().request_id.is_some());

    let result = rx.await.unwrap();
    assert!(result.success);
    assert_eq!(result.polls, 3);
    assert_eq!(result.elapsed, Duration::from_secs(3));
    assert!(pending.delivered().await);
}

#[tokio::test(start_paused = true)]
async fn test_callback_receives_polling_error_as_failed_result() {
    let (remote, client) = scripted_client();
    let session = session_with_bindings(&client, &[("demo", "/mnt/demo")]).await;
    remote.fail_next(
        "get_context_status",
        RemoteError::new("get_context_status", "service unavailable"),
    );

    let (tx, rx) = oneshot::channel();
    session
        .sync(SyncMode::callback(move |result| {
            let _ = tx.send(result);
        }))
        .await
        .unwrap();

    let result = rx.await.unwrap();
    assert!(!result.success);
    assert_eq!(result.state, PollState::Failed);
    assert!(result.message.unwrap().contains("service unavailable"));
}

#[tokio::test]
async fn test_trigger_error_is_returned_before_spawning() {
    let (remote, client) = scripted_client();
    let session = session_with_bindings(&client, &[("demo", "/mnt/demo")]).await;
    remote.fail_next(
        "trigger_context_sync",
        RemoteError::new("trigger_context_sync", "throttled").with_code("Throttling"),
    );

    let called = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = called.clone();
    let err = session
        .sync(SyncMode::callback(move |_| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        }))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Throttling"));
    assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(remote.calls().get_status, 0);
}

#[tokio::test(start_paused = true)]
async fn test_deleted_context_surfaces_as_failed_entry() {
    let (_remote, client) = scripted_client();
    let session =
        session_with_bindings(&client, &[("keep", "/mnt/keep"), ("gone", "/mnt/gone")]).await;
    let gone = client.contexts().get("gone", false).await.unwrap().unwrap();
    client.contexts().delete(&gone).await.unwrap();

    let result = session
        .sync(SyncMode::wait())
        .await
        .unwrap()
        .into_completed()
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.entries.len(), 2);
    let failed: Vec<_> = result.failed_entries().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].context_id, gone.id);
    assert_eq!(failed[0].error_message.as_deref(), Some("context not found"));
}

#[tokio::test(start_paused = true)]
async fn test_scoped_sync_waits_only_on_matching_entries() {
    let (remote, client) = scripted_client();
    let session = session_with_bindings(&client, &[("a", "/mnt/a"), ("b", "/mnt/b")]).await;
    let a = &session.bindings()[0];
    let b = &session.bindings()[1];
    remote.push_status(vec![
        upload(a.context_id(), "/mnt/a", SyncStatus::Succeeded),
        upload(b.context_id(), "/mnt/b", SyncStatus::Syncing),
    ]);

    let scope = SyncScope::context(a.context_id()).with_path("/mnt/a");
    let result = session
        .sync_scoped(scope.clone(), SyncMode::wait())
        .await
        .unwrap()
        .into_completed()
        .unwrap();

    assert!(result.success);
    assert_eq!(result.polls, 1);
    assert_eq!(result.entries.len(), 1);
    assert_eq!(remote.sync_triggers(), vec![scope]);
}

#[tokio::test(start_paused = true)]
async fn test_session_without_sync_tasks_succeeds() {
    let (_remote, client) = scripted_client();
    let session = client
        .sessions()
        .create_session(SessionParams::new())
        .await
        .unwrap();

    let result = session
        .sync(SyncMode::wait())
        .await
        .unwrap()
        .into_completed()
        .unwrap();
    assert!(result.success);
    assert!(result.entries.is_empty());
    assert_eq!(result.message.as_deref(), Some("No sync tasks found"));
}

#[tokio::test]
async fn test_info_reads_every_binding() {
    let (_remote, client) = scripted_client();
    let session = session_with_bindings(&client, &[("a", "/mnt/a"), ("b", "/mnt/b")]).await;

    let entries = session.info().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.status == SyncStatus::Succeeded));

    let only_b = session
        .info_filtered(&SyncScope::all().with_path("/mnt/b"))
        .await
        .unwrap();
    assert_eq!(only_b.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_release_syncs_first_when_asked() {
    let (remote, client) = scripted_client();
    let session = session_with_bindings(&client, &[("demo", "/mnt/demo")]).await;

    session.release(true).await.unwrap();
    assert_eq!(remote.calls().trigger_sync, 1);
    assert!(!remote.is_session_live(session.id()));

    // The service no longer knows the session
    let err = session.release(false).await.unwrap_err();
    assert!(err.to_string().contains("declined"));
}

#[tokio::test(start_paused = true)]
async fn test_release_proceeds_when_pre_sync_errors() {
    let (remote, client) = scripted_client();
    let session = session_with_bindings(&client, &[("demo", "/mnt/demo")]).await;
    remote.fail_next(
        "get_context_status",
        RemoteError::new("get_context_status", "connection reset"),
    );

    session.release(true).await.unwrap();
    assert_eq!(remote.calls().trigger_sync, 1);
    assert_eq!(remote.calls().release_session, 1);
    assert!(!remote.is_session_live(session.id()));
}
