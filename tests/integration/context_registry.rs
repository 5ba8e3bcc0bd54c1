//! Integration tests for context CRUD, paging and clear

use crate::integration::test_utils::scripted_client;
use ctxsync::context::{ClearMode, ClearOutcome, ContextFilter, ContextState};
use ctxsync::{ApiError, PollState, RemoteError};
use futures::TryStreamExt;
use std::time::Duration;

#[tokio::test]
async fn test_get_or_create_by_name() {
    let (remote, client) = scripted_client();
    let contexts = client.contexts();

    assert!(contexts.get("demo", false).await.unwrap().is_none());
    let created = contexts.get("demo", true).await.unwrap().unwrap();
    assert_eq!(created.name, "demo");
    assert_eq!(created.state, ContextState::Available);

    let fetched = contexts.get("demo", false).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(remote.calls().get_context, 3);
}

#[tokio::test]
async fn test_list_pages_and_stream() {
    let (remote, client) = scripted_client();
    remote.seed_contexts("bulk", 7);

    let first = client
        .contexts()
        .list(&ContextFilter::with_max_results(3))
        .await
        .unwrap();
    assert_eq!(first.contexts.len(), 3);
    assert_eq!(first.total_count, Some(7));
    assert!(first.next_token().is_some());

    let all: Vec<_> = client
        .contexts()
        .list_all(ContextFilter::with_max_results(3))
        .try_collect()
        .await
        .unwrap();
    assert_eq!(all.len(), 7);
    // One page from `list`, three from the stream
    assert_eq!(remote.calls().list_contexts, 4);
}

#[tokio::test]
async fn test_list_all_stops_at_first_failed_page() {
    let (remote, client) = scripted_client();
    remote.seed_contexts("bulk", 4);
    remote.fail_next(
        "list_contexts",
        RemoteError::new("list_contexts", "service unavailable"),
    );

    let result: Result<Vec<_>, ApiError> = client
        .contexts()
        .list_all(ContextFilter::with_max_results(2))
        .try_collect()
        .await;
    assert!(matches!(result, Err(ApiError::Remote(_))));
}

#[tokio::test]
async fn test_rename_and_delete() {
    let (remote, client) = scripted_client();
    let contexts = client.contexts();
    let mut context = contexts.get("old-name", true).await.unwrap().unwrap();

    context.name = "new-name".to_string();
    contexts.update(&context).await.unwrap();
    assert_eq!(remote.context(&context.id).unwrap().name, "new-name");

    contexts.delete(&context).await.unwrap();
    assert!(remote.context(&context.id).is_none());

    let err = contexts.delete(&context).await.unwrap_err();
    assert!(matches!(err, ApiError::Remote(_)));
}

#[tokio::test(start_paused = true)]
async fn test_clear_wait_reports_failed_clear() {
    let (remote, client) = scripted_client();
    let context = client.contexts().get("scratch", true).await.unwrap().unwrap();
    remote.push_clear_state(ContextState::Clearing);
    remote.push_clear_state(ContextState::Failed);

    let outcome = client
        .contexts()
        .clear(&context, ClearMode::Wait, None, None)
        .await
        .unwrap();
    assert!(!outcome.is_success());
    match outcome {
        ClearOutcome::Finished(result) => {
            assert_eq!(result.state, ContextState::Failed);
            assert_eq!(result.poll_state, PollState::Failed);
            assert_eq!(result.polls, 2);
            assert_eq!(result.elapsed, Duration::from_millis(1500));
            assert!(result.request_id.is_some());
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_clear_timeout_raises_after_deadline() {
    let (remote, client) = scripted_client();
    let context = client.contexts().get("stuck", true).await.unwrap().unwrap();
    remote.push_clear_state(ContextState::Clearing);

    let err = client
        .contexts()
        .clear(
            &context,
            ClearMode::Wait,
            Some(Duration::from_secs(5)),
            Some(Duration::from_millis(1500)),
        )
        .await
        .unwrap_err();

    match err {
        ApiError::ClearanceTimeout(timeout) => {
            assert_eq!(timeout.context_id, context.id);
            assert_eq!(timeout.elapsed, Duration::from_secs(5));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_async_clear_returns_immediately() {
    let (remote, client) = scripted_client();
    let context = client.contexts().get("scratch", true).await.unwrap().unwrap();

    let outcome = client
        .contexts()
        .clear(&context, ClearMode::Async, None, None)
        .await
        .unwrap();
    assert!(matches!(outcome, ClearOutcome::Submitted(ref ack) if ack.context_id == context.id));
    assert_eq!(remote.clear_modes(), vec![ClearMode::Async]);
    assert_eq!(remote.calls().describe_context, 0);

    // The follow-up read observes the clear completing
    assert_eq!(
        client.contexts().clear_status(&context).await.unwrap(),
        ContextState::Available
    );
}

#[tokio::test]
async fn test_clear_of_missing_context_is_a_remote_error() {
    let (_remote, client) = scripted_client();
    let context = client.contexts().get("ephemeral", true).await.unwrap().unwrap();
    client.contexts().delete(&context).await.unwrap();

    let err = client
        .contexts()
        .clear(&context, ClearMode::Wait, None, None)
        .await
        .unwrap_err();
    match err {
        ApiError::Remote(remote) => {
            assert_eq!(remote.operation, "clear_context");
            assert!(remote.request_id.is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
}
