//! Integration tests for local policy and binding validation

use ctxsync::context::ContextSync;
use ctxsync::policy::{
    BwList, Lifecycle, RecyclePolicy, SyncPolicy, UploadPolicy, UploadStrategy, WhiteList,
};
use ctxsync::ValidationError;

#[test]
fn test_wildcards_are_rejected_with_offending_value() {
    let err = WhiteList::new("/data/*", vec![]).unwrap_err();
    assert!(matches!(err, ValidationError::Wildcard { .. }));
    assert!(err.to_string().contains("/data/*"));

    let err = WhiteList::new("/src", vec!["*.log".to_string()]).unwrap_err();
    assert!(err.to_string().contains("*.log"));
    assert!(err.to_string().contains("exclude_paths"));
}

#[test]
fn test_exact_paths_are_kept_verbatim() {
    let list = WhiteList::new(
        "/src",
        vec!["/node_modules".to_string(), "/temp".to_string()],
    )
    .unwrap();
    assert_eq!(list.path, "/src");
    assert_eq!(list.exclude_paths, vec!["/node_modules", "/temp"]);
}

#[test]
fn test_default_policies_are_independent_values() {
    let first = SyncPolicy::default();
    let mut second = SyncPolicy::default();
    assert_eq!(first, second);

    second.sync_paths.push("/extra".to_string());
    assert_ne!(first, second);
    assert!(first.sync_paths.is_empty());
}

#[test]
fn test_binding_revalidates_mutated_policy() {
    let mut policy = SyncPolicy::default()
        .with_bw_list(BwList::new(vec![WhiteList::new("/src", vec![]).unwrap()]));
    policy.bw_list.white_lists[0]
        .exclude_paths
        .push("/src/**/target".to_string());

    let err = ContextSync::new("ctx-1", "/mnt/src", policy).unwrap_err();
    assert!(err.to_string().contains("/src/**/target"));
}

#[test]
fn test_periodic_upload_needs_positive_period() {
    let policy = SyncPolicy::default().with_upload_policy(UploadPolicy::periodic(0));
    assert_eq!(
        ContextSync::new("ctx-1", "/mnt/a", policy).unwrap_err(),
        ValidationError::NonPositivePeriod(0)
    );

    // The period is ignored under upload-after-close
    let policy = SyncPolicy::default().with_upload_policy(UploadPolicy {
        auto_upload: true,
        upload_strategy: UploadStrategy::UploadAfterFileClose,
        period: 0,
    });
    assert!(ContextSync::new("ctx-1", "/mnt/a", policy).is_ok());
}

#[test]
fn test_sync_and_recycle_paths_are_checked() {
    let policy = SyncPolicy {
        sync_paths: vec!["/logs/?".to_string()],
        ..SyncPolicy::default()
    };
    let err = ContextSync::new("ctx-1", "/mnt/a", policy).unwrap_err();
    assert!(err.to_string().contains("sync_paths"));

    let err = RecyclePolicy::new(Lifecycle::ThreeDays, vec!["/tmp/[ab]".to_string()]).unwrap_err();
    assert!(err.to_string().contains("/tmp/[ab]"));
}

#[test]
fn test_binding_requires_ids() {
    assert_eq!(
        ContextSync::with_default_policy("", "/mnt/a").unwrap_err(),
        ValidationError::Empty("context_id")
    );
    assert_eq!(
        ContextSync::with_default_policy("ctx-1", " ").unwrap_err(),
        ValidationError::Empty("path")
    );
}

#[test]
fn test_binding_rejects_relative_mount_path() {
    let err = ContextSync::with_default_policy("ctx-1", "mnt/data").unwrap_err();
    assert_eq!(err, ValidationError::RelativeMountPath("mnt/data".to_string()));
    assert!(err.to_string().contains("must be absolute"));
    assert!(ContextSync::with_default_policy("ctx-1", "/mnt/data").is_ok());
}
