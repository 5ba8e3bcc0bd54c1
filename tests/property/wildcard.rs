//! Property-based tests for wildcard rejection

use ctxsync::policy::{validate_no_wildcard, WhiteList};
use ctxsync::ValidationError;
use proptest::prelude::*;

/// Any path containing a wildcard character is rejected and the message quotes it
#[test]
fn test_wildcard_paths_always_rejected() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[a-z/._-]{0,12}", "[*?\\[\\]]", "[a-z/._-]{0,12}"),
            |(prefix, wildcard, suffix)| {
                let path = format!("{}{}{}", prefix, wildcard, suffix);
                let err = validate_no_wildcard(&path, "path").unwrap_err();
                let quotes_value =
                    matches!(&err, ValidationError::Wildcard { value, .. } if *value == path);
                prop_assert!(quotes_value);
                prop_assert!(err.to_string().contains(&path));
                Ok(())
            },
        )
        .unwrap();
}

/// Paths without wildcard characters are accepted unchanged
#[test]
fn test_plain_paths_always_accepted() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("/[a-zA-Z0-9/._ -]{0,24}", prop::collection::vec("/[a-z0-9._-]{1,10}", 0..4)),
            |(path, excludes)| {
                let list = WhiteList::new(path.clone(), excludes.clone()).unwrap();
                prop_assert_eq!(list.path, path);
                prop_assert_eq!(list.exclude_paths, excludes);
                Ok(())
            },
        )
        .unwrap();
}

/// A single wildcard anywhere in the exclude list fails the whole list
#[test]
fn test_one_bad_exclude_fails_list() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(prop::collection::vec("/[a-z]{1,8}", 1..5), any::<prop::sample::Index>()),
            |(mut excludes, index)| {
                let at = index.index(excludes.len());
                excludes[at].push('*');
                prop_assert!(WhiteList::new("/root", excludes).is_err());
                Ok(())
            },
        )
        .unwrap();
}
