//! Tests for [`RepositoryLocator`] construction and validation.

use rstest::rstest;

use crate::github::{HubmailError, RepositoryLocator, ThreadKind, ThreadNumber};

#[rstest]
fn repository_locator_from_owner_repo() {
    let locator =
        RepositoryLocator::from_owner_repo("octo", "repo").expect("should create locator");
    assert_eq!(locator.owner().as_str(), "octo", "owner mismatch");
    assert_eq!(locator.repository().as_str(), "repo", "repository mismatch");
    assert_eq!(locator.slug(), "octo/repo", "slug mismatch");
}

#[rstest]
#[case::empty_owner("", "repo")]
#[case::empty_repo("octo", "")]
fn repository_locator_rejects_empty_segments(#[case] owner: &str, #[case] repo: &str) {
    let result = RepositoryLocator::from_owner_repo(owner, repo);
    assert!(
        matches!(result, Err(HubmailError::Configuration { .. })),
        "expected Configuration error, got {result:?}"
    );
}

#[rstest]
#[case::issue(ThreadKind::Issue, "<octo/repo/issues/5@github.com>")]
#[case::pull(ThreadKind::PullRequest, "<octo/repo/pull/5@github.com>")]
fn thread_within_repository_derives_root_id(#[case] kind: ThreadKind, #[case] expected: &str) {
    let number = ThreadNumber::new(5).expect("five is a valid number");
    let locator = RepositoryLocator::from_owner_repo("octo", "repo")
        .expect("should create locator")
        .thread(kind, number);

    assert_eq!(locator.message_id(), expected, "root message id mismatch");
    assert_eq!(locator.kind(), kind, "kind mismatch");
}
