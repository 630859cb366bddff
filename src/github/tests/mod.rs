//! Unit tests for the GitHub module.

use rstest::rstest;

use super::{HubmailError, PersonalAccessToken, ThreadNumber};

#[rstest]
fn rejects_empty_token() {
    let result = PersonalAccessToken::new(String::new());
    assert!(
        matches!(result, Err(HubmailError::MissingToken)),
        "expected MissingToken, got {result:?}"
    );
}

#[rstest]
fn rejects_whitespace_token() {
    let result = PersonalAccessToken::new("  \n");
    assert!(
        matches!(result, Err(HubmailError::MissingToken)),
        "expected MissingToken for blank token, got {result:?}"
    );
}

#[rstest]
fn trims_token_and_redacts_debug() {
    let token = PersonalAccessToken::new("  ghp_secret \n").expect("token should be valid");
    assert_eq!(token.value(), "ghp_secret", "token should be trimmed");
    assert!(
        !format!("{token:?}").contains("ghp_secret"),
        "debug output must not leak the token"
    );
}

#[rstest]
fn rejects_zero_thread_number() {
    assert_eq!(ThreadNumber::new(0), Err(HubmailError::InvalidThreadNumber));
}

mod repository_locator;
