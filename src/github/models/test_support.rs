//! Test helpers for constructing thread and comment fixtures.
//!
//! # Examples
//!
//! ```
//! use hubmail::github::models::test_support::{sample_comment, sample_issue};
//!
//! let issue = sample_issue(7, "Crash on start");
//! assert_eq!(issue.data().number, 7);
//!
//! let comment = sample_comment(1001, "Me too");
//! assert_eq!(comment.database_id, 1001);
//! ```

use chrono::{DateTime, TimeZone, Utc};

use super::{Actor, Comment, Thread, ThreadData};

/// Fixed timestamp used by all fixtures: `2021-03-04T05:06:07Z`.
#[must_use]
pub fn sample_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7)
        .single()
        .unwrap_or_default()
}

/// An actor with a display name and public email.
#[must_use]
pub fn sample_actor() -> Actor {
    Actor {
        login: "octocat".to_owned(),
        display_name: Some("The Octocat".to_owned()),
        email: Some("octocat@example.com".to_owned()),
    }
}

fn sample_thread_data(number: u64, title: &str, segment: &str) -> ThreadData {
    ThreadData {
        id: format!("T_{number}"),
        number,
        title: title.to_owned(),
        url: format!("https://github.com/octo/repo/{segment}/{number}"),
        author: sample_actor(),
        body: format!("Body of {title}"),
        body_html: None,
        created_at: sample_timestamp(),
    }
}

/// An issue in `octo/repo` authored by [`sample_actor`].
#[must_use]
pub fn sample_issue(number: u64, title: &str) -> Thread {
    Thread::Issue(sample_thread_data(number, title, "issues"))
}

/// A pull request in `octo/repo` authored by [`sample_actor`].
#[must_use]
pub fn sample_pull_request(number: u64, title: &str) -> Thread {
    Thread::PullRequest(sample_thread_data(number, title, "pull"))
}

/// A comment authored by the ghost sentinel.
#[must_use]
pub fn sample_comment(database_id: u64, body: &str) -> Comment {
    Comment {
        id: format!("IC_{database_id}"),
        database_id,
        author: Actor::ghost(),
        body: body.to_owned(),
        body_html: None,
        created_at: sample_timestamp(),
    }
}
