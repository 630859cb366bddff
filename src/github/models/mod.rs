//! Data models representing discussion threads, comments, and pages.
//!
//! This module contains the domain models rendered into mail. Types prefixed
//! with `Api` are internal deserialisation targets for GraphQL responses that
//! convert into the public domain types; the conversion is the single place
//! where a missing author is replaced by [`Actor::ghost`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::locator::ThreadKind;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Author of a thread or comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Account login.
    pub login: String,
    /// Display name, when the account has one.
    pub display_name: Option<String>,
    /// Public email address, when the account exposes one.
    pub email: Option<String>,
}

impl Actor {
    /// Login of the sentinel actor GitHub shows for deleted accounts.
    pub const GHOST_LOGIN: &'static str = "ghost";

    /// Sentinel substituted whenever GitHub reports no author.
    #[must_use]
    pub fn ghost() -> Self {
        Self {
            login: Self::GHOST_LOGIN.to_owned(),
            display_name: Some(Self::GHOST_LOGIN.to_owned()),
            email: None,
        }
    }

    /// Name shown in the `From` header: the display name, else the login.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.login)
    }

    /// Email address, or the empty string when none is known.
    #[must_use]
    pub fn address(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// Fields shared by issues and pull requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadData {
    /// Opaque GraphQL node identifier.
    pub id: String,
    /// Issue or pull request number.
    pub number: u64,
    /// Thread title.
    pub title: String,
    /// HTML URL of the thread.
    pub url: String,
    /// Author, or the ghost sentinel.
    pub author: Actor,
    /// Markdown source of the opening post.
    pub body: String,
    /// Rendered HTML of the opening post, when requested.
    pub body_html: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An issue or a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thread {
    /// A repository issue.
    Issue(ThreadData),
    /// A pull request.
    PullRequest(ThreadData),
}

impl Thread {
    /// Shared thread fields.
    #[must_use]
    pub const fn data(&self) -> &ThreadData {
        match self {
            Self::Issue(data) | Self::PullRequest(data) => data,
        }
    }

    /// Kind of thread.
    #[must_use]
    pub const fn kind(&self) -> ThreadKind {
        match self {
            Self::Issue(_) => ThreadKind::Issue,
            Self::PullRequest(_) => ThreadKind::PullRequest,
        }
    }

    /// URL of the `git format-patch` mailbox for a pull request.
    #[must_use]
    pub fn patch_url(&self) -> Option<String> {
        match self {
            Self::Issue(_) => None,
            Self::PullRequest(data) => Some(format!("{}.patch", data.url)),
        }
    }
}

/// A comment on an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Opaque GraphQL node identifier.
    pub id: String,
    /// Stable numeric identifier used for message-id uniqueness.
    pub database_id: u64,
    /// Author, or the ghost sentinel.
    pub author: Actor,
    /// Markdown source of the comment.
    pub body: String,
    /// Rendered HTML of the comment, when requested.
    pub body_html: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// One page of a cursor-paginated connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in the order GitHub returned them.
    pub items: Vec<T>,
    /// Cursor for the following page; `None` once the walk is complete.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// A page with no successor.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiActor {
    pub(crate) login: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) email_or_null: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiThreadFields {
    pub(crate) id: String,
    pub(crate) number: u64,
    pub(crate) title: String,
    pub(crate) url: String,
    pub(crate) author: Option<ApiActor>,
    pub(crate) body: String,
    #[serde(rename = "bodyHTML", default)]
    pub(crate) body_html: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub(crate) enum ApiThread {
    Issue(ApiThreadFields),
    PullRequest(ApiThreadFields),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiComment {
    pub(crate) id: String,
    pub(crate) database_id: u64,
    pub(crate) author: Option<ApiActor>,
    pub(crate) body: String,
    #[serde(rename = "bodyHTML", default)]
    pub(crate) body_html: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

/// Page info as aliased by the bundled queries: `hasMore`/`nextCursor` map to
/// `hasNextPage`/`endCursor` forwards and `hasPreviousPage`/`startCursor`
/// for the from-end variants.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiPageInfo {
    pub(crate) has_more: bool,
    pub(crate) next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiConnection<T> {
    pub(crate) nodes: Vec<Option<T>>,
    pub(crate) page_info: ApiPageInfo,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

impl From<ApiActor> for Actor {
    fn from(value: ApiActor) -> Self {
        Self {
            login: value.login,
            display_name: non_empty(value.name),
            email: non_empty(value.email).or_else(|| non_empty(value.email_or_null)),
        }
    }
}

fn author_or_ghost(author: Option<ApiActor>) -> Actor {
    author.map_or_else(Actor::ghost, Actor::from)
}

impl From<ApiThreadFields> for ThreadData {
    fn from(value: ApiThreadFields) -> Self {
        Self {
            id: value.id,
            number: value.number,
            title: value.title,
            url: value.url,
            author: author_or_ghost(value.author),
            body: value.body,
            body_html: value.body_html,
            created_at: value.created_at,
        }
    }
}

impl From<ApiThread> for Thread {
    fn from(value: ApiThread) -> Self {
        match value {
            ApiThread::Issue(fields) => Self::Issue(fields.into()),
            ApiThread::PullRequest(fields) => Self::PullRequest(fields.into()),
        }
    }
}

impl From<ApiComment> for Comment {
    fn from(value: ApiComment) -> Self {
        Self {
            id: value.id,
            database_id: value.database_id,
            author: author_or_ghost(value.author),
            body: value.body,
            body_html: value.body_html,
            created_at: value.created_at,
        }
    }
}

impl<A, T> From<ApiConnection<A>> for Page<T>
where
    T: From<A>,
{
    fn from(value: ApiConnection<A>) -> Self {
        let next_cursor = if value.page_info.has_more {
            value.page_info.next_cursor
        } else {
            None
        };
        Self {
            items: value.nodes.into_iter().flatten().map(T::from).collect(),
            next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::{Actor, ApiComment, ApiConnection, ApiThread, Comment, Page, Thread};
    use crate::github::locator::ThreadKind;

    #[fixture]
    fn pull_request_json() -> serde_json::Value {
        json!({
            "__typename": "PullRequest",
            "id": "PR_kwDOA",
            "number": 12,
            "title": "Add mbox export",
            "url": "https://github.com/octo/repo/pull/12",
            "author": { "login": "octocat", "name": "The Octocat", "email": "octo@example.com" },
            "body": "Please review",
            "createdAt": "2021-03-04T05:06:07Z"
        })
    }

    #[rstest]
    fn thread_deserialises_tagged_variant(pull_request_json: serde_json::Value) {
        let api: ApiThread =
            serde_json::from_value(pull_request_json).expect("thread should deserialise");
        let thread = Thread::from(api);

        assert_eq!(thread.kind(), ThreadKind::PullRequest);
        assert_eq!(thread.data().number, 12);
        assert_eq!(thread.data().author.name(), "The Octocat");
        assert_eq!(thread.data().author.address(), "octo@example.com");
        assert_eq!(thread.data().body_html, None);
        assert_eq!(
            thread.patch_url().as_deref(),
            Some("https://github.com/octo/repo/pull/12.patch")
        );
    }

    #[rstest]
    fn missing_author_becomes_ghost(mut pull_request_json: serde_json::Value) {
        if let Some(object) = pull_request_json.as_object_mut() {
            object.insert("author".to_owned(), serde_json::Value::Null);
            object.insert("__typename".to_owned(), json!("Issue"));
        }
        let thread = Thread::from(
            serde_json::from_value::<ApiThread>(pull_request_json)
                .expect("thread should deserialise"),
        );

        assert_eq!(thread.data().author, Actor::ghost());
        assert_eq!(thread.data().author.name(), "ghost");
        assert_eq!(thread.data().author.address(), "");
        assert_eq!(thread.patch_url(), None, "issues carry no patch");
    }

    #[rstest]
    fn actor_prefers_email_then_email_or_null() {
        let comment: ApiComment = serde_json::from_value(json!({
            "id": "IC_1",
            "databaseId": 99,
            "author": { "login": "mannequin", "email": "", "emailOrNull": "old@example.com" },
            "body": "hi",
            "bodyHTML": "<p>hi</p>",
            "createdAt": "2021-03-04T05:06:07Z"
        }))
        .expect("comment should deserialise");
        let comment = Comment::from(comment);

        assert_eq!(comment.author.name(), "mannequin", "login is the fallback name");
        assert_eq!(comment.author.address(), "old@example.com");
        assert_eq!(comment.body_html.as_deref(), Some("<p>hi</p>"));
    }

    #[rstest]
    #[case::more_pages(true, Some("Y3Vyc29y"))]
    #[case::final_page(false, None)]
    fn connection_cursor_follows_has_more(
        #[case] has_more: bool,
        #[case] expected: Option<&str>,
    ) {
        let connection: ApiConnection<ApiComment> = serde_json::from_value(json!({
            "nodes": [null],
            "pageInfo": { "hasMore": has_more, "nextCursor": "Y3Vyc29y" }
        }))
        .expect("connection should deserialise");
        let page: Page<Comment> = connection.into();

        assert!(page.items.is_empty(), "null nodes are skipped");
        assert_eq!(page.next_cursor.as_deref(), expected);
    }
}
