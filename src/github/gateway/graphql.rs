//! GraphQL operations and response envelopes.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::github::error::HubmailError;
use crate::github::locator::ThreadKind;
use crate::github::models::{ApiComment, ApiConnection, ApiThread};
use crate::github::pagination::PageDirection;

/// Bundled query document containing every operation.
pub(crate) const QUERY_DOCUMENT: &str = include_str!("../queries.graphql");

/// Named operation within [`QUERY_DOCUMENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Issue,
    PullRequest,
    Issues,
    IssuesFromEnd,
    PullRequests,
    PullRequestsFromEnd,
    Comments,
    CommentsFromEnd,
}

impl Operation {
    pub(crate) const fn thread(kind: ThreadKind) -> Self {
        match kind {
            ThreadKind::Issue => Self::Issue,
            ThreadKind::PullRequest => Self::PullRequest,
        }
    }

    pub(crate) const fn threads(kind: ThreadKind, direction: PageDirection) -> Self {
        match (kind, direction) {
            (ThreadKind::Issue, PageDirection::FromStart) => Self::Issues,
            (ThreadKind::Issue, PageDirection::FromEnd) => Self::IssuesFromEnd,
            (ThreadKind::PullRequest, PageDirection::FromStart) => Self::PullRequests,
            (ThreadKind::PullRequest, PageDirection::FromEnd) => Self::PullRequestsFromEnd,
        }
    }

    pub(crate) const fn comments(direction: PageDirection) -> Self {
        match direction {
            PageDirection::FromStart => Self::Comments,
            PageDirection::FromEnd => Self::CommentsFromEnd,
        }
    }

    /// The `operationName` sent with the request.
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Issue => "Issue",
            Self::PullRequest => "PullRequest",
            Self::Issues => "Issues",
            Self::IssuesFromEnd => "IssuesFromEnd",
            Self::PullRequests => "PullRequests",
            Self::PullRequestsFromEnd => "PullRequestsFromEnd",
            Self::Comments => "Comments",
            Self::CommentsFromEnd => "CommentsFromEnd",
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryData<T> {
    pub(crate) repository: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThreadField {
    pub(crate) thread: Option<ApiThread>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThreadsField {
    pub(crate) threads: ApiConnection<ApiThread>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeData {
    pub(crate) node: Option<CommentsField>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentsField {
    pub(crate) comments: Option<ApiConnection<ApiComment>>,
}

/// Decodes a GraphQL response body, rejecting any `errors` member.
pub(crate) fn decode_response<T: DeserializeOwned>(
    operation: Operation,
    body: &[u8],
) -> Result<T, HubmailError> {
    let decode_error = |error: serde_json::Error| HubmailError::Decode {
        operation: operation.name().to_owned(),
        message: error.to_string(),
    };

    let envelope: GraphqlEnvelope = serde_json::from_slice(body).map_err(decode_error)?;

    if let Some(errors) = envelope.errors {
        let message = if errors.is_empty() {
            "response carried an empty errors list".to_owned()
        } else {
            errors
                .into_iter()
                .map(|entry| entry.message)
                .collect::<Vec<_>>()
                .join("; ")
        };
        return Err(HubmailError::Graphql {
            operation: operation.name().to_owned(),
            message,
        });
    }

    let data = envelope.data.ok_or_else(|| HubmailError::NotFound {
        what: format!("data for {}", operation.name()),
    })?;
    serde_json::from_value(data).map_err(decode_error)
}
