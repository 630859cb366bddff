//! reqwest-backed GitHub client shared by every gateway operation.

use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::github::error::HubmailError;
use crate::github::locator::{PersonalAccessToken, RepositoryLocator, ThreadKind, ThreadLocator};
use crate::github::models::{Comment, Page, Thread};
use crate::github::pagination::PageRequest;

use super::error_mapping::{extract_github_message, map_http_error, map_transport_error};
use super::graphql::{
    NodeData, Operation, QUERY_DOCUMENT, RepositoryData, ThreadField, ThreadsField,
    decode_response,
};
use super::{ResourceFetcher, ThreadGateway};

/// Default GitHub GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("hubmail/", env!("CARGO_PKG_VERSION"));

/// GitHub client owning the run's single connection pool.
///
/// GraphQL queries are sent with bearer authentication; patch and image
/// downloads reuse the same pool without credentials.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    endpoint: Url,
    token: PersonalAccessToken,
}

impl GithubClient {
    /// Builds a client for the given token and GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::InvalidUrl`] when the endpoint cannot be
    /// parsed or [`HubmailError::Configuration`] when the HTTP client cannot
    /// be constructed.
    pub fn new(
        token: PersonalAccessToken,
        api_url: &str,
        timeout: Duration,
    ) -> Result<Self, HubmailError> {
        let endpoint =
            Url::parse(api_url).map_err(|error| HubmailError::InvalidUrl(error.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| HubmailError::Configuration {
                message: format!("failed to configure HTTP client: {error}"),
            })?;

        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// GraphQL endpoint the client posts to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        variables: serde_json::Value,
    ) -> Result<T, HubmailError> {
        let name = operation.name();
        debug!(operation = name, "executing GraphQL query");

        let payload = json!({
            "query": QUERY_DOCUMENT,
            "variables": variables,
            "operationName": name,
        });
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(self.token.value())
            .json(&payload)
            .send()
            .await
            .map_err(|error| map_transport_error(name, &error))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| map_transport_error(name, &error))?;

        if !status.is_success() {
            return Err(map_http_error(name, status, extract_github_message(&body)));
        }

        decode_response(operation, &body)
    }
}

#[async_trait]
impl ThreadGateway for GithubClient {
    async fn thread(&self, locator: &ThreadLocator, html: bool) -> Result<Thread, HubmailError> {
        let repository = locator.repository();
        let variables = json!({
            "user": repository.owner().as_str(),
            "repo": repository.repository().as_str(),
            "number": locator.number().get(),
            "html": html,
        });
        let data: RepositoryData<ThreadField> = self
            .execute(Operation::thread(locator.kind()), variables)
            .await?;

        data.repository
            .ok_or_else(|| HubmailError::NotFound {
                what: format!("repository {}", repository.slug()),
            })?
            .thread
            .map(Thread::from)
            .ok_or_else(|| HubmailError::NotFound {
                what: format!("{} {}", locator.kind(), locator.thread_key()),
            })
    }

    async fn threads_page(
        &self,
        repository: &RepositoryLocator,
        kind: ThreadKind,
        request: PageRequest,
        html: bool,
    ) -> Result<Page<Thread>, HubmailError> {
        let variables = json!({
            "user": repository.owner().as_str(),
            "repo": repository.repository().as_str(),
            "numThreads": request.size,
            "cursor": request.cursor,
            "html": html,
        });
        let data: RepositoryData<ThreadsField> = self
            .execute(Operation::threads(kind, request.direction), variables)
            .await?;

        data.repository
            .map(|field| field.threads.into())
            .ok_or_else(|| HubmailError::NotFound {
                what: format!("repository {}", repository.slug()),
            })
    }

    async fn comments_page(
        &self,
        thread_id: &str,
        request: PageRequest,
        html: bool,
    ) -> Result<Page<Comment>, HubmailError> {
        let variables = json!({
            "id": thread_id,
            "numComments": request.size,
            "cursor": request.cursor,
            "html": html,
        });
        let data: NodeData = self
            .execute(Operation::comments(request.direction), variables)
            .await?;

        data.node
            .and_then(|node| node.comments)
            .map(Page::from)
            .ok_or_else(|| HubmailError::NotFound {
                what: format!("comments of node {thread_id}"),
            })
    }
}

#[async_trait]
impl ResourceFetcher for GithubClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, HubmailError> {
        let operation = format!("GET {url}");
        debug!(url, "fetching resource");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| map_transport_error(&operation, &error))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.bytes().await.unwrap_or_default();
            return Err(map_http_error(
                &operation,
                status,
                extract_github_message(&body),
            ));
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|error| map_transport_error(&operation, &error))
    }
}
