//! Gateways for loading threads, comments, patches and images from GitHub.
//!
//! This module provides trait-based gateways for communicating with GitHub.
//! The trait-based design enables mocking in tests while [`GithubClient`]
//! handles real HTTP requests over one shared connection pool.

mod client;
mod error_mapping;
mod graphql;

pub use client::{DEFAULT_API_URL, DEFAULT_TIMEOUT, GithubClient};

use async_trait::async_trait;

use crate::github::error::HubmailError;
use crate::github::locator::{RepositoryLocator, ThreadKind, ThreadLocator};
use crate::github::models::{Comment, Page, Thread};
use crate::github::pagination::PageRequest;

/// Gateway that can load threads and their comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThreadGateway: Send + Sync {
    /// Fetch one issue or pull request.
    async fn thread(&self, locator: &ThreadLocator, html: bool) -> Result<Thread, HubmailError>;

    /// Fetch one page of a repository's issues or pull requests.
    async fn threads_page(
        &self,
        repository: &RepositoryLocator,
        kind: ThreadKind,
        request: PageRequest,
        html: bool,
    ) -> Result<Page<Thread>, HubmailError>;

    /// Fetch one page of comments on the thread with node id `thread_id`.
    async fn comments_page(
        &self,
        thread_id: &str,
        request: PageRequest,
        html: bool,
    ) -> Result<Page<Comment>, HubmailError>;
}

/// Raw, unauthenticated downloads (patch mailboxes and images).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the body of `url`, requiring a `200 OK` response.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, HubmailError>;
}
