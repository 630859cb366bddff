//! GitHub thread retrieval over the GraphQL API.
//!
//! This module parses thread URLs, validates personal access tokens, walks
//! paginated connections, and decodes issues, pull requests and comments into
//! closed domain types. Transport and protocol failures are mapped into
//! [`HubmailError`] variants so that callers can surface precise failures
//! without exposing reqwest internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;

pub use error::HubmailError;
pub use gateway::{GithubClient, ResourceFetcher, ThreadGateway};
pub use locator::{
    PersonalAccessToken, RepositoryLocator, RepositoryName, RepositoryOwner, ThreadKind,
    ThreadLocator, ThreadNumber,
};
pub use models::{Actor, Comment, Page, Thread, ThreadData};
pub use pagination::{ItemCount, PageDirection, PageRequest, PageSource, Paginator};

#[cfg(test)]
pub use gateway::{MockResourceFetcher, MockThreadGateway};

#[cfg(test)]
mod tests;
