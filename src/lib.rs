//! Hubmail library crate: GitHub issues and pull requests as mbox mail.
//!
//! Threads are fetched through the GitHub GraphQL API, each post and comment
//! becomes one RFC 2822 message threaded by `Message-ID`/`In-Reply-To`, and a
//! pull request's patch series is spliced in as per-commit replies. The
//! resulting messages form a single RFC 4155 mbox stream.

pub mod config;
pub mod github;
pub mod mbox;
pub mod render;

pub use config::{ExportTarget, HubmailConfig};
pub use github::{
    GithubClient, HubmailError, ItemCount, PersonalAccessToken, RepositoryLocator, ThreadKind,
    ThreadLocator,
};
pub use mbox::{MboxWriter, RenderedMessage};
pub use render::{RenderOptions, ThreadRenderer};
