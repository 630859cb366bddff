//! [`PageSource`] adapters over a [`ThreadGateway`].

use async_trait::async_trait;

use crate::github::{
    Comment, HubmailError, Page, PageRequest, PageSource, RepositoryLocator, Thread,
    ThreadGateway, ThreadKind,
};

/// A repository's issues or pull requests.
pub(super) struct ThreadPages<'a, G: ThreadGateway + ?Sized> {
    pub(super) gateway: &'a G,
    pub(super) repository: &'a RepositoryLocator,
    pub(super) kind: ThreadKind,
    pub(super) html: bool,
}

#[async_trait]
impl<'a, G: ThreadGateway + ?Sized> PageSource<Thread> for ThreadPages<'a, G> {
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<Thread>, HubmailError> {
        self.gateway
            .threads_page(self.repository, self.kind, request, self.html)
            .await
    }
}

/// The comments of one thread.
pub(super) struct CommentPages<'a, G: ThreadGateway + ?Sized> {
    pub(super) gateway: &'a G,
    pub(super) thread_id: &'a str,
    pub(super) html: bool,
}

#[async_trait]
impl<'a, G: ThreadGateway + ?Sized> PageSource<Comment> for CommentPages<'a, G> {
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<Comment>, HubmailError> {
        self.gateway
            .comments_page(self.thread_id, request, self.html)
            .await
    }
}
