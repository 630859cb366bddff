//! Thread rendering: from GitHub threads to ordered mbox messages.
//!
//! A single thread renders as its opening post, then (for pull requests) one
//! message per commit of the patch series, then the requested comments. The
//! whole thread is rendered before anything is returned, so a failure never
//! leaves half a thread in the output. Collections stream thread by thread
//! into an [`MboxWriter`].

mod pages;

use std::io::Write;

use tracing::{debug, info};

use crate::github::pagination::DEFAULT_PAGE_SIZE;
use crate::github::{
    HubmailError, ItemCount, Paginator, RepositoryLocator, ResourceFetcher, Thread,
    ThreadGateway, ThreadKind, ThreadLocator, ThreadNumber,
};
use crate::mbox::{EmailDraft, MboxWriter, MessageAssembler, PatchSplitter, RenderedMessage};

use pages::{CommentPages, ThreadPages};

/// Rendering switches shared by every thread of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Body and header wrap width; `None` or zero disables wrapping.
    pub wrap: Option<usize>,
    /// Prefix subjects with `[owner/repo]` and suffix them with `(#N)`.
    pub extended_subject: bool,
    /// Add GitHub's rendered HTML as a `multipart/alternative` part.
    pub html: bool,
    /// Comments rendered per thread.
    pub comments: ItemCount,
    /// Threads rendered per collection.
    pub threads: ItemCount,
    /// Page size cap for paginated queries.
    pub page_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wrap: None,
            extended_subject: false,
            html: false,
            comments: ItemCount::First(0),
            threads: ItemCount::All,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Renders threads fetched through `G`, downloading patches and images
/// through `F`.
pub struct ThreadRenderer<'a, G, F>
where
    G: ThreadGateway + ?Sized,
    F: ResourceFetcher + ?Sized,
{
    gateway: &'a G,
    fetcher: &'a F,
    options: RenderOptions,
}

impl<'a, G, F> ThreadRenderer<'a, G, F>
where
    G: ThreadGateway + ?Sized,
    F: ResourceFetcher + ?Sized,
{
    /// Creates a renderer.
    #[must_use]
    pub const fn new(gateway: &'a G, fetcher: &'a F, options: RenderOptions) -> Self {
        Self {
            gateway,
            fetcher,
            options,
        }
    }

    /// Options in effect.
    #[must_use]
    pub const fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Subject of a thread's opening message.
    #[must_use]
    pub fn subject(&self, repository: &RepositoryLocator, thread: &Thread) -> String {
        let data = thread.data();
        if self.options.extended_subject {
            format!("[{}] {} (#{})", repository.slug(), data.title, data.number)
        } else {
            data.title.clone()
        }
    }

    /// Fetches and renders one thread.
    ///
    /// # Errors
    ///
    /// Returns the first gateway, patch download or patch layout failure;
    /// no messages are returned for a failed thread.
    pub async fn render_thread(
        &self,
        locator: &ThreadLocator,
    ) -> Result<Vec<RenderedMessage>, HubmailError> {
        let thread = self.gateway.thread(locator, self.options.html).await?;
        self.render_fetched(locator, &thread).await
    }

    /// Renders every thread of one kind in `repository`, writing each thread
    /// as soon as it is complete. Returns the number of threads written.
    ///
    /// # Errors
    ///
    /// Aborts on the first failure; threads already written stay written.
    pub async fn render_collection<W: Write>(
        &self,
        repository: &RepositoryLocator,
        kind: ThreadKind,
        writer: &mut MboxWriter<W>,
    ) -> Result<usize, HubmailError> {
        let source = ThreadPages {
            gateway: self.gateway,
            repository,
            kind,
            html: self.options.html,
        };
        let mut paginator = Paginator::new(&source, self.options.threads, self.options.page_size);

        let mut rendered = 0;
        while let Some(batch) = paginator.next_batch().await? {
            for thread in batch {
                let number = ThreadNumber::new(thread.data().number)?;
                let locator = repository.thread(thread.kind(), number);
                let messages = self.render_fetched(&locator, &thread).await?;
                writer.write_all(&messages)?;
                rendered += 1;
            }
        }

        info!(
            repository = %repository.slug(),
            %kind,
            threads = rendered,
            "rendered collection"
        );
        Ok(rendered)
    }

    async fn render_fetched(
        &self,
        locator: &ThreadLocator,
        thread: &Thread,
    ) -> Result<Vec<RenderedMessage>, HubmailError> {
        debug!(thread = %locator.thread_key(), "rendering thread");

        let data = thread.data();
        let assembler = MessageAssembler::new(self.fetcher, self.options.wrap);
        let subject = self.subject(locator.repository(), thread);
        let root_id = locator.message_id();

        let root = EmailDraft::new(
            &data.author,
            data.created_at,
            &subject,
            &data.body,
            &root_id,
        )
        .html(self.html_for(data.body_html.as_deref()));
        let mut messages = vec![assembler.assemble(&root).await];

        if let Some(patch_url) = thread.patch_url() {
            let raw = self.fetcher.fetch(&patch_url).await?;
            let splitter =
                PatchSplitter::new(locator, self.options.wrap, self.options.extended_subject);
            let patches = splitter.split(&raw)?;
            debug!(thread = %locator.thread_key(), commits = patches.len(), "split patch series");
            messages.extend(patches);
        }

        if !self.options.comments.is_none() {
            let reply_subject = format!("Re: {subject}");
            let source = CommentPages {
                gateway: self.gateway,
                thread_id: &data.id,
                html: self.options.html,
            };
            let mut paginator =
                Paginator::new(&source, self.options.comments, self.options.page_size);

            while let Some(batch) = paginator.next_batch().await? {
                for comment in batch {
                    let comment_id = locator.comment_message_id(comment.database_id);
                    let draft = EmailDraft::new(
                        &comment.author,
                        comment.created_at,
                        &reply_subject,
                        &comment.body,
                        &comment_id,
                    )
                    .in_reply_to(&root_id)
                    .html(self.html_for(comment.body_html.as_deref()));
                    messages.push(assembler.assemble(&draft).await);
                }
            }
        }

        Ok(messages)
    }

    const fn html_for<'b>(&self, body_html: Option<&'b str>) -> Option<&'b str> {
        if self.options.html { body_html } else { None }
    }
}
