//! Bounded, bidirectional cursor pagination.
//!
//! A [`Paginator`] walks a [`PageSource`] one page at a time and yields item
//! batches until either the cursor chain ends or the requested
//! [`ItemCount`] is reached. Nothing is fetched before the first call to
//! [`Paginator::next_batch`], and an exhausted paginator never fetches again.
//!
//! # Count semantics
//!
//! - [`ItemCount::All`] yields every page verbatim.
//! - [`ItemCount::First`] walks from the start and trims the tail of the page
//!   that reaches the limit, then stops.
//! - [`ItemCount::Last`] walks from the end. Sources return from-end pages
//!   newest page first, each page in GitHub's chronological order; pages are
//!   reversed locally so the same tail trimming drops the oldest surplus. The
//!   walk buffers at most `n` items so batches can be emitted oldest first.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use tracing::debug;

use super::error::HubmailError;
use super::models::Page;

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size the GitHub GraphQL API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Number of items requested from a paginated connection.
///
/// # Example
///
/// ```
/// use hubmail::github::pagination::ItemCount;
///
/// assert_eq!(ItemCount::from_signed(None), ItemCount::All);
/// assert_eq!(ItemCount::from_signed(Some(5)), ItemCount::First(5));
/// assert_eq!(ItemCount::from_signed(Some(-3)), ItemCount::Last(3));
/// assert_eq!("all".parse::<ItemCount>().ok(), Some(ItemCount::All));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCount {
    /// Every item.
    All,
    /// The first `n` items; zero requests nothing.
    First(u32),
    /// The last `n` items, yielded in chronological order.
    Last(u32),
}

impl ItemCount {
    /// Converts the signed optional count used on the command line.
    ///
    /// Magnitudes beyond `u32::MAX` saturate.
    #[must_use]
    pub fn from_signed(value: Option<i64>) -> Self {
        match value {
            None => Self::All,
            Some(n) => {
                let magnitude = u32::try_from(n.unsigned_abs()).unwrap_or(u32::MAX);
                if n < 0 {
                    Self::Last(magnitude)
                } else {
                    Self::First(magnitude)
                }
            }
        }
    }

    /// Item limit, or `None` for [`ItemCount::All`].
    #[must_use]
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::First(n) | Self::Last(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }

    /// Returns true when no items are requested at all.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::First(0) | Self::Last(0))
    }

    /// Walk direction implied by the count.
    #[must_use]
    pub const fn direction(self) -> PageDirection {
        match self {
            Self::Last(_) => PageDirection::FromEnd,
            Self::All | Self::First(_) => PageDirection::FromStart,
        }
    }

    /// Page size to request: the cap, shrunk to the count when smaller.
    #[must_use]
    pub const fn page_size(self, cap: u32) -> u32 {
        match self {
            Self::First(n) | Self::Last(n) if n > 0 && n < cap => n,
            _ => cap,
        }
    }
}

impl FromStr for ItemCount {
    type Err = HubmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed
            .parse::<i64>()
            .map(|n| Self::from_signed(Some(n)))
            .map_err(|_| HubmailError::Configuration {
                message: format!("invalid count '{s}': expected 'all' or a signed integer"),
            })
    }
}

impl fmt::Display for ItemCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::First(n) => write!(f, "first {n}"),
            Self::Last(n) => write!(f, "last {n}"),
        }
    }
}

/// Direction in which a connection is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    /// Oldest items first (`first`/`after`).
    FromStart,
    /// Newest page first (`last`/`before`).
    FromEnd,
}

/// Parameters for fetching one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of items to return.
    pub size: u32,
    /// Cursor returned with the previous page, if any.
    pub cursor: Option<String>,
    /// Walk direction.
    pub direction: PageDirection,
}

/// Something that can fetch one page of items.
#[async_trait]
pub trait PageSource<T: Send>: Send + Sync {
    /// Fetch the page described by `request`.
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>, HubmailError>;
}

/// Validates a configured page size.
///
/// # Errors
///
/// Returns [`HubmailError::InvalidPagination`] when the size is zero or
/// exceeds [`MAX_PAGE_SIZE`].
pub fn validate_page_size(page_size: u32) -> Result<u32, HubmailError> {
    if page_size == 0 {
        return Err(HubmailError::InvalidPagination {
            message: "page size must be at least 1".to_owned(),
        });
    }

    if page_size > MAX_PAGE_SIZE {
        return Err(HubmailError::InvalidPagination {
            message: format!("page size must not exceed {MAX_PAGE_SIZE}"),
        });
    }

    Ok(page_size)
}

/// Lazy, finite, non-restartable batch sequence over a [`PageSource`].
pub struct Paginator<'source, T, S>
where
    T: Send,
    S: PageSource<T> + ?Sized,
{
    source: &'source S,
    count: ItemCount,
    page_size: u32,
    cursor: Option<String>,
    total: usize,
    exhausted: bool,
    collected: bool,
    buffered: VecDeque<Vec<T>>,
}

impl<'source, T, S> Paginator<'source, T, S>
where
    T: Send,
    S: PageSource<T> + ?Sized,
{
    /// Creates a paginator; no request is made until the first batch is read.
    #[must_use]
    pub fn new(source: &'source S, count: ItemCount, page_cap: u32) -> Self {
        Self {
            source,
            count,
            page_size: count.page_size(page_cap),
            cursor: None,
            total: 0,
            exhausted: count.is_none(),
            collected: false,
            buffered: VecDeque::new(),
        }
    }

    /// Returns the next batch, or `None` once the sequence is complete.
    ///
    /// # Errors
    ///
    /// Propagates the first page-fetch failure unchanged; the paginator is
    /// exhausted afterwards.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<T>>, HubmailError> {
        match self.count.direction() {
            PageDirection::FromStart => self.next_from_start().await,
            PageDirection::FromEnd => self.next_from_end().await,
        }
    }

    async fn next_from_start(&mut self) -> Result<Option<Vec<T>>, HubmailError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.fetch(PageDirection::FromStart).await?;
        let items = self.take_within_limit(page.items);
        self.advance(page.next_cursor);
        Ok(Some(items))
    }

    async fn next_from_end(&mut self) -> Result<Option<Vec<T>>, HubmailError> {
        if !self.collected {
            self.collected = true;
            self.collect_from_end().await?;
        }
        Ok(self.buffered.pop_front())
    }

    async fn collect_from_end(&mut self) -> Result<(), HubmailError> {
        let mut newest_first: Vec<Vec<T>> = Vec::new();

        while !self.exhausted {
            let page = self.fetch(PageDirection::FromEnd).await?;
            let mut items = page.items;
            items.reverse();
            newest_first.push(self.take_within_limit(items));
            self.advance(page.next_cursor);
        }

        self.buffered = newest_first
            .into_iter()
            .rev()
            .filter(|batch| !batch.is_empty())
            .map(|mut batch| {
                batch.reverse();
                batch
            })
            .collect();
        Ok(())
    }

    async fn fetch(&mut self, direction: PageDirection) -> Result<Page<T>, HubmailError> {
        let request = PageRequest {
            size: self.page_size,
            cursor: self.cursor.clone(),
            direction,
        };
        debug!(
            size = request.size,
            ?direction,
            has_cursor = request.cursor.is_some(),
            "fetching page"
        );

        match self.source.fetch_page(request).await {
            Ok(page) => Ok(page),
            Err(error) => {
                self.exhausted = true;
                self.buffered.clear();
                Err(error)
            }
        }
    }

    /// Counts `items` against the limit, trimming the tail past it.
    fn take_within_limit(&mut self, mut items: Vec<T>) -> Vec<T> {
        self.total = self.total.saturating_add(items.len());
        if let Some(limit) = self.count.limit()
            && self.total >= limit
        {
            let excess = self.total - limit;
            items.truncate(items.len().saturating_sub(excess));
            self.total = limit;
            self.exhausted = true;
        }
        items
    }

    fn advance(&mut self, next_cursor: Option<String>) {
        if next_cursor.is_none() {
            self.exhausted = true;
        }
        self.cursor = next_cursor;
    }
}
