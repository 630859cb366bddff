//! Identity wrappers and locators for repositories and discussion threads.

use std::fmt;
use std::str::FromStr;

use url::Url;

use super::error::HubmailError;

/// Domain used on the right-hand side of every generated `Message-ID`.
pub const MESSAGE_ID_DOMAIN: &str = "github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, HubmailError> {
        if value.is_empty() {
            return Err(HubmailError::Configuration {
                message: "repository owner must not be empty".to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, HubmailError> {
        if value.is_empty() {
            return Err(HubmailError::Configuration {
                message: "repository name must not be empty".to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Issue or pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadNumber(u64);

impl ThreadNumber {
    /// Validates that the number is positive.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::InvalidThreadNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, HubmailError> {
        if value == 0 {
            return Err(HubmailError::InvalidThreadNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ThreadNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::MissingToken`] when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, HubmailError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(HubmailError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PersonalAccessToken(<redacted>)")
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// The two kinds of discussion thread GitHub exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadKind {
    /// A repository issue.
    Issue,
    /// A pull request.
    PullRequest,
}

impl ThreadKind {
    /// Path segment used in thread URLs and message identifiers.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::PullRequest => "pull",
        }
    }

    fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "issues" => Some(Self::Issue),
            "pull" => Some(Self::PullRequest),
            _ => None,
        }
    }
}

impl fmt::Display for ThreadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => write!(f, "issue"),
            Self::PullRequest => write!(f, "pull request"),
        }
    }
}

/// A repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Creates a repository locator from owner and repository name strings.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::Configuration`] when owner or repo is empty.
    pub fn from_owner_repo(owner: &str, repo: &str) -> Result<Self, HubmailError> {
        Ok(Self {
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repo)?,
        })
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Returns `owner/repo`.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    /// Locates one thread of the given kind within this repository.
    #[must_use]
    pub fn thread(&self, kind: ThreadKind, number: ThreadNumber) -> ThreadLocator {
        ThreadLocator {
            repository: self.clone(),
            kind,
            number,
        }
    }
}

/// One issue or pull request within a repository.
///
/// The locator owns the identity used to thread the rendered messages: the
/// thread key `owner/repo/{issues|pull}/<number>` appears in every
/// `Message-ID` generated for the thread.
///
/// # Example
///
/// ```
/// use hubmail::github::locator::{ThreadKind, ThreadLocator};
///
/// let locator = ThreadLocator::parse("https://github.com/octo/repo/pull/7")
///     .expect("should parse pull request URL");
/// assert_eq!(locator.kind(), ThreadKind::PullRequest);
/// assert_eq!(locator.message_id(), "<octo/repo/pull/7@github.com>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadLocator {
    repository: RepositoryLocator,
    kind: ThreadKind,
    number: ThreadNumber,
}

impl ThreadLocator {
    /// Parses a GitHub thread URL in the form
    /// `https://github.com/<owner>/<repo>/{issues|pull}/<number>`.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::InvalidUrl`] when parsing fails or the path is
    /// not a thread path, and [`HubmailError::InvalidThreadNumber`] when the
    /// final segment is not a positive integer.
    pub fn parse(input: &str) -> Result<Self, HubmailError> {
        let parsed =
            Url::parse(input).map_err(|error| HubmailError::InvalidUrl(error.to_string()))?;
        let missing = || {
            HubmailError::InvalidUrl(format!(
                "{input}: expected /owner/repo/issues/<number> or /owner/repo/pull/<number>"
            ))
        };

        let mut segments = parsed.path_segments().ok_or_else(missing)?;
        let owner = segments.next().ok_or_else(missing)?;
        let repository = segments.next().ok_or_else(missing)?;
        let kind = segments
            .next()
            .and_then(ThreadKind::from_path_segment)
            .ok_or_else(missing)?;
        let number_segment = segments.next().filter(|s| !s.is_empty()).ok_or_else(missing)?;

        let number = number_segment
            .parse::<u64>()
            .map_err(|_| HubmailError::InvalidThreadNumber)
            .and_then(ThreadNumber::new)?;

        Ok(RepositoryLocator::from_owner_repo(owner, repository)?.thread(kind, number))
    }

    /// Repository containing the thread.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryLocator {
        &self.repository
    }

    /// Kind of thread.
    #[must_use]
    pub const fn kind(&self) -> ThreadKind {
        self.kind
    }

    /// Thread number.
    #[must_use]
    pub const fn number(&self) -> ThreadNumber {
        self.number
    }

    /// Returns `owner/repo/{issues|pull}/<number>`.
    #[must_use]
    pub fn thread_key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.repository.slug(),
            self.kind.path_segment(),
            self.number
        )
    }

    /// Message identifier of the thread's root message.
    #[must_use]
    pub fn message_id(&self) -> String {
        format!("<{}@{MESSAGE_ID_DOMAIN}>", self.thread_key())
    }

    /// Message identifier of a comment in this thread.
    #[must_use]
    pub fn comment_message_id(&self, database_id: u64) -> String {
        format!("<{}/c{database_id}@{MESSAGE_ID_DOMAIN}>", self.thread_key())
    }

    /// Message identifier of one commit of this pull request's patch series.
    #[must_use]
    pub fn commit_message_id(&self, commit: &str) -> String {
        format!("<{}/{commit}@{MESSAGE_ID_DOMAIN}>", self.thread_key())
    }
}

impl FromStr for ThreadLocator {
    type Err = HubmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
