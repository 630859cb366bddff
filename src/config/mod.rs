//! Application configuration loaded from CLI, environment, and files.
//!
//! Values merge through ortho-config's layers, lowest to highest:
//!
//! 1. **Defaults** – built-in application defaults
//! 2. **Configuration file** – `.hubmail.toml` in the current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `HUBMAIL_TOKEN`, `HUBMAIL_USER`, …
//! 4. **Command-line arguments** – `--kind`/`-k`, `--comments`/`-c`, …
//!
//! # Configuration File
//!
//! ```toml
//! kind = "issues"
//! user = "octocat"
//! repo = "hello-world"
//! comments = "-5"
//! threads = "10"
//! wrap = 72
//! extended_subject = true
//! ```

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::pagination::{DEFAULT_PAGE_SIZE, validate_page_size};
use crate::github::{
    HubmailError, ItemCount, PersonalAccessToken, RepositoryLocator, ThreadKind, ThreadLocator,
    ThreadNumber,
};
use crate::render::RenderOptions;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Column width used when `--wrap`/`-w` is given without a value.
pub const DEFAULT_WRAP_WIDTH: usize = 72;

/// What a run exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// One issue or pull request.
    Thread(ThreadLocator),
    /// Every issue, or every pull request, of a repository.
    Collection {
        /// Repository to walk.
        repository: RepositoryLocator,
        /// Kind of thread to export.
        kind: ThreadKind,
    },
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use hubmail::HubmailConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = HubmailConfig::load().expect("failed to load configuration");
/// let target = config.target().expect("export target required");
/// let token = config.require_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "HUBMAIL",
    discovery(
        dotfile_name = ".hubmail.toml",
        config_file_name = "hubmail.toml",
        app_name = "hubmail"
    )
)]
pub struct HubmailConfig {
    /// What to export: `issue`, `pull`, `issues` or `pulls`.
    ///
    /// Inferred from `url` when absent.
    #[ortho_config(cli_short = 'k')]
    pub kind: Option<String>,

    /// Owner of the repository.
    #[ortho_config(cli_short = 'u')]
    pub user: Option<String>,

    /// Name of the repository.
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Issue or pull request number, for `issue` and `pull`.
    #[ortho_config(cli_short = 'n')]
    pub number: Option<u64>,

    /// Issue or pull request URL, in place of `user`, `repo` and `number`.
    #[ortho_config()]
    pub url: Option<String>,

    /// Comments per thread: `all`, the first N (positive) or the latest N
    /// (negative). No comments when absent.
    #[ortho_config(cli_short = 'c')]
    pub comments: Option<String>,

    /// Threads per collection, with the same syntax as `comments`. Every
    /// thread when absent.
    #[ortho_config(cli_short = 't')]
    pub threads: Option<String>,

    /// Wrap text to this many columns; absent or zero disables wrapping.
    /// A bare `--wrap` means [`DEFAULT_WRAP_WIDTH`] once the arguments have
    /// passed through [`expand_bare_wrap`].
    #[ortho_config(cli_short = 'w')]
    pub wrap: Option<usize>,

    /// Include the repository and thread number in subjects, like GitHub
    /// notification emails.
    ///
    /// Note: `HUBMAIL_EXTENDED_SUBJECT` is not read because `ortho_config`
    /// does not load boolean values from the environment.
    #[ortho_config()]
    pub extended_subject: bool,

    /// Add GitHub's rendered HTML as an alternative part.
    #[ortho_config()]
    pub html: bool,

    /// Personal access token for the GraphQL API.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>`
    /// - Environment: `HUBMAIL_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config()]
    pub token: Option<String>,

    /// GraphQL endpoint; defaults to `https://api.github.com/graphql`.
    #[ortho_config()]
    pub api_url: Option<String>,

    /// Items requested per page, at most 100.
    #[ortho_config()]
    pub page_size: u32,

    /// HTTP request timeout.
    #[ortho_config()]
    pub timeout_seconds: u64,

    /// Write the mailbox to this file instead of stdout.
    #[ortho_config(cli_short = 'o')]
    pub output: Option<PathBuf>,
}

impl Default for HubmailConfig {
    fn default() -> Self {
        Self {
            kind: None,
            user: None,
            repo: None,
            number: None,
            url: None,
            comments: None,
            threads: None,
            wrap: None,
            extended_subject: false,
            html: false,
            token: None,
            api_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            output: None,
        }
    }
}

impl HubmailConfig {
    /// Resolves what to export.
    ///
    /// A `url` takes precedence over `user`/`repo`/`number`; when both a URL
    /// and a `kind` are given they must agree.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::Configuration`] for an unknown or missing
    /// kind, a missing owner, repository or number, and a kind that
    /// contradicts the URL. URL parse failures surface as
    /// [`HubmailError::InvalidUrl`] and a zero number as
    /// [`HubmailError::InvalidThreadNumber`].
    pub fn target(&self) -> Result<ExportTarget, HubmailError> {
        let kind = self.kind.as_deref().map(parse_kind).transpose()?;

        if let Some(url) = self.url.as_deref() {
            let locator = ThreadLocator::parse(url)?;
            if !kind_matches(kind, locator.kind()) {
                return Err(configuration(format!(
                    "--kind {} does not match {url}",
                    self.kind.as_deref().unwrap_or_default()
                )));
            }
            return Ok(ExportTarget::Thread(locator));
        }

        let kind = kind.ok_or_else(|| {
            configuration("export kind is required (use --kind issue|pull|issues|pulls or --url)")
        })?;
        let repository = self.repository()?;
        match kind {
            TargetKind::Single(thread_kind) => {
                let number = self
                    .number
                    .ok_or_else(|| configuration("thread number is required (use --number or -n)"))
                    .and_then(ThreadNumber::new)?;
                Ok(ExportTarget::Thread(repository.thread(thread_kind, number)))
            }
            TargetKind::Collection(thread_kind) => Ok(ExportTarget::Collection {
                repository,
                kind: thread_kind,
            }),
        }
    }

    /// Comments rendered per thread; none unless configured.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::Configuration`] when the value is neither
    /// `all` nor an integer.
    pub fn comment_count(&self) -> Result<ItemCount, HubmailError> {
        self.comments
            .as_deref()
            .map_or(Ok(ItemCount::First(0)), str::parse)
    }

    /// Threads rendered per collection; all unless configured.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::Configuration`] when the value is neither
    /// `all` nor an integer.
    pub fn thread_count(&self) -> Result<ItemCount, HubmailError> {
        self.threads
            .as_deref()
            .map_or(Ok(ItemCount::All), str::parse)
    }

    /// Rendering options for this run.
    ///
    /// # Errors
    ///
    /// Propagates count parse failures and returns
    /// [`HubmailError::InvalidPagination`] for an out-of-range page size.
    pub fn render_options(&self) -> Result<RenderOptions, HubmailError> {
        Ok(RenderOptions {
            wrap: self.wrap.filter(|width| *width > 0),
            extended_subject: self.extended_subject,
            html: self.html,
            comments: self.comment_count()?,
            threads: self.thread_count()?,
            page_size: validate_page_size(self.page_size)?,
        })
    }

    /// Returns the validated API token.
    ///
    /// # Errors
    ///
    /// Returns [`HubmailError::MissingToken`] when no layer provides a
    /// non-blank token.
    pub fn require_token(&self) -> Result<PersonalAccessToken, HubmailError> {
        self.token
            .as_deref()
            .map_or(Err(HubmailError::MissingToken), PersonalAccessToken::new)
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn repository(&self) -> Result<RepositoryLocator, HubmailError> {
        match (self.user.as_deref(), self.repo.as_deref()) {
            (Some(user), Some(repo)) => RepositoryLocator::from_owner_repo(user, repo),
            (None, _) => Err(configuration(
                "repository owner is required (use --user or -u)",
            )),
            (_, None) => Err(configuration("repository name is required (use --repo or -r)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    Single(ThreadKind),
    Collection(ThreadKind),
}

/// Gives a bare `--wrap` or `-w` its default width.
///
/// The flag's value is optional on the command line: when the next argument
/// is not a column count, `--wrap=72` is substituted. Arguments after `--`
/// are passed through unchanged.
///
/// # Example
///
/// ```
/// use hubmail::config::expand_bare_wrap;
///
/// let args = expand_bare_wrap(["hubmail", "-w", "--html"]);
/// assert_eq!(args, ["hubmail", "--wrap=72", "--html"]);
/// ```
#[must_use]
pub fn expand_bare_wrap<I, T>(raw: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = raw.into_iter().map(Into::into).peekable();
    let mut expanded = Vec::new();
    let mut options_ended = false;
    while let Some(arg) = args.next() {
        let bare_wrap = !options_ended
            && (arg == "--wrap" || arg == "-w")
            && !args.peek().is_some_and(|next| is_column_count(next));
        options_ended |= arg == "--";
        if bare_wrap {
            expanded.push(OsString::from(format!("--wrap={DEFAULT_WRAP_WIDTH}")));
        } else {
            expanded.push(arg);
        }
    }
    expanded
}

fn is_column_count(arg: &OsStr) -> bool {
    arg.to_str().is_some_and(|text| text.parse::<usize>().is_ok())
}

fn parse_kind(value: &str) -> Result<TargetKind, HubmailError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "issue" => Ok(TargetKind::Single(ThreadKind::Issue)),
        "pull" => Ok(TargetKind::Single(ThreadKind::PullRequest)),
        "issues" => Ok(TargetKind::Collection(ThreadKind::Issue)),
        "pulls" => Ok(TargetKind::Collection(ThreadKind::PullRequest)),
        other => Err(configuration(format!(
            "unknown kind '{other}': expected issue, pull, issues or pulls"
        ))),
    }
}

fn kind_matches(kind: Option<TargetKind>, found: ThreadKind) -> bool {
    match kind {
        None => true,
        Some(TargetKind::Single(expected)) => expected == found,
        Some(TargetKind::Collection(_)) => false,
    }
}

fn configuration(message: impl Into<String>) -> HubmailError {
    HubmailError::Configuration {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests;
