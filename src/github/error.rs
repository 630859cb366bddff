//! Error types surfaced while configuring, fetching, or rendering threads.

use thiserror::Error;

/// Errors surfaced while parsing input, talking to GitHub, or rendering mail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HubmailError {
    /// No API token was configured.
    #[error("no API token found; have you set the HUBMAIL_TOKEN environment variable?")]
    MissingToken,

    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The issue or pull request number is not a positive integer.
    #[error("thread number must be a positive integer")]
    InvalidThreadNumber,

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub answered with a non-success HTTP status.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response detail describing the failure.
        message: String,
    },

    /// The GraphQL response carried an `errors` member.
    #[error("GraphQL query {operation} failed: {message}")]
    Graphql {
        /// Operation name of the failing query.
        operation: String,
        /// Joined error messages from the response.
        message: String,
    },

    /// A thread, page, or node expected in the response was absent.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode {operation} response: {message}")]
    Decode {
        /// Operation whose response was malformed.
        operation: String,
        /// Decoder error detail.
        message: String,
    },

    /// A pull request patch document did not have the expected layout.
    #[error("malformed patch document: {message}")]
    MalformedPatch {
        /// Description of the layout problem.
        message: String,
    },

    /// Invalid pagination parameters.
    #[error("invalid pagination: {message}")]
    InvalidPagination {
        /// Description of the invalid parameter.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}
