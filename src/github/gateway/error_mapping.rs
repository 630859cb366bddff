//! Error mapping helpers for the GitHub HTTP client.

use http::StatusCode;

use crate::github::error::HubmailError;

/// Checks if a GitHub error status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks if a reqwest error represents a network/transport issue.
fn is_network_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

pub(super) fn map_transport_error(operation: &str, error: &reqwest::Error) -> HubmailError {
    if let Some(status) = error.status() {
        return map_http_error(operation, status, None);
    }

    if is_network_error(error) {
        return HubmailError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    HubmailError::Api {
        message: format!("{operation} failed: {error}"),
    }
}

pub(super) fn map_http_error(
    operation: &str,
    status: StatusCode,
    maybe_message: Option<String>,
) -> HubmailError {
    let message = maybe_message.unwrap_or_else(|| "unknown error".to_owned());
    if is_auth_failure(status) {
        HubmailError::Authentication {
            message: format!("{operation} failed: GitHub returned {status} {message}"),
        }
    } else {
        HubmailError::Api {
            message: format!("{operation} failed with status {status}: {message}"),
        }
    }
}

/// Pulls the `message` field out of a GitHub JSON error body.
pub(super) fn extract_github_message(body: &[u8]) -> Option<String> {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}
