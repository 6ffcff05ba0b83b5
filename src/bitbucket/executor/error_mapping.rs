//! Error mapping helpers for the HTTP executor.

use http::StatusCode;
use serde_json::Value;

use crate::bitbucket::error::PullRequestError;

const MAX_BODY_CHARS: usize = 160;

/// Checks if a status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Pulls the human-readable message out of either error envelope.
///
/// Cloud answers with `{"error": {"message": ..}}`, Server with
/// `{"errors": [{"message": ..}]}`.
pub(super) fn extract_bitbucket_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return None;
    };

    let cloud = value.pointer("/error/message");
    let server = value.pointer("/errors/0/message");
    let bare = value.get("message");

    cloud
        .or(server)
        .or(bare)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

pub(super) fn map_http_error(operation: &str, status: StatusCode, body: &str) -> PullRequestError {
    let message = extract_bitbucket_message(body)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| truncate_for_message(trimmed, MAX_BODY_CHARS))
        })
        .unwrap_or_else(|| "unknown error".to_owned());

    if is_auth_failure(status) {
        PullRequestError::Authentication {
            message: format!("{operation} failed: Bitbucket returned {status} {message}"),
        }
    } else {
        PullRequestError::Api {
            status: status.as_u16(),
            message: format!("{operation} failed: {message}"),
        }
    }
}

pub(super) fn map_transport_error(operation: &str, error: &reqwest::Error) -> PullRequestError {
    if error.is_decode() {
        return PullRequestError::Decode {
            message: format!("{operation} failed: {error}"),
        };
    }

    PullRequestError::Network {
        message: format!("{operation} failed: {error}"),
    }
}

pub(super) fn map_decode_error(operation: &str, error: &serde_json::Error) -> PullRequestError {
    PullRequestError::Decode {
        message: format!("{operation} returned invalid JSON: {error}"),
    }
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output: String = message.chars().take(max_chars).collect();
    if message.chars().nth(max_chars).is_some() {
        output.push_str("...");
    }
    output
}
