//! Error mapping helpers for the Octocrab activity gateway.

use crate::github::error::HarvestError;

/// Checks if an octocrab error represents a network/transport issue.
pub(super) const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

/// Maps a transport-level octocrab failure into a [`HarvestError`].
///
/// Raw requests surface non-success statuses as responses rather than
/// errors, so anything arriving here never carried quota headers.
pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> HarvestError {
    if is_network_error(error) {
        return HarvestError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    HarvestError::Api {
        snapshot: None,
        message: format!("{operation} failed: {error}"),
    }
}

/// Pulls the `message` field out of a GitHub error body when present.
pub(super) fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::extract_github_message;

    #[test]
    fn github_message_is_extracted_from_error_bodies() {
        let body = r#"{"message": "API rate limit exceeded", "documentation_url": "..."}"#;
        assert_eq!(
            extract_github_message(body),
            Some("API rate limit exceeded".to_owned())
        );
    }

    #[test]
    fn non_json_bodies_yield_no_message() {
        assert_eq!(extract_github_message("<html>teapot</html>"), None);
    }
}
