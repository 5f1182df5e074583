//! Octocrab client construction for the activity gateway.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::HarvestError;
use crate::github::locator::PersonalAccessToken;

use super::error_mapping::map_octocrab_error;

/// Builds an Octocrab client for the given API base, authenticated when a
/// token is supplied and anonymous otherwise.
///
/// # Errors
///
/// Returns `HarvestError::InvalidUrl` when the base URI cannot be parsed or
/// `HarvestError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: Option<&PersonalAccessToken>,
    api_base: &str,
) -> Result<Octocrab, HarvestError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| HarvestError::InvalidUrl(error.to_string()))?;

    let builder = Octocrab::builder();
    let builder = match token {
        Some(token) => builder.personal_token(token.as_ref()),
        None => builder,
    };

    builder
        .base_uri(base_uri)
        .map_err(|error| HarvestError::Api {
            snapshot: None,
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}
