//! Octocrab implementation of the activity gateway.
//!
//! Every call goes through `_get_with_headers` so that the status code and
//! quota headers of failing responses survive into [`HarvestError::Api`]
//! snapshots for the executor to inspect.

use async_trait::async_trait;
use http::header::{ACCEPT, LINK};
use http::{HeaderMap, HeaderValue, Uri};
use octocrab::Octocrab;

use crate::github::error::HarvestError;
use crate::github::locator::{OrganisationLocator, PersonalAccessToken};
use crate::github::models::{ApiPullRequest, ApiRepository, PullRequestRecord, RepositoryRecord};
use crate::github::pagination;
use crate::github::rate_limit::ResponseSnapshot;

use super::client::build_octocrab_client;
use super::error_mapping::{extract_github_message, map_octocrab_error};
use super::{ActivityGateway, FetchedPage};

/// Media type asking the pulls endpoint for the raw textual diff.
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";

/// Octocrab-backed activity gateway.
pub struct OctocrabActivityGateway {
    client: Octocrab,
    locator: OrganisationLocator,
}

impl OctocrabActivityGateway {
    /// Creates a gateway from an existing Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab, locator: OrganisationLocator) -> Self {
        Self { client, locator }
    }

    /// Builds a gateway for the organisation, authenticated when a token is
    /// supplied.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::InvalidUrl` when the API base cannot be parsed
    /// or `HarvestError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: Option<&PersonalAccessToken>,
        locator: &OrganisationLocator,
    ) -> Result<Self, HarvestError> {
        let octocrab = build_octocrab_client(token, locator.api_base().as_str())?;
        Ok(Self::new(octocrab, locator.clone()))
    }

    /// Issues a raw GET and captures body, next-page hint, and on failure a
    /// quota snapshot.
    async fn fetch_raw(
        &self,
        operation: &str,
        path: &str,
        accept: Option<HeaderValue>,
    ) -> Result<RawPage, HarvestError> {
        let uri: Uri = path
            .parse::<Uri>()
            .map_err(|error| HarvestError::InvalidUrl(error.to_string()))?;

        let headers = accept.map(|value| {
            let mut map = HeaderMap::new();
            map.insert(ACCEPT, value);
            map
        });

        let response = self
            .client
            ._get_with_headers(uri, headers)
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;

        let status = response.status();
        if !status.is_success() {
            let snapshot = ResponseSnapshot::from_parts(status, response.headers());
            let body = self
                .client
                .body_to_string(response)
                .await
                .unwrap_or_else(|_| String::new());
            let message = extract_github_message(&body).map_or_else(
                || format!("{operation} failed with status {status}"),
                |detail| format!("{operation} failed with status {status}: {detail}"),
            );

            return Err(HarvestError::Api {
                snapshot: Some(snapshot),
                message,
            });
        }

        let next_page =
            pagination::next_page(response.headers().get(LINK).and_then(|raw| raw.to_str().ok()));
        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(|error| HarvestError::Decode {
                message: format!("{operation} response decode failed: {error}"),
            })?;

        Ok(RawPage { body, next_page })
    }
}

struct RawPage {
    body: String,
    next_page: Option<u32>,
}

#[async_trait]
impl ActivityGateway for OctocrabActivityGateway {
    async fn repository_page(
        &self,
        page: u32,
    ) -> Result<FetchedPage<RepositoryRecord>, HarvestError> {
        let raw = self
            .fetch_raw(
                "list repositories",
                &self.locator.repositories_path(page),
                None,
            )
            .await?;

        let repositories: Vec<ApiRepository> =
            serde_json::from_str(&raw.body).map_err(|error| HarvestError::Decode {
                message: format!("repository listing deserialisation failed: {error}"),
            })?;

        Ok(FetchedPage {
            items: repositories.into_iter().map(Into::into).collect(),
            next_page: raw.next_page,
        })
    }

    async fn pull_request_page(
        &self,
        repository: &str,
        page: u32,
    ) -> Result<FetchedPage<PullRequestRecord>, HarvestError> {
        let raw = self
            .fetch_raw(
                "list pull requests",
                &self.locator.pull_requests_path(repository, page),
                None,
            )
            .await?;

        let pull_requests: Vec<ApiPullRequest> =
            serde_json::from_str(&raw.body).map_err(|error| HarvestError::Decode {
                message: format!("pull request listing deserialisation failed: {error}"),
            })?;

        Ok(FetchedPage {
            items: pull_requests.into_iter().map(Into::into).collect(),
            next_page: raw.next_page,
        })
    }

    async fn pull_request_diff(
        &self,
        repository: &str,
        number: u64,
    ) -> Result<String, HarvestError> {
        let raw = self
            .fetch_raw(
                "pull request diff",
                &self.locator.pull_request_path(repository, number),
                Some(HeaderValue::from_static(DIFF_MEDIA_TYPE)),
            )
            .await?;

        Ok(raw.body)
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
