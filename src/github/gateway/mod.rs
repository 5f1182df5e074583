//! Gateways for harvesting organisation activity through Octocrab.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests. Calls are issued as raw
//! requests so that the response status and quota headers stay visible to
//! the executor's rate-limit handling.

mod activity;
mod client;
mod error_mapping;

pub use activity::OctocrabActivityGateway;

use async_trait::async_trait;

use crate::github::error::HarvestError;
use crate::github::models::{PullRequestRecord, RepositoryRecord};

/// One page of a paginated collection together with the next page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage<T> {
    /// Items of the current page, in API order.
    pub items: Vec<T>,
    /// Next page to request, or `None` when the collection is exhausted.
    pub next_page: Option<u32>,
}

/// Gateway over the organisation activity the harvester consumes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityGateway: Send + Sync {
    /// Fetch one page of the organisation's repositories.
    async fn repository_page(
        &self,
        page: u32,
    ) -> Result<FetchedPage<RepositoryRecord>, HarvestError>;

    /// Fetch one page of a repository's pull requests, creation order
    /// ascending.
    async fn pull_request_page(
        &self,
        repository: &str,
        page: u32,
    ) -> Result<FetchedPage<PullRequestRecord>, HarvestError>;

    /// Fetch the raw textual diff of a pull request.
    async fn pull_request_diff(
        &self,
        repository: &str,
        number: u64,
    ) -> Result<String, HarvestError>;
}
