//! GitHub access layer for organisation activity harvesting.
//!
//! This module wraps Octocrab to enumerate an organisation's repositories
//! and pull requests and to fetch raw diffs, while exposing the response
//! metadata (status, quota headers, pagination links) that the harvesting
//! executor needs for rate-limit recovery. Errors are mapped into
//! [`HarvestError`] variants so callers never touch Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;
pub mod rate_limit;

pub use error::HarvestError;
pub use gateway::{ActivityGateway, FetchedPage, OctocrabActivityGateway};
pub use locator::{OrganisationLocator, OrganisationName, PersonalAccessToken};
pub use models::{PullRequestRecord, RepositoryRecord};
pub use rate_limit::ResponseSnapshot;

#[cfg(test)]
pub use gateway::MockActivityGateway;
