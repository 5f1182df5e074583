//! Domain models for harvested repository and pull request data.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into the public domain types, keeping GitHub's wire shapes out of
//! the rest of the crate.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A repository discovered while listing the organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// Repository name without the owner prefix.
    pub name: String,
}

/// The pull request fields the harvester consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestRecord {
    /// Pull request number.
    pub number: u64,
    /// Creation timestamp; absent records are excluded from the window.
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRepository {
    pub(super) name: String,
}

impl From<ApiRepository> for RepositoryRecord {
    fn from(api: ApiRepository) -> Self {
        Self { name: api.name }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) number: u64,
    #[serde(default)]
    pub(super) created_at: Option<DateTime<Utc>>,
}

impl From<ApiPullRequest> for PullRequestRecord {
    fn from(api: ApiPullRequest) -> Self {
        Self {
            number: api.number,
            created_at: api.created_at,
        }
    }
}
