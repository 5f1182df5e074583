//! Tallyman library crate: harvesting a GitHub organisation's pull request
//! activity and projecting the monthly cost of AI code review.
//!
//! The library wraps Octocrab to walk an organisation's repositories and
//! pull requests under GitHub's rate limits, measures diff volume, and
//! folds the observations into per-repository and organisation-wide
//! statistics with a token-based cost projection.

pub mod config;
pub mod github;
pub mod harvest;
pub mod report;
pub mod stats;

pub use config::TallymanConfig;
pub use github::{
    HarvestError, OctocrabActivityGateway, OrganisationLocator, OrganisationName,
    PersonalAccessToken,
};
pub use harvest::{CallExecutor, CallPolicy, CancelFlag, HarvestOutcome, harvest_organisation};
pub use report::{render_report, write_report};
pub use stats::{OrgSummary, RepoSummary, TimeWindow};
