//! Aggregation of harvested activity and the monthly cost projection.

pub mod aggregate;
pub mod estimator;

pub use aggregate::{OrgFold, OrgSummary, RepoSummary, TimeRange, TimeWindow, months_span};
pub use estimator::{CostProjection, project};
