//! Orchestration of a full organisation harvest.
//!
//! Repositories are processed strictly one at a time, and within a
//! repository pull requests strictly one at a time in creation order; the
//! quota is a single globally ordered resource and sequential execution
//! keeps its accounting trivial. The shared diff sample is threaded through
//! the walk and read once by the estimator at the end.

use crate::github::error::HarvestError;
use crate::github::gateway::ActivityGateway;
use crate::stats::{OrgFold, OrgSummary, RepoSummary, TimeRange, TimeWindow, estimator};

use super::executor::CallExecutor;
use super::sampler::DiffSample;
use super::walker::collect_all_pages;

/// Result of a completed harvest.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestOutcome {
    /// Per-repository summaries, in discovery order, excluding repositories
    /// whose pull request listing failed.
    pub repositories: Vec<RepoSummary>,
    /// Organisation-wide totals and the cost projection.
    pub org: OrgSummary,
}

/// Harvests every repository of the organisation and folds the results.
///
/// A pull request listing failure for a single repository is logged and
/// excludes that repository from aggregation; the run continues. Failure to
/// list the repositories themselves aborts the harvest.
///
/// # Errors
///
/// Returns the listing error when the organisation's repositories cannot be
/// enumerated, or [`HarvestError::Cancelled`] when the run is cancelled.
pub async fn harvest_organisation<G: ActivityGateway>(
    gateway: &G,
    executor: &CallExecutor,
    window: &TimeWindow,
    sample_budget: u64,
) -> Result<HarvestOutcome, HarvestError> {
    let discovered = collect_all_pages(executor, |page| gateway.repository_page(page)).await?;
    tracing::info!(count = discovered.len(), "discovered repositories");

    let mut sample = DiffSample::new(sample_budget);
    let mut fold = OrgFold::default();
    let mut repositories = Vec::new();

    for repository in &discovered {
        match harvest_repository(gateway, executor, window, &mut sample, &repository.name).await {
            Ok((summary, observed)) => {
                tracing::info!(
                    repository = %summary.name,
                    total_prs = summary.total_prs,
                    total_diff_chars = summary.total_diff_chars,
                    "repository harvested"
                );
                fold.absorb(&summary, &observed);
                repositories.push(summary);
            }
            Err(HarvestError::Cancelled) => return Err(HarvestError::Cancelled),
            Err(error) => {
                tracing::warn!(
                    repository = %repository.name,
                    %error,
                    "skipping repository: pull request listing failed"
                );
            }
        }
    }

    let projection = estimator::project(&sample, fold.avg_monthly_diff_chars());
    let org = fold.finish(discovered.len(), &projection);

    Ok(HarvestOutcome { repositories, org })
}

/// Walks one repository's pull requests and measures its diff volume.
async fn harvest_repository<G: ActivityGateway>(
    gateway: &G,
    executor: &CallExecutor,
    window: &TimeWindow,
    sample: &mut DiffSample,
    repository: &str,
) -> Result<(RepoSummary, TimeRange), HarvestError> {
    let pull_requests =
        collect_all_pages(executor, |page| gateway.pull_request_page(repository, page)).await?;

    let mut total_prs = 0_u64;
    let mut total_diff_chars = 0_u64;
    let mut observed = TimeRange::default();

    for pull_request in &pull_requests {
        let Some(created) = pull_request.created_at else {
            continue;
        };
        if !window.contains(created) {
            continue;
        }

        total_prs += 1;
        observed.observe(created);

        // A missing diff contributes zero bytes; the PR still counts.
        if let Some(diff) = executor
            .run_item(|| gateway.pull_request_diff(repository, pull_request.number))
            .await
        {
            total_diff_chars += u64::try_from(diff.len()).unwrap_or(u64::MAX);
            sample.absorb(&diff);
        }
        executor.pace().await;
    }

    Ok((
        RepoSummary::from_counts(repository, total_prs, total_diff_chars),
        observed,
    ))
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
