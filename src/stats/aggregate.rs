//! Folding per-repository observations into organisation-wide statistics.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::estimator::CostProjection;

/// Optional creation-time window for pull requests.
///
/// A pull request is in-window iff `created >= since` (when set) and
/// `created <= until` (when set).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive lower bound on creation time.
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time.
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Returns true when the instant falls inside the window.
    #[must_use]
    pub fn contains(&self, created: DateTime<Utc>) -> bool {
        if self.since.is_some_and(|since| created < since) {
            return false;
        }
        if self.until.is_some_and(|until| created > until) {
            return false;
        }
        true
    }

    /// Human-readable description of the window for the report.
    #[must_use]
    pub fn label(&self) -> String {
        if self.since.is_none() && self.until.is_none() {
            return "all time".to_owned();
        }

        let since = self
            .since
            .map_or_else(|| "beginning".to_owned(), |instant| {
                instant.format("%Y-%m-%d").to_string()
            });
        let until = self
            .until
            .map_or_else(|| "now".to_owned(), |instant| {
                instant.format("%Y-%m-%d").to_string()
            });
        format!("{since} to {until}")
    }
}

/// Earliest and latest pull request creation instants observed so far.
///
/// Tightened only by min/max folds; an empty range means no in-window pull
/// request has been observed at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Folds one observation into the range.
    pub fn observe(&mut self, created: DateTime<Utc>) {
        self.first = Some(self.first.map_or(created, |first| first.min(created)));
        self.last = Some(self.last.map_or(created, |last| last.max(created)));
    }

    /// Folds another range into this one.
    pub fn merge(&mut self, other: &Self) {
        if let Some(first) = other.first {
            self.observe(first);
        }
        if let Some(last) = other.last {
            self.observe(last);
        }
    }

    /// Earliest observed instant.
    #[must_use]
    pub const fn first(&self) -> Option<DateTime<Utc>> {
        self.first
    }

    /// Latest observed instant.
    #[must_use]
    pub const fn last(&self) -> Option<DateTime<Utc>> {
        self.last
    }
}

/// Per-repository activity totals, fixed once the repository's walk ends.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoSummary {
    /// Repository name.
    pub name: String,
    /// Pull requests inside the configured window.
    pub total_prs: u64,
    /// Total diff bytes across those pull requests.
    pub total_diff_chars: u64,
    /// Mean diff bytes per pull request; zero when there are none.
    pub avg_diff_chars_per_pr: f64,
}

impl RepoSummary {
    /// Builds a summary from raw counts, deriving the per-PR average.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "the per-PR average is an informational estimate"
    )]
    #[must_use]
    pub fn from_counts(name: &str, total_prs: u64, total_diff_chars: u64) -> Self {
        let avg_diff_chars_per_pr = if total_prs == 0 {
            0.0
        } else {
            total_diff_chars as f64 / total_prs as f64
        };

        Self {
            name: name.to_owned(),
            total_prs,
            total_diff_chars,
            avg_diff_chars_per_pr,
        }
    }
}

/// Organisation-wide totals and the monthly cost projection.
#[derive(Debug, Clone, PartialEq)]
pub struct OrgSummary {
    /// Repositories discovered in the organisation, including any whose
    /// pull request listing failed.
    pub repo_count: usize,
    /// Pull requests inside the window, summed across repositories.
    pub total_prs: u64,
    /// Diff bytes summed across repositories.
    pub total_diff_chars: u64,
    /// Inclusive months between the first and last observed pull request.
    pub months_span: u32,
    /// Mean pull requests per month.
    pub avg_monthly_prs: f64,
    /// Mean diff bytes per month.
    pub avg_monthly_diff_chars: f64,
    /// Estimated tokens per month.
    pub avg_monthly_tokens: u64,
    /// Projected monthly cost under the GPT-4o pricing model, USD.
    pub cost_gpt_4o_usd: f64,
    /// Projected monthly cost under the Claude Sonnet pricing model, USD.
    pub cost_claude_sonnet_usd: f64,
}

/// Running fold of repository summaries into organisation totals.
#[derive(Debug, Clone, Default)]
pub struct OrgFold {
    total_prs: u64,
    total_diff_chars: u64,
    range: TimeRange,
}

impl OrgFold {
    /// Folds one repository's totals and observed time range.
    ///
    /// Repositories with no in-window pull requests carry an empty range
    /// and contribute no time bound.
    pub fn absorb(&mut self, summary: &RepoSummary, observed: &TimeRange) {
        self.total_prs += summary.total_prs;
        self.total_diff_chars += summary.total_diff_chars;
        self.range.merge(observed);
    }

    /// Months spanned by the observed pull requests; zero when none were
    /// observed.
    #[must_use]
    pub fn months_span(&self) -> u32 {
        match (self.range.first(), self.range.last()) {
            (Some(first), Some(last)) => months_span(first.date_naive(), last.date_naive()),
            _ => 0,
        }
    }

    /// Mean diff bytes per month; zero when the span is zero.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "monthly rates are informational estimates"
    )]
    #[must_use]
    pub fn avg_monthly_diff_chars(&self) -> f64 {
        let span = self.months_span();
        if span == 0 {
            return 0.0;
        }
        self.total_diff_chars as f64 / f64::from(span)
    }

    /// Mean pull requests per month; zero when the span is zero.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "monthly rates are informational estimates"
    )]
    #[must_use]
    pub fn avg_monthly_prs(&self) -> f64 {
        let span = self.months_span();
        if span == 0 {
            return 0.0;
        }
        self.total_prs as f64 / f64::from(span)
    }

    /// Observed organisation-wide time range.
    #[must_use]
    pub const fn range(&self) -> &TimeRange {
        &self.range
    }

    /// Builds the final organisation summary.
    #[must_use]
    pub fn finish(&self, repo_count: usize, projection: &CostProjection) -> OrgSummary {
        OrgSummary {
            repo_count,
            total_prs: self.total_prs,
            total_diff_chars: self.total_diff_chars,
            months_span: self.months_span(),
            avg_monthly_prs: self.avg_monthly_prs(),
            avg_monthly_diff_chars: self.avg_monthly_diff_chars(),
            avg_monthly_tokens: projection.avg_monthly_tokens,
            cost_gpt_4o_usd: projection.gpt_4o_usd,
            cost_claude_sonnet_usd: projection.claude_sonnet_usd,
        }
    }
}

/// Inclusive calendar months between two dates.
///
/// `months = (y2 - y1) * 12 + (m2 - m1)`, incremented by one when the last
/// day-of-month precedes the first (the trailing partial month still
/// counts), floored to 1. The formula is deliberately arithmetic rather
/// than calendar-aware; it matches how the monthly averages are consumed.
#[must_use]
pub fn months_span(first: NaiveDate, last: NaiveDate) -> u32 {
    let mut months =
        (last.year() - first.year()) * 12 + (month_number(last) - month_number(first));
    if last.day() < first.day() {
        months += 1;
    }
    u32::try_from(months.max(1)).unwrap_or(1)
}

fn month_number(date: NaiveDate) -> i32 {
    i32::try_from(date.month()).unwrap_or(0)
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
