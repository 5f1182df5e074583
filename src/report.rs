//! Single-file HTML report rendering.
//!
//! The report is rendered from a built-in Jinja2-compatible template using
//! the `minijinja` engine: an organisation summary grid followed by a
//! per-repository table. Numbers are formatted into strings before they
//! reach the template so the template stays free of formatting logic.

use std::fs;

use camino::Utf8Path;
use chrono::Utc;
use minijinja::{Environment, context};
use serde::Serialize;

use crate::github::error::HarvestError;
use crate::stats::{OrgSummary, RepoSummary};

const REPORT_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{{ org_name }} - PR Activity &amp; AI Review Cost Report</title>
  <style>
    body { font-family: -apple-system, BlinkMacSystemFont, Segoe UI, Roboto, Helvetica, Arial, sans-serif; margin: 2rem; color: #222; }
    h1 { font-size: 1.8rem; margin-bottom: 0.2rem; }
    .sub { color: #555; margin-bottom: 1.2rem; }
    .card { border: 1px solid #eee; border-radius: 8px; padding: 1rem; margin: 1rem 0; }
    .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 0.8rem; }
    .metric { background: #fafafa; border: 1px solid #eee; border-radius: 8px; padding: 0.8rem; }
    .metric .label { color: #666; font-size: 0.9rem; }
    .metric .value { font-weight: 600; font-size: 1.1rem; }
    table { width: 100%; border-collapse: collapse; font-size: 0.95rem; }
    th, td { text-align: left; padding: 8px; border-bottom: 1px solid #eee; }
    th { background: #f6f6f6; }
    .mono { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, "Liberation Mono", monospace; }
  </style>
</head>
<body>
  <h1>{{ org_name }} - PR Activity &amp; AI Review Cost Report</h1>
  <div class="sub">Window: {{ window }} &middot; Generated: {{ generated_at }}</div>

  <div class="card">
    <h2>Organisation Summary</h2>
    <div class="grid">
      <div class="metric"><div class="label">Repositories</div><div class="value">{{ org.repo_count }}</div></div>
      <div class="metric"><div class="label">Total PRs</div><div class="value">{{ org.total_prs }}</div></div>
      <div class="metric"><div class="label">Total diff (chars)</div><div class="value mono">{{ org.total_diff_chars }}</div></div>
      <div class="metric"><div class="label">Months spanned (first PR to last PR)</div><div class="value">{{ org.months_span }}</div></div>
      <div class="metric"><div class="label">Average monthly PRs</div><div class="value">{{ org.avg_monthly_prs }}</div></div>
      <div class="metric"><div class="label">Average monthly diff (chars)</div><div class="value mono">{{ org.avg_monthly_diff_chars }}</div></div>
      <div class="metric"><div class="label">Average monthly diff (tokens)</div><div class="value mono">{{ org.avg_monthly_tokens }}</div></div>
      <div class="metric"><div class="label">Projected monthly cost (GPT-4o)</div><div class="value">${{ org.cost_gpt_4o_usd }}</div></div>
      <div class="metric"><div class="label">Projected monthly cost (Claude Sonnet)</div><div class="value">${{ org.cost_claude_sonnet_usd }}</div></div>
    </div>
  </div>

  <div class="card">
    <h2>Per-Repository Stats</h2>
    <table>
      <thead>
        <tr>
          <th>Repository</th>
          <th>Total PRs</th>
          <th>Total diff (chars)</th>
          <th>Average diff per PR (chars)</th>
        </tr>
      </thead>
      <tbody>
        {% for repo in repos %}
        <tr>
          <td class="mono">{{ repo.name }}</td>
          <td>{{ repo.total_prs }}</td>
          <td class="mono">{{ repo.total_diff_chars }}</td>
          <td class="mono">{{ repo.avg_diff_chars_per_pr }}</td>
        </tr>
        {% endfor %}
      </tbody>
    </table>
  </div>

  <div class="sub">Figures are estimates derived from the GitHub API and tiktoken-based token counts.</div>
</body>
</html>
"#;

/// Organisation metrics with display formatting already applied.
#[derive(Debug, Clone, Serialize)]
struct OrgContext {
    repo_count: usize,
    total_prs: u64,
    total_diff_chars: u64,
    months_span: u32,
    avg_monthly_prs: String,
    avg_monthly_diff_chars: String,
    avg_monthly_tokens: u64,
    cost_gpt_4o_usd: String,
    cost_claude_sonnet_usd: String,
}

impl From<&OrgSummary> for OrgContext {
    fn from(org: &OrgSummary) -> Self {
        Self {
            repo_count: org.repo_count,
            total_prs: org.total_prs,
            total_diff_chars: org.total_diff_chars,
            months_span: org.months_span,
            avg_monthly_prs: format!("{:.2}", org.avg_monthly_prs),
            avg_monthly_diff_chars: format!("{:.0}", org.avg_monthly_diff_chars),
            avg_monthly_tokens: org.avg_monthly_tokens,
            cost_gpt_4o_usd: format!("{:.2}", org.cost_gpt_4o_usd),
            cost_claude_sonnet_usd: format!("{:.2}", org.cost_claude_sonnet_usd),
        }
    }
}

/// One per-repository table row, pre-formatted.
#[derive(Debug, Clone, Serialize)]
struct RepoRow {
    name: String,
    total_prs: u64,
    total_diff_chars: u64,
    avg_diff_chars_per_pr: String,
}

impl From<&RepoSummary> for RepoRow {
    fn from(repo: &RepoSummary) -> Self {
        Self {
            name: repo.name.clone(),
            total_prs: repo.total_prs,
            total_diff_chars: repo.total_diff_chars,
            avg_diff_chars_per_pr: format!("{:.0}", repo.avg_diff_chars_per_pr),
        }
    }
}

/// Renders the HTML report for one harvested organisation.
///
/// # Errors
///
/// Returns [`HarvestError::Report`] when the built-in template fails to
/// parse or render.
pub fn render_report(
    organisation: &str,
    window_label: &str,
    repositories: &[RepoSummary],
    org: &OrgSummary,
) -> Result<String, HarvestError> {
    let mut env = Environment::new();
    // The .html template name selects minijinja's HTML auto-escaping.
    env.add_template("report.html", REPORT_TEMPLATE)
        .map_err(|error| HarvestError::Report {
            message: format!("invalid report template: {error}"),
        })?;

    let rows: Vec<RepoRow> = repositories.iter().map(RepoRow::from).collect();
    let ctx = context! {
        org_name => organisation,
        window => window_label,
        generated_at => Utc::now().to_rfc3339(),
        org => OrgContext::from(org),
        repos => rows,
    };

    let template = env
        .get_template("report.html")
        .map_err(|error| HarvestError::Report {
            message: format!("failed to retrieve report template: {error}"),
        })?;
    template.render(ctx).map_err(|error| HarvestError::Report {
        message: format!("report rendering failed: {error}"),
    })
}

/// Writes the rendered report to `path`, creating missing parent
/// directories.
///
/// # Errors
///
/// Returns [`HarvestError::Report`] when a directory or the file cannot be
/// written.
pub fn write_report(path: &Utf8Path, html: &str) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| HarvestError::Report {
            message: format!("failed to create report directory {parent}: {error}"),
        })?;
    }
    fs::write(path, html).map_err(|error| HarvestError::Report {
        message: format!("failed to write report to {path}: {error}"),
    })
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
