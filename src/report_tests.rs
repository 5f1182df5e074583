use camino::Utf8PathBuf;
use tempfile::tempdir;

use super::{render_report, write_report};
use crate::stats::{OrgSummary, RepoSummary};

fn org_summary() -> OrgSummary {
    OrgSummary {
        repo_count: 2,
        total_prs: 3,
        total_diff_chars: 600,
        months_span: 2,
        avg_monthly_prs: 1.5,
        avg_monthly_diff_chars: 300.0,
        avg_monthly_tokens: 75,
        cost_gpt_4o_usd: 0.000_375,
        cost_claude_sonnet_usd: 0.000_225,
    }
}

fn repositories() -> Vec<RepoSummary> {
    vec![
        RepoSummary::from_counts("alpha", 3, 600),
        RepoSummary::from_counts("beta", 0, 0),
    ]
}

#[test]
fn report_contains_summary_metrics_and_repository_rows() {
    let html = render_report("octo-org", "all time", &repositories(), &org_summary())
        .expect("rendering should succeed");

    assert!(html.contains("octo-org - PR Activity"));
    assert!(html.contains("Window: all time"));
    assert!(html.contains("<div class=\"value\">3</div>"));
    assert!(html.contains("1.50"));
    assert!(html.contains(">alpha<"));
    assert!(html.contains(">beta<"));
    assert!(html.contains(">200<"));
}

#[test]
fn repository_names_are_escaped() {
    let repositories = vec![RepoSummary::from_counts("a<b>&c", 1, 10)];
    let html = render_report("octo-org", "all time", &repositories, &org_summary())
        .expect("rendering should succeed");

    assert!(html.contains("a&lt;b&gt;&amp;c"));
    assert!(!html.contains("a<b>&c"));
}

#[test]
fn write_creates_missing_parent_directories() {
    let dir = tempdir().expect("temporary directory should be created");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("temporary path should be UTF-8");
    let path = root.join("nested/reports/out.html");

    write_report(&path, "<html></html>").expect("write should succeed");

    let written = std::fs::read_to_string(path).expect("report file should exist");
    assert_eq!(written, "<html></html>");
}
