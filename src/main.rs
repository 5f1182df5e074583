//! Tallyman CLI entrypoint for organisation activity harvesting.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use tallyman::{
    CallExecutor, CancelFlag, HarvestError, HarvestOutcome, OctocrabActivityGateway,
    OrganisationLocator, TallymanConfig, harvest::DEFAULT_SAMPLE_BUDGET, harvest_organisation,
    render_report, write_report,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tallyman=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), HarvestError> {
    let config = load_config()?;

    let organisation = config.require_org()?.to_owned();
    let out = config.require_out()?;
    let token = config.resolve_token()?;
    if token.is_none() {
        tracing::warn!("no token configured, harvesting anonymously under the reduced quota");
    }

    let locator = OrganisationLocator::new(&organisation, config.api_base.as_deref())?;
    let gateway = OctocrabActivityGateway::for_token(token.as_ref(), &locator)?;

    let cancel = CancelFlag::new();
    spawn_cancel_handler(cancel.clone());
    let executor = CallExecutor::new(config.policy(), cancel);

    let window = config.window();
    let outcome =
        harvest_organisation(&gateway, &executor, &window, DEFAULT_SAMPLE_BUDGET).await?;

    let html = render_report(
        &organisation,
        &window.label(),
        &outcome.repositories,
        &outcome.org,
    )?;
    write_report(&out, &html)?;

    write_summary(&organisation, &out.to_string(), &outcome)
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`HarvestError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<TallymanConfig, HarvestError> {
    TallymanConfig::load().map_err(|error| HarvestError::Configuration {
        message: error.to_string(),
    })
}

/// Flags cancellation on the first Ctrl-C so the harvest stops at the next
/// call boundary.
fn spawn_cancel_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to listen for Ctrl-C");
            return;
        }
        tracing::info!("cancellation requested, finishing the current call");
        cancel.cancel();
    });
}

fn write_summary(
    organisation: &str,
    out: &str,
    outcome: &HarvestOutcome,
) -> Result<(), HarvestError> {
    let mut stdout = io::stdout().lock();
    let message = format!(
        "Harvested {organisation}: {} repositories, {} PRs, {} diff chars\n\
         Projected monthly cost: ${:.2} (GPT-4o), ${:.2} (Claude Sonnet)\n\
         Report written to {out}",
        outcome.org.repo_count,
        outcome.org.total_prs,
        outcome.org.total_diff_chars,
        outcome.org.cost_gpt_4o_usd,
        outcome.org.cost_claude_sonnet_usd,
    );

    writeln!(stdout, "{message}").map_err(|error| HarvestError::Report {
        message: error.to_string(),
    })
}
