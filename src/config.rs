//! Application configuration loaded from CLI, environment, and files.
//!
//! A single struct merges values from command-line arguments, environment
//! variables, and configuration files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.tallyman.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `TALLYMAN_ORG`, `TALLYMAN_TOKEN`, or legacy
//!    `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--org`/`-o`, `--out`, `--token`/`-t`, ...
//!
//! # Configuration File
//!
//! Place `.tallyman.toml` in the current directory, home directory, or XDG
//! config directory with:
//!
//! ```toml
//! org = "octo-org"
//! out = "reports/octo-org.html"
//! token = "ghp_example"
//! since = "2024-01-01"
//! max_wait_reset = "10m"
//! ```

use std::{env, time::Duration};

use camino::Utf8PathBuf;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::error::HarvestError;
use crate::github::locator::PersonalAccessToken;
use crate::harvest::policy::CallPolicy;
use crate::stats::TimeWindow;

const DEFAULT_MAX_WAIT_RESET: Duration = Duration::from_secs(3600);
const DEFAULT_SLEEP_MIN_MS: u64 = 200;
const DEFAULT_SLEEP_MAX_MS: u64 = 800;
const DEFAULT_RETRIES_NONRATE: u32 = 10;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `TALLYMAN_ORG` or `--org`: Organisation to harvest
/// - `TALLYMAN_OUT` or `--out`: HTML report output path
/// - `TALLYMAN_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `TALLYMAN_API_BASE` or `--api-base`: GitHub API base URL
/// - `TALLYMAN_SINCE` / `TALLYMAN_UNTIL`: Creation-time window bounds
/// - `TALLYMAN_MAX_WAIT_RESET` or `--max-wait-reset`: Quota-reset wait cap
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use tallyman::TallymanConfig;
///
/// let config = TallymanConfig::load().expect("failed to load configuration");
/// let organisation = config.require_org().expect("organisation required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "TALLYMAN",
    discovery(
        dotfile_name = ".tallyman.toml",
        config_file_name = "tallyman.toml",
        app_name = "tallyman"
    )
)]
pub struct TallymanConfig {
    /// GitHub organisation whose pull request activity is harvested.
    ///
    /// Can be provided via:
    /// - CLI: `--org <ORG>` or `-o <ORG>`
    /// - Environment: `TALLYMAN_ORG`
    /// - Config file: `org = "..."`
    #[ortho_config(cli_short = 'o')]
    pub org: Option<String>,

    /// Filesystem path the HTML report is written to.
    ///
    /// Missing parent directories are created on write.
    ///
    /// Can be provided via:
    /// - CLI: `--out <PATH>`
    /// - Environment: `TALLYMAN_OUT`
    /// - Config file: `out = "..."`
    #[ortho_config()]
    pub out: Option<String>,

    /// Personal access token for GitHub API authentication.
    ///
    /// Optional; without one the harvest runs anonymously against the much
    /// smaller unauthenticated quota.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `TALLYMAN_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Base URL of the GitHub API, for GitHub Enterprise installations.
    ///
    /// Defaults to `https://api.github.com`.
    #[ortho_config()]
    pub api_base: Option<String>,

    /// Inclusive lower bound on pull request creation time, `YYYY-MM-DD`.
    #[ortho_config()]
    pub since: Option<String>,

    /// Inclusive upper bound on pull request creation time, `YYYY-MM-DD`.
    #[ortho_config()]
    pub until: Option<String>,

    /// Waits through full quota resets so the walk eventually completes,
    /// instead of capping each wait.
    ///
    /// Note: Environment variable `TALLYMAN_EVENTUAL_COMPLETE` is not
    /// supported because `ortho_config` does not load boolean values from
    /// the environment.
    #[ortho_config()]
    pub eventual_complete: bool,

    /// Cap on a single quota-reset wait, in humantime notation ("90s",
    /// "10m"). An empty string removes the cap. Defaults to one hour.
    #[ortho_config()]
    pub max_wait_reset: Option<String>,

    /// Lower bound of the inter-call jitter window, in milliseconds.
    #[ortho_config()]
    pub sleep_min_ms: u64,

    /// Upper bound of the inter-call jitter window, in milliseconds; zero
    /// disables inter-call pacing.
    #[ortho_config()]
    pub sleep_max_ms: u64,

    /// Attempts granted to non-quota transient failures on per-item calls.
    #[ortho_config()]
    pub retries_nonrate: u32,
}

impl Default for TallymanConfig {
    fn default() -> Self {
        Self {
            org: None,
            out: None,
            token: None,
            api_base: None,
            since: None,
            until: None,
            eventual_complete: false,
            max_wait_reset: None,
            sleep_min_ms: DEFAULT_SLEEP_MIN_MS,
            sleep_max_ms: DEFAULT_SLEEP_MAX_MS,
            retries_nonrate: DEFAULT_RETRIES_NONRATE,
        }
    }
}

impl TallymanConfig {
    /// Returns the organisation name or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MissingOrganisation`] when no organisation is
    /// configured.
    pub fn require_org(&self) -> Result<&str, HarvestError> {
        self.org
            .as_deref()
            .filter(|org| !org.trim().is_empty())
            .ok_or(HarvestError::MissingOrganisation)
    }

    /// Returns the report output path or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MissingOutputPath`] when no path is
    /// configured.
    pub fn require_out(&self) -> Result<Utf8PathBuf, HarvestError> {
        self.out
            .as_deref()
            .filter(|out| !out.trim().is_empty())
            .map(Utf8PathBuf::from)
            .ok_or(HarvestError::MissingOutputPath)
    }

    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// Returns `None` when no source provides a token; the harvest then
    /// runs anonymously.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Configuration`] when a token is provided but
    /// blank.
    pub fn resolve_token(&self) -> Result<Option<PersonalAccessToken>, HarvestError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .map(PersonalAccessToken::new)
            .transpose()
    }

    /// Builds the pull request creation-time window from `since` and
    /// `until`.
    ///
    /// An unparseable bound is logged and dropped rather than failing the
    /// run. `since` starts at midnight; `until` covers its whole day.
    #[must_use]
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            since: parse_bound(self.since.as_deref(), "since", NaiveTime::MIN),
            until: parse_bound(
                self.until.as_deref(),
                "until",
                NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
            ),
        }
    }

    /// Builds the executor's call policy from the pacing and retry fields.
    ///
    /// An unparseable `max_wait_reset` is logged and replaced by the
    /// one-hour default.
    #[must_use]
    pub fn policy(&self) -> CallPolicy {
        let max_wait_reset = match self.max_wait_reset.as_deref().map(str::trim) {
            None => DEFAULT_MAX_WAIT_RESET,
            Some("") => Duration::ZERO,
            Some(text) => humantime::parse_duration(text).unwrap_or_else(|error| {
                tracing::warn!(
                    value = text,
                    %error,
                    "unparseable max_wait_reset, using the one-hour default"
                );
                DEFAULT_MAX_WAIT_RESET
            }),
        };

        CallPolicy {
            eventual_complete: self.eventual_complete,
            max_wait_reset,
            sleep_min: Duration::from_millis(self.sleep_min_ms),
            sleep_max: Duration::from_millis(self.sleep_max_ms),
            retries_nonrate: self.retries_nonrate,
        }
    }
}

fn parse_bound(value: Option<&str>, field: &str, time: NaiveTime) -> Option<DateTime<Utc>> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Some(date.and_time(time).and_utc()),
        Err(error) => {
            tracing::warn!(field, value = text, %error, "unparseable date, ignoring the bound");
            None
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
