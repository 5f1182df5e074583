//! Identity wrappers and request paths for organisation harvesting.

use url::Url;

use super::error::HarvestError;

/// Items requested per page; GitHub's maximum.
const PAGE_SIZE: u8 = 100;

/// Organisation name wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationName(String);

impl OrganisationName {
    /// Validates that the organisation name is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MissingOrganisation`] when the supplied value
    /// is blank.
    pub fn new(value: &str) -> Result<Self, HarvestError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(HarvestError::MissingOrganisation);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the organisation name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Personal access token wrapper enforcing presence.
///
/// Harvesting works anonymously, so the token is optional throughout; this
/// wrapper only guards against configuring a blank value by mistake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Configuration`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, HarvestError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(HarvestError::Configuration {
                message: "personal access token must not be blank".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Organisation identity and the API base it is served from.
///
/// The default base is the public GitHub API; an explicit base supports
/// GitHub Enterprise hosts and HTTP test fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationLocator {
    api_base: Url,
    organisation: OrganisationName,
}

impl OrganisationLocator {
    /// Public GitHub REST API base.
    pub const DEFAULT_API_BASE: &'static str = "https://api.github.com";

    /// Creates a locator for the given organisation.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MissingOrganisation`] for a blank organisation
    /// name and [`HarvestError::InvalidUrl`] when the API base cannot be
    /// parsed.
    pub fn new(organisation: &str, api_base: Option<&str>) -> Result<Self, HarvestError> {
        let organisation = OrganisationName::new(organisation)?;
        let api_base = Url::parse(api_base.unwrap_or(Self::DEFAULT_API_BASE))
            .map_err(|error| HarvestError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            api_base,
            organisation,
        })
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Returns the organisation name.
    #[must_use]
    pub const fn organisation(&self) -> &str {
        self.organisation.as_str()
    }

    /// Request path listing one page of the organisation's repositories,
    /// all visibilities included.
    #[must_use]
    pub fn repositories_path(&self, page: u32) -> String {
        format!(
            "/orgs/{org}/repos?type=all&per_page={PAGE_SIZE}&page={page}",
            org = self.organisation.as_str()
        )
    }

    /// Request path listing one page of a repository's pull requests, all
    /// states, ordered by creation time ascending.
    #[must_use]
    pub fn pull_requests_path(&self, repository: &str, page: u32) -> String {
        format!(
            "/repos/{org}/{repository}/pulls?state=all&sort=created&direction=asc&per_page={PAGE_SIZE}&page={page}",
            org = self.organisation.as_str()
        )
    }

    /// Request path for a single pull request; with a diff `Accept` media
    /// type this returns the raw textual diff.
    #[must_use]
    pub fn pull_request_path(&self, repository: &str, number: u64) -> String {
        format!(
            "/repos/{org}/{repository}/pulls/{number}",
            org = self.organisation.as_str()
        )
    }
}
