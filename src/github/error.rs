//! Error types exposed by the GitHub harvesting layer.

use thiserror::Error;

use super::rate_limit::ResponseSnapshot;

/// Errors surfaced while configuring the run or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HarvestError {
    /// No organisation name was supplied.
    #[error("organisation name is required")]
    MissingOrganisation,

    /// No output path was supplied for the report.
    #[error("output path is required")]
    MissingOutputPath,

    /// The API base URL could not be parsed.
    #[error("API base URL is invalid: {0}")]
    InvalidUrl(String),

    /// GitHub answered with a non-success status.
    #[error("GitHub API error: {message}")]
    Api {
        /// Status and quota headers captured from the failing response, when
        /// a response was received at all.
        snapshot: Option<ResponseSnapshot>,
        /// Description of the failure, including the GitHub message when the
        /// body carried one.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A response body could not be read or deserialised.
    #[error("response decode failed: {message}")]
    Decode {
        /// Detail from the decoding failure.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The report could not be rendered or written.
    #[error("report error: {message}")]
    Report {
        /// Details about the rendering or write failure.
        message: String,
    },

    /// The run was cancelled before completion.
    #[error("run cancelled")]
    Cancelled,
}

impl HarvestError {
    /// Returns the captured response snapshot when the error carries one.
    ///
    /// Only [`HarvestError::Api`] errors raised from a received HTTP response
    /// carry a snapshot; everything else returns `None`.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&ResponseSnapshot> {
        match self {
            Self::Api {
                snapshot: Some(snapshot),
                ..
            } => Some(snapshot),
            _ => None,
        }
    }
}
