//! Quota metadata captured from GitHub API responses.
//!
//! GitHub signals rate limiting through the response status and the
//! `Retry-After`, `X-RateLimit-Remaining`, and `X-RateLimit-Reset` headers.
//! [`ResponseSnapshot`] captures those values at the point a call fails so
//! the executor can decide between waiting, retrying, and skipping without
//! holding on to the response itself.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use http::header::HeaderMap;
use http::{HeaderValue, StatusCode};

/// Header carrying the number of requests left in the current quota window.
pub const QUOTA_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Header carrying the Unix instant at which the quota window resets.
pub const QUOTA_RESET_HEADER: &str = "x-ratelimit-reset";

/// Minimum wait applied when the advertised reset instant is not ahead of
/// the current time.
pub const QUOTA_WAIT_FLOOR: Duration = Duration::from_secs(5);

/// Status code and quota headers captured from a GitHub response.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use tallyman::github::rate_limit::ResponseSnapshot;
///
/// let snapshot = ResponseSnapshot::new(StatusCode::TOO_MANY_REQUESTS)
///     .with_retry_after(Some(5));
/// assert!(snapshot.is_quota_exhausted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSnapshot {
    /// HTTP status of the response.
    status: StatusCode,
    /// `Retry-After` value in seconds, when present and numeric.
    retry_after: Option<u64>,
    /// Remaining quota, when the header is present and numeric.
    quota_remaining: Option<u64>,
    /// Unix timestamp of the quota reset, when present and numeric.
    quota_reset: Option<u64>,
}

impl ResponseSnapshot {
    /// Creates a snapshot with no quota headers.
    #[must_use]
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            retry_after: None,
            quota_remaining: None,
            quota_reset: None,
        }
    }

    /// Sets the `Retry-After` seconds value.
    #[must_use]
    pub const fn with_retry_after(mut self, retry_after: Option<u64>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Sets the remaining-quota value.
    #[must_use]
    pub const fn with_quota_remaining(mut self, quota_remaining: Option<u64>) -> Self {
        self.quota_remaining = quota_remaining;
        self
    }

    /// Sets the quota-reset Unix timestamp.
    #[must_use]
    pub const fn with_quota_reset(mut self, quota_reset: Option<u64>) -> Self {
        self.quota_reset = quota_reset;
        self
    }

    /// Captures the status and quota headers of a received response.
    ///
    /// Missing or non-numeric headers are recorded as absent rather than
    /// rejected; quota decisions treat absent values conservatively.
    #[must_use]
    pub fn from_parts(status: StatusCode, headers: &HeaderMap) -> Self {
        Self {
            status,
            retry_after: header_as_u64(headers.get(http::header::RETRY_AFTER)),
            quota_remaining: header_as_u64(headers.get(QUOTA_REMAINING_HEADER)),
            quota_reset: header_as_u64(headers.get(QUOTA_RESET_HEADER)),
        }
    }

    /// Returns the HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns true when the response signals quota exhaustion.
    ///
    /// GitHub reports exhaustion either as `429 Too Many Requests` or as
    /// `403 Forbidden` with a remaining-quota header reading zero. A 403
    /// without the header is some other kind of refusal.
    #[must_use]
    pub fn is_quota_exhausted(&self) -> bool {
        match self.status {
            StatusCode::TOO_MANY_REQUESTS => true,
            StatusCode::FORBIDDEN => self.quota_remaining == Some(0),
            _ => false,
        }
    }

    /// Derives how long to wait before reissuing a quota-exhausted call.
    ///
    /// Prefers a positive `Retry-After` value; otherwise uses the reset
    /// instant, floored to [`QUOTA_WAIT_FLOOR`] when the reset is not ahead
    /// of `now_unix`. Returns `None` when the response does not signal quota
    /// exhaustion or advertises neither hint, in which case the failure is
    /// handled as an ordinary error instead.
    #[must_use]
    pub fn quota_wait_from(&self, now_unix: u64) -> Option<Duration> {
        if !self.is_quota_exhausted() {
            return None;
        }

        if let Some(seconds) = self.retry_after.filter(|seconds| *seconds > 0) {
            return Some(Duration::from_secs(seconds));
        }

        self.quota_reset.map(|reset| {
            Duration::from_secs(reset.saturating_sub(now_unix)).max(QUOTA_WAIT_FLOOR)
        })
    }

    /// Returns true for client errors that should be skipped outright.
    ///
    /// Covers resources that are missing (404), gone (410), legally
    /// unavailable (451), or forbidden for reasons other than quota
    /// exhaustion (403 with remaining quota).
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        match self.status {
            StatusCode::FORBIDDEN => !self.is_quota_exhausted(),
            StatusCode::NOT_FOUND
            | StatusCode::GONE
            | StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS => true,
            _ => false,
        }
    }
}

/// Current time as whole seconds since the Unix epoch.
///
/// Falls back to zero when the system clock reads before the epoch, which
/// only makes quota waits longer, never shorter.
#[must_use]
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

fn header_as_u64(value: Option<&HeaderValue>) -> Option<u64> {
    value
        .and_then(|raw| raw.to_str().ok())
        .and_then(|text| text.trim().parse().ok())
}
