//! Call pacing and recovery policy for the harvesting executor.
//!
//! A [`CallPolicy`] is built once from configuration and passed to the
//! executor at construction; nothing here is global or mutable afterwards.

use std::time::Duration;

use rand::Rng;

/// Cap applied to quota-reset waits when no explicit cap is configured and
/// the run is not in eventual-completion mode.
pub const DEFAULT_RESET_WAIT_CAP: Duration = Duration::from_secs(120);

/// First delay of the non-quota retry backoff.
pub const BACKOFF_INITIAL: Duration = Duration::from_secs(1);

/// Ceiling of the non-quota retry backoff.
pub const BACKOFF_CEILING: Duration = Duration::from_secs(120);

/// Wait, retry, and pacing behaviour for remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Wait through quota resets until the walk completes, rather than
    /// capping each wait.
    pub eventual_complete: bool,
    /// Explicit cap on a single quota-reset wait; zero means no explicit
    /// cap was configured.
    pub max_wait_reset: Duration,
    /// Lower bound of the inter-call jitter window.
    pub sleep_min: Duration,
    /// Upper bound of the inter-call jitter window; zero disables jitter.
    pub sleep_max: Duration,
    /// Attempts for non-quota transient failures, floored to 1 at use.
    pub retries_nonrate: u32,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            eventual_complete: false,
            max_wait_reset: DEFAULT_RESET_WAIT_CAP,
            sleep_min: Duration::ZERO,
            sleep_max: Duration::ZERO,
            retries_nonrate: 1,
        }
    }
}

impl CallPolicy {
    /// Clamps a quota-reset wait to the configured cap.
    ///
    /// An explicit cap clamps in either mode. Without one, the wait is
    /// capped at [`DEFAULT_RESET_WAIT_CAP`] unless the run is in
    /// eventual-completion mode, which waits the full duration.
    #[must_use]
    pub fn clamp_reset_wait(&self, wait: Duration) -> Duration {
        if !self.max_wait_reset.is_zero() {
            return wait.min(self.max_wait_reset);
        }
        if self.eventual_complete {
            return wait;
        }
        wait.min(DEFAULT_RESET_WAIT_CAP)
    }

    /// Number of attempts granted to non-quota transient failures.
    #[must_use]
    pub const fn retry_budget(&self) -> u32 {
        if self.retries_nonrate == 0 {
            1
        } else {
            self.retries_nonrate
        }
    }

    /// Draws a uniformly random inter-call delay from the jitter window.
    ///
    /// Returns `None` when `sleep_max` is zero. An inverted window is
    /// clamped so the upper bound never undercuts `sleep_min`.
    #[must_use]
    pub fn jitter(&self) -> Option<Duration> {
        if self.sleep_max.is_zero() {
            return None;
        }
        let upper = self.sleep_max.max(self.sleep_min);
        Some(rand::thread_rng().gen_range(self.sleep_min..=upper))
    }
}

/// Advances the non-quota backoff schedule: doubled, capped at
/// [`BACKOFF_CEILING`].
#[must_use]
pub fn next_backoff(delay: Duration) -> Duration {
    delay.saturating_mul(2).min(BACKOFF_CEILING)
}
