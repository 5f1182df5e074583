//! Quota-aware execution of remote calls.
//!
//! Every remote call the harvester makes goes through [`CallExecutor`],
//! which turns a failure into one of four recoveries: wait out the quota
//! window and reissue the same call, back off and retry, skip the item, or
//! surface the error. Quota waits never consume the non-quota retry budget.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::sleep;

use crate::github::error::HarvestError;
use crate::github::rate_limit::{ResponseSnapshot, now_unix};

use super::policy::{BACKOFF_INITIAL, CallPolicy, next_backoff};

/// Run-level cancellation flag shared with the signal handler.
///
/// Checked at retry boundaries; an in-progress wait is not preempted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the run as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Recovery chosen for a failed call.
///
/// `Fatal` means the executor gives up on the call: the listing path
/// propagates it, the item path degrades it to a skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    /// Wait out the quota window, then reissue the same call.
    Wait(Duration),
    /// Transient failure with retry budget left: back off, then retry.
    Backoff,
    /// Skippable client error: treat the item as absent.
    Skip,
    /// Out of options for this call.
    Fatal,
}

/// Executes remote calls under a [`CallPolicy`].
#[derive(Debug, Clone)]
pub struct CallExecutor {
    policy: CallPolicy,
    cancel: CancelFlag,
}

impl CallExecutor {
    /// Creates an executor for the given policy and cancellation flag.
    #[must_use]
    pub const fn new(policy: CallPolicy, cancel: CancelFlag) -> Self {
        Self { policy, cancel }
    }

    /// Runs a listing call: quota exhaustion is waited out and the same
    /// call reissued; any other failure is fatal for the collection.
    ///
    /// # Errors
    ///
    /// Returns the call's error when it is not recoverable by waiting, or
    /// [`HarvestError::Cancelled`] when the run is cancelled between
    /// retries.
    pub async fn run_listing<T, C, Fut>(&self, mut call: C) -> Result<T, HarvestError>
    where
        C: FnMut() -> Fut,
        Fut: Future<Output = Result<T, HarvestError>>,
    {
        loop {
            if self.cancel.is_cancelled() {
                return Err(HarvestError::Cancelled);
            }

            match call().await {
                Ok(value) => return Ok(value),
                Err(error) => match self.assess_listing(&error) {
                    Recovery::Wait(wait) => {
                        tracing::warn!(
                            wait_secs = wait.as_secs(),
                            "quota exhausted; waiting before reissuing the page request"
                        );
                        sleep(wait).await;
                    }
                    _ => return Err(error),
                },
            }
        }
    }

    /// Runs an item call: quota exhaustion is waited out, skippable client
    /// errors and exhausted retries degrade to `None`, transient failures
    /// retry with capped exponential backoff. A cancelled run gives up on
    /// the item before any further reissue.
    pub async fn run_item<T, C, Fut>(&self, mut call: C) -> Option<T>
    where
        C: FnMut() -> Fut,
        Fut: Future<Output = Result<T, HarvestError>>,
    {
        let mut attempts_left = self.policy.retry_budget();
        let mut delay = BACKOFF_INITIAL;

        loop {
            match call().await {
                Ok(value) => return Some(value),
                Err(error) => match self.assess_item(&error, attempts_left) {
                    Recovery::Wait(wait) => {
                        tracing::warn!(
                            wait_secs = wait.as_secs(),
                            "quota exhausted; waiting before reissuing the call"
                        );
                        sleep(wait).await;
                        if self.cancel.is_cancelled() {
                            tracing::debug!("run cancelled; skipping item");
                            return None;
                        }
                    }
                    Recovery::Backoff => {
                        attempts_left -= 1;
                        tracing::debug!(
                            %error,
                            backoff_secs = delay.as_secs(),
                            "transient failure; backing off before retrying"
                        );
                        sleep(delay).await;
                        delay = next_backoff(delay);
                    }
                    Recovery::Skip => {
                        tracing::debug!(%error, "skipping item");
                        return None;
                    }
                    Recovery::Fatal => {
                        tracing::warn!(%error, "giving up on item after retries");
                        return None;
                    }
                },
            }
        }
    }

    /// Sleeps an inter-call jitter delay, when the policy configures one.
    pub async fn pace(&self) {
        if let Some(delay) = self.policy.jitter() {
            sleep(delay).await;
        }
    }

    /// Capped wait derived from the error's quota hints, when the error
    /// signals quota exhaustion with a usable hint.
    fn quota_wait(&self, error: &HarvestError) -> Option<Duration> {
        error
            .snapshot()
            .and_then(|snapshot| snapshot.quota_wait_from(now_unix()))
            .map(|wait| self.policy.clamp_reset_wait(wait))
    }

    fn assess_listing(&self, error: &HarvestError) -> Recovery {
        self.quota_wait(error).map_or(Recovery::Fatal, Recovery::Wait)
    }

    fn assess_item(&self, error: &HarvestError, attempts_left: u32) -> Recovery {
        if let Some(wait) = self.quota_wait(error) {
            return Recovery::Wait(wait);
        }
        if error.snapshot().is_some_and(ResponseSnapshot::is_skippable) {
            return Recovery::Skip;
        }
        if attempts_left <= 1 || self.cancel.is_cancelled() {
            return Recovery::Fatal;
        }
        Recovery::Backoff
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
