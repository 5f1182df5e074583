//! Tests for the quota-aware call executor.
//!
//! The tokio clock is paused so quota waits and backoff sleeps complete
//! instantly while their durations stay observable.

use std::cell::Cell;
use std::time::Duration;

use http::StatusCode;

use super::{CallExecutor, CancelFlag};
use crate::github::error::HarvestError;
use crate::github::rate_limit::ResponseSnapshot;
use crate::harvest::policy::CallPolicy;

fn executor() -> CallExecutor {
    CallExecutor::new(CallPolicy::default(), CancelFlag::new())
}

fn executor_with(policy: CallPolicy) -> CallExecutor {
    CallExecutor::new(policy, CancelFlag::new())
}

fn quota_error(retry_after: u64) -> HarvestError {
    HarvestError::Api {
        snapshot: Some(
            ResponseSnapshot::new(StatusCode::TOO_MANY_REQUESTS)
                .with_retry_after(Some(retry_after)),
        ),
        message: "rate limited".to_owned(),
    }
}

fn status_error(status: StatusCode) -> HarvestError {
    HarvestError::Api {
        snapshot: Some(ResponseSnapshot::new(status)),
        message: format!("call failed with status {status}"),
    }
}

#[tokio::test(start_paused = true)]
async fn listing_waits_out_quota_and_reissues_the_same_call() {
    let calls = Cell::new(0_u32);
    let started = tokio::time::Instant::now();

    let result = executor()
        .run_listing(|| {
            let attempt = calls.get();
            calls.set(attempt + 1);
            async move {
                if attempt == 0 {
                    Err(quota_error(5))
                } else {
                    Ok("page one")
                }
            }
        })
        .await;

    assert_eq!(result, Ok("page one"));
    assert_eq!(calls.get(), 2);
    assert!(started.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn listing_clamps_the_quota_wait_to_the_configured_cap() {
    let calls = Cell::new(0_u32);
    let started = tokio::time::Instant::now();
    let runner = executor_with(CallPolicy {
        max_wait_reset: Duration::from_secs(3),
        ..CallPolicy::default()
    });

    let result = runner
        .run_listing(|| {
            let attempt = calls.get();
            calls.set(attempt + 1);
            async move {
                if attempt == 0 {
                    Err(quota_error(3600))
                } else {
                    Ok(())
                }
            }
        })
        .await;

    assert_eq!(result, Ok(()));
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(3));
    assert!(waited < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn listing_treats_non_quota_errors_as_fatal() {
    let calls = Cell::new(0_u32);

    let result: Result<(), HarvestError> = executor()
        .run_listing(|| {
            calls.set(calls.get() + 1);
            async { Err(status_error(StatusCode::INTERNAL_SERVER_ERROR)) }
        })
        .await;

    assert!(matches!(result, Err(HarvestError::Api { .. })));
    assert_eq!(calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn listing_treats_quota_status_without_hints_as_fatal() {
    // 429 with neither Retry-After nor a reset instant falls through to
    // ordinary error handling.
    let result: Result<(), HarvestError> = executor()
        .run_listing(|| async { Err(status_error(StatusCode::TOO_MANY_REQUESTS)) })
        .await;

    assert!(matches!(result, Err(HarvestError::Api { .. })));
}

#[tokio::test(start_paused = true)]
async fn item_skips_skippable_client_errors_without_retrying() {
    let calls = Cell::new(0_u32);

    let result: Option<String> = executor()
        .run_item(|| {
            calls.set(calls.get() + 1);
            async { Err(status_error(StatusCode::NOT_FOUND)) }
        })
        .await;

    assert_eq!(result, None);
    assert_eq!(calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn item_retries_transient_failures_up_to_the_budget() {
    let calls = Cell::new(0_u32);
    let runner = executor_with(CallPolicy {
        retries_nonrate: 3,
        ..CallPolicy::default()
    });

    let result: Option<String> = runner
        .run_item(|| {
            calls.set(calls.get() + 1);
            async { Err(status_error(StatusCode::BAD_GATEWAY)) }
        })
        .await;

    assert_eq!(result, None);
    assert_eq!(calls.get(), 3);
}

#[tokio::test(start_paused = true)]
async fn item_recovers_when_a_retry_succeeds() {
    let calls = Cell::new(0_u32);
    let runner = executor_with(CallPolicy {
        retries_nonrate: 2,
        ..CallPolicy::default()
    });

    let result = runner
        .run_item(|| {
            let attempt = calls.get();
            calls.set(attempt + 1);
            async move {
                if attempt == 0 {
                    Err(status_error(StatusCode::BAD_GATEWAY))
                } else {
                    Ok("diff text")
                }
            }
        })
        .await;

    assert_eq!(result, Some("diff text"));
    assert_eq!(calls.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn quota_waits_do_not_consume_the_retry_budget() {
    // A single-attempt budget still survives any number of quota waits.
    let calls = Cell::new(0_u32);
    let runner = executor_with(CallPolicy {
        retries_nonrate: 1,
        ..CallPolicy::default()
    });

    let result = runner
        .run_item(|| {
            let attempt = calls.get();
            calls.set(attempt + 1);
            async move {
                if attempt < 2 {
                    Err(quota_error(5))
                } else {
                    Ok("diff text")
                }
            }
        })
        .await;

    assert_eq!(result, Some("diff text"));
    assert_eq!(calls.get(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancelled_runs_stop_retrying_items() {
    let calls = Cell::new(0_u32);
    let cancel = CancelFlag::new();
    cancel.cancel();
    let runner = CallExecutor::new(
        CallPolicy {
            retries_nonrate: 5,
            ..CallPolicy::default()
        },
        cancel,
    );

    let result: Option<String> = runner
        .run_item(|| {
            calls.set(calls.get() + 1);
            async { Err(status_error(StatusCode::BAD_GATEWAY)) }
        })
        .await;

    assert_eq!(result, None);
    assert_eq!(calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_runs_stop_reissuing_quota_waits() {
    // A persistently exhausted quota must not keep an item call waiting
    // forever once the run is cancelled.
    let calls = Cell::new(0_u32);
    let cancel = CancelFlag::new();
    cancel.cancel();
    let runner = CallExecutor::new(CallPolicy::default(), cancel);

    let result: Option<String> = runner
        .run_item(|| {
            calls.set(calls.get() + 1);
            async { Err(quota_error(5)) }
        })
        .await;

    assert_eq!(result, None);
    assert_eq!(calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_a_quota_wait_gives_up_on_the_item() {
    let calls = Cell::new(0_u32);
    let cancel = CancelFlag::new();
    let runner = CallExecutor::new(CallPolicy::default(), cancel.clone());

    let result: Option<String> = runner
        .run_item(|| {
            let attempt = calls.get();
            calls.set(attempt + 1);
            // Cancel while the first quota wait is in progress.
            if attempt == 0 {
                cancel.cancel();
            }
            async { Err(quota_error(5)) }
        })
        .await;

    assert_eq!(result, None);
    assert_eq!(calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_runs_abort_listing_walks() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let runner = CallExecutor::new(CallPolicy::default(), cancel);

    let result: Result<(), HarvestError> = runner.run_listing(|| async { Ok(()) }).await;

    assert_eq!(result, Err(HarvestError::Cancelled));
}
