//! Paginated collection walking.
//!
//! Drives an executor-backed page fetch from page 1 until the API stops
//! advertising a next page, appending items in order. A quota wait during a
//! fetch reissues the same page, so pages are neither skipped nor
//! duplicated; any other listing failure aborts the walk.

use std::future::Future;

use crate::github::error::HarvestError;
use crate::github::gateway::FetchedPage;

use super::executor::CallExecutor;

/// Collects every item of a paginated collection, in API order.
///
/// `fetch_page` is invoked with the page number to request; the executor
/// re-invokes it with the same number after a quota wait. Inter-page jitter
/// is applied after every page that advances the walk.
///
/// # Errors
///
/// Propagates the executor's error when a page fetch fails for a reason
/// other than quota exhaustion, or when the run is cancelled.
pub async fn collect_all_pages<T, F, Fut>(
    executor: &CallExecutor,
    mut fetch_page: F,
) -> Result<Vec<T>, HarvestError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<FetchedPage<T>, HarvestError>>,
{
    let mut items = Vec::new();
    let mut page = 1_u32;

    loop {
        let fetched = executor.run_listing(|| fetch_page(page)).await?;
        items.extend(fetched.items);

        let Some(next) = fetched.next_page else {
            return Ok(items);
        };
        page = next;
        executor.pace().await;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use http::StatusCode;

    use super::collect_all_pages;
    use crate::github::error::HarvestError;
    use crate::github::gateway::FetchedPage;
    use crate::github::rate_limit::ResponseSnapshot;
    use crate::harvest::executor::{CallExecutor, CancelFlag};
    use crate::harvest::policy::CallPolicy;

    fn executor() -> CallExecutor {
        CallExecutor::new(CallPolicy::default(), CancelFlag::new())
    }

    #[tokio::test(start_paused = true)]
    async fn appends_pages_in_order_until_exhaustion() {
        let result = collect_all_pages(&executor(), |page| async move {
            match page {
                1 => Ok(FetchedPage {
                    items: vec!["a", "b"],
                    next_page: Some(2),
                }),
                2 => Ok(FetchedPage {
                    items: vec!["c"],
                    next_page: None,
                }),
                other => Err(HarvestError::Decode {
                    message: format!("unexpected page {other}"),
                }),
            }
        })
        .await;

        assert_eq!(result, Ok(vec!["a", "b", "c"]));
    }

    #[tokio::test(start_paused = true)]
    async fn reissues_the_same_page_after_a_quota_wait() {
        let requested = RefCell::new(Vec::new());

        let result = collect_all_pages(&executor(), |page| {
            let quota_hit = {
                let mut seen = requested.borrow_mut();
                seen.push(page);
                // First request for page 2 exhausts the quota.
                page == 2 && seen.iter().filter(|p| **p == 2).count() == 1
            };
            async move {
                if quota_hit {
                    Err(HarvestError::Api {
                        snapshot: Some(
                            ResponseSnapshot::new(StatusCode::TOO_MANY_REQUESTS)
                                .with_retry_after(Some(3)),
                        ),
                        message: "rate limited".to_owned(),
                    })
                } else if page == 1 {
                    Ok(FetchedPage {
                        items: vec![1, 2],
                        next_page: Some(2),
                    })
                } else {
                    Ok(FetchedPage {
                        items: vec![3],
                        next_page: None,
                    })
                }
            }
        })
        .await;

        assert_eq!(result, Ok(vec![1, 2, 3]));
        assert_eq!(*requested.borrow(), vec![1, 2, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn non_quota_listing_failure_aborts_the_walk() {
        let result: Result<Vec<u32>, HarvestError> =
            collect_all_pages(&executor(), |_page| async {
                Err(HarvestError::Api {
                    snapshot: Some(ResponseSnapshot::new(StatusCode::INTERNAL_SERVER_ERROR)),
                    message: "server error".to_owned(),
                })
            })
            .await;

        assert!(matches!(result, Err(HarvestError::Api { .. })));
    }
}
