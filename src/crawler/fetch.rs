//! Fetch-with-retry
//!
//! A single page fetch + extract is wrapped in a bounded retry loop. The
//! per-attempt result is an explicit outcome value rather than an error
//! used for control flow: an attempt either succeeds with records or is
//! retryable (navigation failure and empty extraction are not
//! distinguished). When every attempt is spent the caller gets a
//! terminal error for that one target; siblings in the same window are
//! unaffected.

use crate::{HarvestError, Result};
use std::future::Future;

/// Result of one fetch + extract attempt
#[derive(Debug)]
pub enum FetchOutcome<R> {
    /// The attempt produced records (possibly after earlier failures)
    Success(Vec<R>),

    /// The attempt failed in a way a full re-fetch may fix
    Retryable(String),
}

/// Runs `attempt` up to `retries + 1` times, returning the first success
///
/// Every retry is a full re-fetch of the same target. Failures in
/// between are logged at warn level; exhaustion produces
/// [`HarvestError::RetriesExhausted`].
///
/// # Arguments
///
/// * `url` - The target, used for logging and the terminal error
/// * `retries` - Additional attempts after the first failure
/// * `attempt` - One fetch + extract attempt
pub async fn fetch_with_retry<R, F, Fut>(url: &str, retries: u32, mut attempt: F) -> Result<Vec<R>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchOutcome<R>>,
{
    let attempts = retries + 1;

    for attempt_number in 1..=attempts {
        match attempt().await {
            FetchOutcome::Success(records) => {
                if attempt_number > 1 {
                    tracing::debug!(
                        "Fetch of {} succeeded on attempt {}/{}",
                        url,
                        attempt_number,
                        attempts
                    );
                }
                return Ok(records);
            }
            FetchOutcome::Retryable(reason) => {
                if attempt_number < attempts {
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}; retrying",
                        attempt_number,
                        attempts,
                        url,
                        reason
                    );
                } else {
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt_number,
                        attempts,
                        url,
                        reason
                    );
                }
            }
        }
    }

    Err(HarvestError::RetriesExhausted {
        url: url.to_string(),
        attempts,
    })
}
