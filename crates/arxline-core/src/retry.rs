//! Retry policy for page fetches.
//!
//! The OAI endpoint rate-limits aggressively and answers bursts with 503;
//! the harvest contract is to wait a fixed interval and retry the same
//! URL until it succeeds. The policy is a value so a bounded variant can
//! be swapped in (tests do) without touching the fetch logic.

use std::time::Duration;

use indicatif::ProgressBar;

use crate::http::FetchError;

/// Fixed wait between attempts on the live endpoint.
const HARVEST_BACKOFF: Duration = Duration::from_secs(60);

/// Retry policy: how many attempts, and how long to wait between them.
///
/// Backoff is fixed, no jitter. `max_attempts = None` retries forever.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts allowed; `None` means unbounded.
    pub max_attempts: Option<u32>,
    /// Fixed wait between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            backoff: HARVEST_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Bounded policy, mainly for tests and ad-hoc runs.
    pub fn bounded(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            backoff,
        }
    }

    /// Whether another attempt is allowed after `attempts` completed calls.
    pub fn allows(&self, attempts: u32) -> bool {
        match self.max_attempts {
            None => true,
            Some(max) => attempts < max,
        }
    }
}

/// Fetch a URL through `attempt_fn`, retrying per `policy`.
///
/// On a retryable failure, logs the URL and waits the fixed backoff
/// before re-issuing the SAME request. Returns the first success, or the
/// final error once the policy is exhausted or the error is not
/// retryable.
pub fn fetch_with_retry<T>(
    label: &str,
    url: &str,
    policy: &RetryPolicy,
    pb: &ProgressBar,
    mut attempt_fn: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    let mut attempts = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() && policy.allows(attempts + 1) => {
                attempts += 1;
                pb.set_message(format!("retrying in {}s...", policy.backoff.as_secs()));
                log::warn!(
                    "{label}: fetch failed ({e}), retrying {url} after {}s",
                    policy.backoff.as_secs()
                );
                std::thread::sleep(policy.backoff);
            }
            Err(e) => {
                log::error!("{label}: giving up on {url}: {e}");
                return Err(e);
            }
        }
    }
}
