// SPDX-License-Identifier: MIT
//! Bounded retry for outbound delivery calls.
//!
//! Provides [`retry_delivery`] — a generic async helper that re-attempts a
//! fallible operation a bounded number of times with a backoff delay between
//! attempts. The webhook client wraps its notify/acknowledge POSTs in it;
//! the sticker pipeline uses [`RetryConfig::no_retry`] because a failed
//! generation must never be re-attempted automatically.

use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for [`retry_delivery`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first try). Default: 3.
    pub max_attempts: u32,
    /// Delay before the second attempt. Default: 500 ms.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts. Default: 10 s.
    pub max_delay: Duration,
    /// Multiplier applied to the previous delay on each retry.
    /// Default: 2.0; use 1.0 for a fixed backoff.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Fixed backoff: `attempts` tries with the same `delay` between each.
    pub fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: attempts,
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
        }
    }

    /// A single attempt, no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Config suitable for unit tests (no real waiting).
    pub fn instant() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        }
    }
}

/// Re-attempt an async operation with bounded backoff.
///
/// Calls `f()` up to `config.max_attempts` times, sleeping between failures.
/// The delay starts at `config.initial_delay`, is multiplied by
/// `config.multiplier` after each attempt, and never exceeds
/// `config.max_delay`. Returns the first `Ok`, or the last error once the
/// attempt budget is spent.
///
/// # Panics
/// Panics if `config.max_attempts` is 0 (the operation would never run).
pub async fn retry_delivery<F, Fut, T, E>(config: &RetryConfig, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    assert!(
        config.max_attempts > 0,
        "RetryConfig.max_attempts must be at least 1"
    );

    let mut delay = config.initial_delay;
    let mut last_err: Option<E> = None;

    for attempt in 1..=config.max_attempts {
        match f().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "delivery succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                if attempt < config.max_attempts {
                    warn!(
                        attempt,
                        max = config.max_attempts,
                        delay_ms = delay.as_millis(),
                        err = ?e,
                        "delivery attempt failed — retrying"
                    );
                    tokio::time::sleep(delay).await;
                    let next_ms = (delay.as_millis() as f64 * config.multiplier) as u128;
                    delay = Duration::from_millis(next_ms.min(config.max_delay.as_millis()) as u64);
                } else {
                    warn!(
                        attempt,
                        max = config.max_attempts,
                        err = ?e,
                        "delivery attempts exhausted"
                    );
                    last_err = Some(e);
                }
            }
        }
    }

    // The loop always assigns last_err when every attempt fails.
    Err(last_err.expect("retry loop ended without setting last_err"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn first_try_success_does_not_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let out: Result<u32, &str> = retry_delivery(&RetryConfig::instant(), || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            }
        })
        .await;
        assert_eq!(out, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let out: Result<&str, &str> = retry_delivery(&RetryConfig::instant(), || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("transient")
                } else {
                    Ok("delivered")
                }
            }
        })
        .await;
        assert_eq!(out, Ok("delivered"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_budget_and_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let out: Result<(), String> =
            retry_delivery(&RetryConfig::fixed(4, Duration::from_millis(1)), || {
                let c = c.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    Err(format!("boom {n}"))
                }
            })
            .await;
        assert_eq!(out, Err("boom 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn no_retry_is_single_shot() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let out: Result<(), &str> = retry_delivery(&RetryConfig::no_retry(), || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err("fatal")
            }
        })
        .await;
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
