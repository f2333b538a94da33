//! Pacing and 429 backoff for one retrieval.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::CatalogError;

/// Keeps successive detail fetches at least `min_delay` apart after a success.
pub(crate) struct Pacer {
    min_delay: Duration,
    last_success: Option<Instant>,
}

impl Pacer {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_success: None,
        }
    }

    /// Wait if the previous successful fetch was less than `min_delay` ago.
    pub async fn wait(&self) {
        if self.min_delay.is_zero() {
            return;
        }
        if let Some(last) = self.last_success {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                sleep(self.min_delay - elapsed).await;
            }
        }
    }

    pub fn record_success(&mut self) {
        self.last_success = Some(Instant::now());
    }
}

/// Caps the number of 429-triggered sleeps a single request may take.
pub(crate) struct BackoffBudget {
    delay: Duration,
    remaining: u32,
    used: u32,
}

impl BackoffBudget {
    pub fn new(delay: Duration, max_backoffs: u32) -> Self {
        Self {
            delay,
            remaining: max_backoffs,
            used: 0,
        }
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    /// Sleep for the backoff interval. Returns false without sleeping when the
    /// budget is spent, and false when cancelled mid-sleep.
    pub async fn back_off(&mut self, cancel: &CancellationToken) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.used += 1;

        tokio::select! {
            _ = sleep(self.delay) => true,
            _ = cancel.cancelled() => false,
        }
    }
}

/// Run `call`, backing off and retrying while it answers 429 and the budget lasts.
pub(crate) async fn retry_rate_limited<T, F, Fut>(
    budget: &mut BackoffBudget,
    cancel: &CancellationToken,
    what: &str,
    mut call: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    loop {
        match call().await {
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(target_call = what, error = %e, "catalog rate limited, backing off");
                if !budget.back_off(cancel).await {
                    return Err(e);
                }
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_pacer_spaces_successes() {
        let mut pacer = Pacer::new(Duration::from_millis(100));
        let start = Instant::now();
        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        pacer.record_success();
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_is_bounded() {
        let cancel = CancellationToken::new();
        let mut budget = BackoffBudget::new(Duration::from_secs(1), 2);
        let start = Instant::now();
        assert!(budget.back_off(&cancel).await);
        assert!(budget.back_off(&cancel).await);
        assert!(!budget.back_off(&cancel).await);
        assert_eq!(budget.used(), 2);
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_success() {
        let cancel = CancellationToken::new();
        let mut budget = BackoffBudget::new(Duration::from_secs(1), 5);
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let result = retry_rate_limited(&mut budget, &cancel, "lookup", move || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(CatalogError::RateLimited {
                    retry_after_secs: None,
                })
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(budget.used(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_when_budget_spent() {
        let cancel = CancellationToken::new();
        let mut budget = BackoffBudget::new(Duration::from_secs(1), 1);
        let result: Result<(), _> = retry_rate_limited(&mut budget, &cancel, "lookup", || async {
            Err(CatalogError::RateLimited {
                retry_after_secs: Some(3),
            })
        })
        .await;
        assert!(result.unwrap_err().is_rate_limited());
    }
}
