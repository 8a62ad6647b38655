//! Minimum-interval dispatch gate.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Per-backend gate spacing outbound dispatches at least `min_interval`
/// apart.
///
/// Callers block in [`throttle`](RateLimiter::throttle) until their slot
/// comes up; they are delayed, never dropped. The gate guarantees
/// spacing, not ordering: two concurrent callers may be released in
/// either order, but never closer than `min_interval` apart. Under high
/// local concurrency the gate becomes a convoy point, which is the
/// intended way of bounding the outbound rate.
///
/// # Examples
///
/// ```
/// use mentora_rate_limit::RateLimiter;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let limiter = RateLimiter::new(Duration::from_millis(100));
/// limiter.throttle().await; // first dispatch goes straight through
/// # });
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    // Time of the most recently granted dispatch slot. Slots are reserved
    // under the lock, so the spacing invariant holds even when many tasks
    // are parked here at once.
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a gate with the given minimum spacing.
    ///
    /// A zero interval disables pacing entirely.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// The configured minimum spacing.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until this caller's dispatch slot comes up.
    ///
    /// Reserves the next free slot (at least `min_interval` after the
    /// previously granted one), records it as the new last dispatch, then
    /// sleeps until the slot time if it lies in the future. The lock is
    /// held only for the reservation, never across the sleep.
    pub async fn throttle(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let slot = {
            let mut last = self.last_dispatch.lock().await;
            let now = Instant::now();
            let slot = match *last {
                Some(prev) => (prev + self.min_interval).max(now),
                None => now,
            };
            *last = Some(slot);
            slot
        };

        let now = Instant::now();
        if slot > now {
            tracing::debug!(
                wait_ms = (slot - now).as_millis() as u64,
                "Rate limiting: delaying dispatch"
            );
            tokio::time::sleep_until(slot).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_dispatch_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let before = Instant::now();
        limiter.throttle().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_dispatches_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        limiter.throttle().await;
        let first = Instant::now();
        limiter.throttle().await;
        let second = Instant::now();
        assert!(second - first >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_dispatches_keep_min_spacing() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(100)));
        let mut handles = Vec::new();
        for _ in 0..5 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.throttle().await;
                Instant::now()
            }));
        }

        let mut released = Vec::new();
        for handle in handles {
            released.push(handle.await.unwrap());
        }
        released.sort();

        for pair in released.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
    }

    #[tokio::test]
    async fn zero_interval_never_blocks() {
        let limiter = RateLimiter::new(Duration::ZERO);
        limiter.throttle().await;
        limiter.throttle().await;
    }
}
