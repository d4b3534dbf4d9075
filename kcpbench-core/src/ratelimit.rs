//! Client-side request throttling.
//!
//! A stock client throttles with a token bucket (QPS 5, burst 10). The
//! benchmark factory replaces it with [`RateLimit::AlwaysAllow`] so measured
//! latency reflects the server, not the client.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota};

/// Throttling policy of a client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLimit {
    /// Never wait.
    AlwaysAllow,
    /// Refill `qps` tokens per second up to `burst`. Non-positive values disable throttling.
    TokenBucket { qps: f32, burst: i64 },
}

/// Runtime state of a [`RateLimit`].
pub struct RateLimiter {
    bucket: Option<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        let bucket = match limit {
            RateLimit::AlwaysAllow => None,
            RateLimit::TokenBucket { qps, burst } => {
                quota(qps, burst).map(governor::RateLimiter::direct)
            }
        };
        Self { bucket }
    }

    pub fn is_unlimited(&self) -> bool {
        self.bucket.is_none()
    }

    /// Wait until a request may be sent.
    pub async fn acquire(&self) {
        if let Some(bucket) = &self.bucket {
            bucket.until_ready().await;
        }
    }

    /// Take a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.bucket.as_ref().map_or(true, |b| b.check().is_ok())
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("unlimited", &self.is_unlimited())
            .finish()
    }
}

/// `None` when the parameters never throttle in practice.
fn quota(qps: f32, burst: i64) -> Option<Quota> {
    if qps.is_nan() || qps <= 0.0 || burst <= 0 {
        return None;
    }
    let period = Duration::try_from_secs_f64(1.0 / f64::from(qps)).unwrap_or(Duration::MAX);
    let burst = NonZeroU32::new(u32::try_from(burst).unwrap_or(u32::MAX))?;
    // Sub-nanosecond periods round to zero, which governor rejects.
    Quota::with_period(period).map(|q| q.allow_burst(burst))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_always_allow_never_waits() {
        let limiter = RateLimiter::new(RateLimit::AlwaysAllow);
        assert!(limiter.is_unlimited());
        for _ in 0..1000 {
            assert!(limiter.try_acquire());
        }
    }

    #[test]
    fn test_bucket_waits_after_burst() {
        let limiter = RateLimiter::new(RateLimit::TokenBucket { qps: 10.0, burst: 2 });
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_max_limits_never_wait() {
        let limiter = RateLimiter::new(RateLimit::TokenBucket {
            qps: f32::MAX,
            burst: i64::MAX,
        });
        assert!(limiter.is_unlimited());
        for _ in 0..1000 {
            assert!(limiter.try_acquire());
        }
    }

    #[test]
    fn test_non_positive_parameters_disable_throttling() {
        assert!(quota(0.0, 10).is_none());
        assert!(quota(-1.0, 10).is_none());
        assert!(quota(f32::NAN, 10).is_none());
        assert!(quota(5.0, 0).is_none());
        assert!(quota(5.0, 10).is_some());
    }

    #[tokio::test]
    async fn test_acquire_sleeps() {
        let limiter = RateLimiter::new(RateLimit::TokenBucket { qps: 100.0, burst: 1 });
        limiter.acquire().await;
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
