//! Transport-level retry with exponential backoff and jitter.
//!
//! [`BackoffConfig`] controls how transient HTTP errors (429, 5xx) are
//! retried with increasing delays. Cloud completion APIs rate-limit
//! aggressively on free tiers, so [`BackoffConfig::standard`] is the
//! recommended starting point.

use std::time::Duration;

/// Configuration for transport-level retry with exponential backoff and jitter.
///
/// # Example
///
/// ```
/// use ideaforge::provider::BackoffConfig;
///
/// // No retry
/// let none = BackoffConfig::none();
/// assert_eq!(none.max_retries, 0);
///
/// // Standard cloud API settings
/// let standard = BackoffConfig::standard();
/// assert_eq!(standard.max_retries, 3);
/// ```
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Maximum number of transport retries. Default: 0 (no retry).
    pub max_retries: u32,

    /// Initial delay before first retry. Default: 1 second.
    pub initial_delay: Duration,

    /// Multiplier applied to delay after each retry. Default: 2.0.
    pub multiplier: f64,

    /// Maximum delay between retries. Default: 60 seconds.
    pub max_delay: Duration,

    /// Jitter strategy. Default: Full.
    pub jitter: JitterStrategy,

    /// HTTP status codes that trigger retry. Default: `[429, 500, 502, 503, 504]`.
    pub retryable_statuses: Vec<u16>,

    /// Whether to respect `Retry-After` headers from the service.
    /// Default: `true`.
    pub respect_retry_after: bool,
}

/// Jitter strategy to prevent thundering herd on shared rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterStrategy {
    /// No jitter. Delay is exactly the calculated value.
    None,

    /// Full jitter: random value in `[0, calculated_delay]`.
    Full,

    /// Equal jitter: `calculated_delay/2 + random in [0, calculated_delay/2]`.
    Equal,
}

impl BackoffConfig {
    /// No transport retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::standard()
        }
    }

    /// Sensible defaults for cloud APIs: 3 retries, 1s initial, 2x
    /// multiplier, 60s max, full jitter, respects Retry-After.
    pub fn standard() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            jitter: JitterStrategy::Full,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            respect_retry_after: true,
        }
    }

    /// Conservative retry for interactive use (a user is waiting):
    /// 2 retries, 500ms initial, 10s max.
    pub fn interactive() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            multiplier: 1.5,
            max_delay: Duration::from_secs(10),
            jitter: JitterStrategy::Full,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            respect_retry_after: true,
        }
    }

    /// Calculate the delay for attempt N (0-indexed).
    ///
    /// The base delay is `initial_delay * multiplier^attempt`, capped at
    /// `max_delay`, then jittered per the configured strategy.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        let jittered = match self.jitter {
            JitterStrategy::None => capped,
            JitterStrategy::Full => fastrand::f64() * capped,
            JitterStrategy::Equal => capped / 2.0 + fastrand::f64() * (capped / 2.0),
        };

        Duration::from_secs_f64(jittered)
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> BackoffConfig {
        BackoffConfig {
            jitter: JitterStrategy::None,
            ..BackoffConfig::standard()
        }
    }

    #[test]
    fn delay_grows_exponentially() {
        let config = no_jitter();
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(8));
    }

    #[test]
    fn delay_capped_at_max() {
        let config = BackoffConfig {
            max_delay: Duration::from_secs(5),
            ..no_jitter()
        };
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[test]
    fn full_jitter_stays_in_range() {
        let config = BackoffConfig::standard();
        for _ in 0..100 {
            assert!(config.delay_for_attempt(0) <= Duration::from_secs(1));
        }
        for _ in 0..100 {
            assert!(config.delay_for_attempt(1) <= Duration::from_secs(2));
        }
    }

    #[test]
    fn equal_jitter_keeps_half_floor() {
        let config = BackoffConfig {
            jitter: JitterStrategy::Equal,
            ..BackoffConfig::standard()
        };
        for _ in 0..100 {
            let d = config.delay_for_attempt(1);
            assert!(d >= Duration::from_secs(1), "delay {:?} below half", d);
            assert!(d <= Duration::from_secs(2));
        }
    }

    #[test]
    fn presets() {
        assert_eq!(BackoffConfig::none().max_retries, 0);
        let standard = BackoffConfig::standard();
        assert_eq!(standard.max_retries, 3);
        assert!(standard.retryable_statuses.contains(&429));
        assert!(standard.retryable_statuses.contains(&503));
        assert_eq!(BackoffConfig::interactive().max_delay, Duration::from_secs(10));
    }
}
