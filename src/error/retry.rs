/// Exponential backoff for the engine's `Retriable` error class.
///
/// The only two places this fires are a persistent device-open failure
/// (retried a bounded number of times before the worker disables the
/// device) and a transient read/write error (retried within the current
/// chunk before being counted and continued past, per the pass executor's
/// short-write rule).
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl ExponentialBackoff {
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
        }
    }

    /// Preset used for `DeviceOpenFailed` retries.
    pub fn device_open() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(5), 3)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential_ms = self.base_delay.as_millis().saturating_mul(1u128 << attempt.min(16));
        Duration::from_millis(exponential_ms.min(self.max_delay.as_millis()) as u64)
    }
}
