//! Fixed inter-request delay.

use std::time::Duration;

/// Sleeps a constant interval after each paced API call.
///
/// This is a self-imposed rate limit, not adaptive backoff. A zero delay
/// turns pacing off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(maildelegate_core::config::DEFAULT_REQUEST_DELAY_MS))
    }
}
