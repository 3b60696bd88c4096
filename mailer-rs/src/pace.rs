//! Send pacing
//!
//! Sends are throttled with a fixed delay between operations instead of
//! running concurrently. The delay comes from configuration so tests can
//! set it to zero.

use std::time::Duration;

/// Fixed delay applied between consecutive sends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pace(Duration);

impl Pace {
    pub fn new(delay: Duration) -> Self {
        Self(delay)
    }

    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    /// No delay at all
    pub fn none() -> Self {
        Self(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_zero()
    }

    /// Suspend the current task for the configured delay
    pub async fn wait(&self) {
        if !self.is_none() {
            tokio::time::sleep(self.0).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_wait_elapses_delay() {
        let pace = Pace::from_millis(250);
        let start = Instant::now();
        pace.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_none_does_not_sleep() {
        let start = Instant::now();
        Pace::none().wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
