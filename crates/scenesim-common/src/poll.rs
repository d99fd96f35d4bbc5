//! Fixed-interval polling with a deadline.

use crate::PollError;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// Tracks a polling loop: when it started, how often it checks, and when it
/// must give up.
///
/// ```rust,ignore
/// let schedule = PollSchedule::start(Duration::from_millis(50), Duration::from_secs(1));
/// loop {
///     if condition() {
///         break;
///     }
///     schedule.wait_next().await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    timeout: Duration,
    started: Instant,
    attempts: u32,
}

impl PollSchedule {
    /// Start a schedule now.
    pub fn start(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            started: Instant::now(),
            attempts: 0,
        }
    }

    /// Time since the schedule started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Number of waits performed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sleep until the next check.
    ///
    /// Fails once the deadline has been reached. The final sleep is clamped
    /// so that one last check happens exactly at the deadline.
    pub async fn wait_next(&mut self) -> Result<(), PollError> {
        let elapsed = self.elapsed();
        if elapsed >= self.timeout {
            return Err(PollError::Timeout {
                elapsed,
                timeout: self.timeout,
            });
        }

        let delay = self.interval.min(self.timeout - elapsed);
        self.attempts += 1;
        trace!(attempt = self.attempts, ?delay, "Polling again");
        sleep(delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_next_until_deadline() {
        let mut schedule = PollSchedule::start(Duration::from_millis(40), Duration::from_millis(100));

        assert!(schedule.wait_next().await.is_ok()); // t = 40
        assert!(schedule.wait_next().await.is_ok()); // t = 80
        assert!(schedule.wait_next().await.is_ok()); // t = 100 (clamped)

        let err = schedule.wait_next().await.unwrap_err();
        assert!(err.elapsed() >= Duration::from_millis(100));
        assert_eq!(schedule.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_fails_immediately() {
        let mut schedule = PollSchedule::start(Duration::from_millis(10), Duration::ZERO);
        assert!(matches!(
            schedule.wait_next().await,
            Err(PollError::Timeout { .. })
        ));
        assert_eq!(schedule.attempts(), 0);
    }
}
