use std::time::Duration;

/// Spacing and bounds for the assignment poll loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay after the first empty poll.
    pub initial_interval: Duration,
    /// Upper bound on the delay between polls.
    pub max_interval: Duration,
    /// Growth factor applied per empty poll (1.0 for a fixed interval).
    pub multiplier: f64,
    /// Maximum total wait for an assignment; `None` waits until cancelled.
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(2),
            multiplier: 2.0,
            deadline: None,
        }
    }
}

impl PollPolicy {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Delay before poll attempt N+1, given N empty polls so far (0-indexed).
    pub fn delay_after(&self, empty_polls: u32) -> Duration {
        let exponent = i32::try_from(empty_polls).unwrap_or(i32::MAX);
        let base_ms = self.initial_interval.as_millis() as f64 * self.multiplier.max(1.0).powi(exponent);
        let capped_ms = base_ms.min(self.max_interval.as_millis() as f64).max(0.0);

        Duration::from_millis(capped_ms as u64)
    }
}
