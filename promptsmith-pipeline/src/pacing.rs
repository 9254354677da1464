//! Spacing between consecutive pipeline runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_VARIATION_DELAY: Duration = Duration::from_secs(1);

/// Delay policy applied between variation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "interval")]
pub enum PacingPolicy {
    /// Runs start back to back.
    Unpaced,
    /// Wait this long after one run finishes before the next starts.
    FixedInterval(Duration),
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::FixedInterval(DEFAULT_VARIATION_DELAY)
    }
}

impl PacingPolicy {
    /// Delay before the run at zero-based `run_index`; the first run never waits.
    pub fn delay_before(&self, run_index: usize) -> Option<Duration> {
        match self {
            Self::FixedInterval(interval) if run_index > 0 && !interval.is_zero() => {
                Some(*interval)
            }
            _ => None,
        }
    }

    pub async fn pace(&self, run_index: usize) {
        if let Some(delay) = self.delay_before(run_index) {
            debug!("Pacing {:?} before run {}", delay, run_index + 1);
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn first_run_never_waits() {
        let policy = PacingPolicy::FixedInterval(Duration::from_millis(250));
        assert_eq!(policy.delay_before(0), None);
        assert_eq!(policy.delay_before(1), Some(Duration::from_millis(250)));
        assert_eq!(policy.delay_before(7), Some(Duration::from_millis(250)));
        assert_eq!(PacingPolicy::Unpaced.delay_before(3), None);
        assert_eq!(PacingPolicy::FixedInterval(Duration::ZERO).delay_before(3), None);
        assert_eq!(PacingPolicy::default().delay_before(1), Some(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn pace_sleeps_for_the_interval() {
        let policy = PacingPolicy::FixedInterval(Duration::from_millis(40));
        let start = Instant::now();
        policy.pace(0).await;
        assert!(start.elapsed() < Duration::from_millis(40));
        policy.pace(1).await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
