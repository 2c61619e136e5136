use std::time::Duration;

/// Delay between polls: the base interval while healthy, doubling per
/// consecutive failure up to `max` when backoff is enabled
#[derive(Debug, Clone)]
pub struct Backoff {
    interval: Duration,
    max: Option<Duration>,
    failures: u32,
}

impl Backoff {
    pub fn new(interval: Duration, max: Option<Duration>) -> Self {
        Self {
            interval,
            max,
            failures: 0,
        }
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn next_delay(&self) -> Duration {
        let Some(max) = self.max else {
            return self.interval;
        };
        if self.failures == 0 {
            return self.interval;
        }

        let factor = 1u32.checked_shl(self.failures.min(31)).unwrap_or(u32::MAX);
        self.interval
            .checked_mul(factor)
            .unwrap_or(max)
            .min(max)
            .max(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_interval_without_backoff() {
        let mut b = Backoff::new(Duration::from_secs(10), None);
        b.record_failure();
        b.record_failure();
        assert_eq!(b.next_delay(), Duration::from_secs(10));
    }

    #[test]
    fn doubles_until_capped_and_resets() {
        let mut b = Backoff::new(Duration::from_secs(10), Some(Duration::from_secs(60)));
        assert_eq!(b.next_delay(), Duration::from_secs(10));

        b.record_failure();
        assert_eq!(b.next_delay(), Duration::from_secs(20));
        b.record_failure();
        assert_eq!(b.next_delay(), Duration::from_secs(40));
        b.record_failure();
        assert_eq!(b.next_delay(), Duration::from_secs(60));
        for _ in 0..100 {
            b.record_failure();
        }
        assert_eq!(b.next_delay(), Duration::from_secs(60));

        b.record_success();
        assert_eq!(b.next_delay(), Duration::from_secs(10));
    }
}
