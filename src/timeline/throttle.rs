use std::time::{Duration, Instant};

/// Default interval between handled scroll/pointer samples.
pub const INPUT_THROTTLE: Duration = Duration::from_millis(100);

/// Leading-edge rate limiter: the first call in each interval passes, the
/// rest are dropped.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether a sample taken at `now` should be handled.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(INPUT_THROTTLE)
    }
}
