//! Exponential backoff sequence.

use std::time::Duration;

/// Infinite sequence of waits between connect attempts.
///
/// The first wait is the initial interval. Each following wait is the
/// previous one multiplied by the multiplier and capped at the max interval.
///
/// ```rust
/// use lifeline_reconnect::Backoff;
/// use std::time::Duration;
///
/// let delays: Vec<_> = Backoff::new(Duration::from_millis(100), Duration::from_secs(1), 2.0)
///     .take(6)
///     .collect();
///
/// assert_eq!(delays, vec![
///     Duration::from_millis(100),
///     Duration::from_millis(200),
///     Duration::from_millis(400),
///     Duration::from_millis(800),
///     Duration::from_secs(1),
///     Duration::from_secs(1),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max_interval: Duration,
    multiplier: f64,
}

impl Backoff {
    /// Creates a backoff sequence.
    ///
    /// A multiplier that is not a positive finite number is replaced by 2.0.
    pub fn new(initial_interval: Duration, max_interval: Duration, multiplier: f64) -> Self {
        Self {
            next: initial_interval,
            max_interval,
            multiplier: normalize_multiplier(multiplier),
        }
    }

    /// Returns the next wait and advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.next;
        self.next = self.grow(current);
        current
    }

    fn grow(&self, current: Duration) -> Duration {
        let scaled = current.as_secs_f64() * self.multiplier;
        if scaled >= self.max_interval.as_secs_f64() {
            self.max_interval
        } else {
            Duration::from_secs_f64(scaled)
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}

pub(crate) fn normalize_multiplier(multiplier: f64) -> f64 {
    if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        2.0
    }
}
