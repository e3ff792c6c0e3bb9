use std::time::Duration;

/// Lets an event through at most `rate` times per second of game time.
///
/// Time only advances through [`RateLimit::tick`], so the limiter follows the
/// frame clock rather than the wall clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    period: Duration,
    elapsed: Duration,
}

impl RateLimit {
    /// Starts counting from zero, so the first `check` passes after one period.
    pub fn new(rate: f32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / f64::from(rate.max(f32::EPSILON))),
            elapsed: Duration::ZERO,
        }
    }

    /// Same as `new`, but the first `check` passes immediately.
    pub fn ready(rate: f32) -> Self {
        let mut limit = Self::new(rate);
        limit.elapsed = limit.period;
        limit
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn tick(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }

    /// True once a full period has passed since construction or `renew`.
    pub fn check(&self) -> bool {
        self.elapsed >= self.period
    }

    pub fn renew(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Make the next `check` pass without waiting.
    pub fn prime(&mut self) {
        self.elapsed = self.elapsed.max(self.period);
    }
}
