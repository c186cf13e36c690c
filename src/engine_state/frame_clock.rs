//! Frame timing.

use web_time::{Duration, Instant};

/// Measures the time between frames, clamped so a stall never becomes one huge physics
/// step.
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        FrameClock {
            last_tick: Instant::now(),
            max_delta,
        }
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }

    /// Time since the previous tick (or reset), at most `max_delta`.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.clamp(delta)
    }

    /// Restarts the measurement from now, discarding the time elapsed so far.
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }

    pub fn clamp(&self, delta: Duration) -> Duration {
        delta.min(self.max_delta)
    }
}
