//! Frame clock for the scene loop

use std::time::Instant;

/// Longest frame the clock reports; longer stalls are clamped
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Tracks wall-clock frame time for the scene loop.
///
/// The engines integrate with the variable frame delta it reports.
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    last_instant: Instant,
    first_tick: bool,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            last_instant: Instant::now(),
            first_tick: true,
            frames: 0,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the wall clock. Call once per frame; the first call yields 0.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return 0.0;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed)
    }

    /// Advance by an externally measured delta, as `tick` would
    pub fn advance(&mut self, elapsed: f64) -> f32 {
        self.delta_time = elapsed.clamp(0.0, MAX_FRAME_TIME);
        self.total_time += self.delta_time;
        self.frames += 1;
        self.delta_time as f32
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert_eq!(clock.frames(), 0);
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.frames(), 0);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut clock = FrameClock::new();
        let dt = clock.advance(3.0);
        assert!((dt - 0.25).abs() < 1e-6);
        assert!((clock.total_time - 0.25).abs() < 1e-10);
        assert_eq!(clock.advance(-1.0), 0.0);
    }

    #[test]
    fn test_advance_accumulates_total() {
        let mut clock = FrameClock::new();
        for _ in 0..4 {
            clock.advance(0.1);
        }
        assert!((clock.total_time - 0.4).abs() < 1e-10);
        assert!((clock.delta_time - 0.1).abs() < 1e-10);
        assert_eq!(clock.frames(), 4);
    }
}
