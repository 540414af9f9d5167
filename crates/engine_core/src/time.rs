//! Time management for the game loop.

use std::time::Duration;

/// Shortest frame the simulation will step by (1 ms).
pub const DEFAULT_MIN_DELTA: Duration = Duration::from_millis(1);
/// Longest frame the simulation will step by (50 ms). Longer stalls are
/// clamped so one hitch cannot launch vehicles across the map.
pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(50);

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Duration of the last frame, unclamped.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Lower bound applied by `clamped_delta_seconds`.
    min_delta: Duration,
    /// Upper bound applied by `clamped_delta_seconds`.
    max_delta: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            min_delta: DEFAULT_MIN_DELTA,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Override the clamp bounds. `max` is raised to `min` if smaller.
    pub fn with_delta_bounds(mut self, min: Duration, max: Duration) -> Self {
        self.min_delta = min;
        self.max_delta = max.max(min);
        self
    }

    /// Step by an explicit frame duration.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
        if delta > self.max_delta {
            log::debug!(
                "frame {} took {:.1} ms, clamping to {:.1} ms",
                self.frame_count,
                delta.as_secs_f32() * 1000.0,
                self.max_delta.as_secs_f32() * 1000.0
            );
        }
    }

    /// Get the raw delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Delta time in seconds, clamped to the configured bounds. This is the
    /// value to hand to the simulation.
    pub fn clamped_delta_seconds(&self) -> f32 {
        self.delta.clamp(self.min_delta, self.max_delta).as_secs_f32()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
