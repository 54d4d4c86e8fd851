//! Per-frame delta-time from the host's timestamp stream.

/// Converts monotonic millisecond timestamps into per-frame seconds.
///
/// The first tick after construction or [`reset`](FrameClock::reset)
/// establishes the baseline and yields 0.0, so nothing moves on that frame.
#[derive(Debug, Default)]
pub struct FrameClock {
    prev_ms: Option<f64>,
    dt: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `timestamp_ms` and return the seconds elapsed since the
    /// previous tick. A timestamp at or before the previous one clamps to
    /// 0.0 rather than running the simulation backwards; the baseline still
    /// advances unconditionally.
    pub fn tick(&mut self, timestamp_ms: f64) -> f64 {
        self.dt = match self.prev_ms {
            Some(prev) => ((timestamp_ms - prev) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.prev_ms = Some(timestamp_ms);
        self.dt
    }

    /// Seconds returned by the most recent `tick`.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Drop the baseline; the next tick yields 0.0 again.
    pub fn reset(&mut self) {
        self.prev_ms = None;
        self.dt = 0.0;
    }
}
