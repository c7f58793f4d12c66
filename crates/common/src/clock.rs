//! Clock and timing utilities for playback and gesture handling.
//!
//! Playback advances by measured wall time, never by a fixed increment, so
//! the scheduler stays correct when timer callbacks arrive late. This
//! module provides:
//! - A resettable elapsed-time clock for tick measurement
//! - A minimum-interval gate for rate-limited emission
//! - Drift measurement between an expected and an observed position

use std::time::{Duration, Instant};

/// Measures wall time between successive ticks.
///
/// The baseline is explicit: after a pause, [`ElapsedClock::reset`] moves it
/// to the resume instant so the first tick does not include the pause.
#[derive(Debug, Clone, Default)]
pub struct ElapsedClock {
    last: Option<Instant>,
}

impl ElapsedClock {
    /// Create a clock with no baseline.
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Set the baseline to `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Drop the baseline; the next lap reports zero.
    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Seconds elapsed since the previous lap (or reset), advancing the
    /// baseline to `now`. Returns 0 when no baseline exists.
    pub fn lap(&mut self, now: Instant) -> f64 {
        let elapsed = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last = Some(now);
        elapsed
    }

    /// Whether a baseline is set.
    pub fn is_running(&self) -> bool {
        self.last.is_some()
    }
}

/// Minimum-interval gate for rate-limited emission.
#[derive(Debug, Clone)]
pub struct RateController {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl RateController {
    /// Create a controller that fires at most once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
        }
    }

    /// Create a controller from a millisecond interval.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, now: Instant) -> bool {
        match self.last_tick {
            None => {
                self.last_tick = Some(now);
                true
            }
            Some(last) if now.saturating_duration_since(last) >= self.interval => {
                self.last_tick = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Forget the last tick so the next call fires immediately.
    pub fn reset(&mut self) {
        self.last_tick = None;
    }

    /// Configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Drift between where a stream should be and where it reports being.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftMeasurement {
    /// Expected position (seconds).
    pub expected: f64,
    /// Observed position (seconds).
    pub observed: f64,
}

impl DriftMeasurement {
    pub fn new(expected: f64, observed: f64) -> Self {
        Self { expected, observed }
    }

    /// Drift in seconds (positive = observed is ahead).
    pub fn drift(&self) -> f64 {
        self.observed - self.expected
    }

    /// Whether drift exceeds `threshold` seconds in either direction.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.drift().abs() > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lap_measures_actual_elapsed() {
        let base = Instant::now();
        let mut clock = ElapsedClock::new();
        assert_eq!(clock.lap(base), 0.0);

        let elapsed = clock.lap(base + Duration::from_millis(40));
        assert!((elapsed - 0.040).abs() < 1e-9);

        let elapsed = clock.lap(base + Duration::from_millis(56));
        assert!((elapsed - 0.016).abs() < 1e-9);
    }

    #[test]
    fn test_reset_discards_pause() {
        let base = Instant::now();
        let mut clock = ElapsedClock::new();
        clock.reset(base);
        clock.reset(base + Duration::from_secs(30));
        let elapsed = clock.lap(base + Duration::from_secs(30) + Duration::from_millis(16));
        assert!((elapsed - 0.016).abs() < 1e-9);
    }

    #[test]
    fn test_drift_measurement() {
        let drift = DriftMeasurement::new(5.0, 5.3);
        assert!((drift.drift() - 0.3).abs() < 1e-9);
        assert!(drift.exceeds(0.2));
        assert!(!drift.exceeds(0.5));
        assert!(DriftMeasurement::new(5.0, 4.7).exceeds(0.2));
    }

    #[test]
    fn test_rate_controller() {
        let base = Instant::now();
        let mut ctrl = RateController::from_millis(16);
        assert!(ctrl.should_tick(base)); // first tick always fires
        assert!(!ctrl.should_tick(base + Duration::from_millis(1)));
        assert!(ctrl.should_tick(base + Duration::from_millis(17)));
        ctrl.reset();
        assert!(ctrl.should_tick(base + Duration::from_millis(18)));
    }
}
