//! Clock and rate utilities for long-running conversions.
//!
//! A conversion is anchored to a monotonic epoch recorded when it starts.
//! This module provides utilities for:
//! - Capturing the epoch (and its wall-clock counterpart for headers)
//! - Measuring row throughput
//! - Throttling progress reports

use std::time::Instant;

/// A conversion clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the conversion started).
#[derive(Debug, Clone)]
pub struct ConversionClock {
    /// The instant the conversion started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl ConversionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since the conversion started.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since the conversion started.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at conversion start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Items per second given a count processed since the epoch.
    pub fn rate_per_sec(&self, count: u64) -> f64 {
        throughput(count, self.elapsed_secs())
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }
}

/// Items per second, zero when no time has elapsed.
pub fn throughput(count: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        0.0
    } else {
        count as f64 / elapsed_secs
    }
}

/// Rate controller for throttled reporting.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    ///
    /// A rate of zero disables throttling: every call ticks.
    pub fn new(target_hz: u32) -> Self {
        let target_interval_ns = if target_hz == 0 {
            0
        } else {
            1_000_000_000 / target_hz as u64
        };
        Self {
            target_interval_ns,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = ConversionClock::start();
        assert!(clock.elapsed_ns() < 1_000_000_000);
        assert!(chrono::DateTime::parse_from_rfc3339(clock.epoch_wall()).is_ok());
    }

    #[test]
    fn test_ns_to_secs_conversion() {
        assert!((ConversionClock::ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_throughput() {
        assert!((throughput(300, 2.0) - 150.0).abs() < 1e-9);
        assert_eq!(throughput(10, 0.0), 0.0);
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::new(4);
        assert!(ctrl.should_tick(0)); // first tick always fires
        assert!(!ctrl.should_tick(100_000_000));
        assert!(ctrl.should_tick(250_000_000));
    }

    #[test]
    fn test_rate_controller_zero_hz_always_ticks() {
        let mut ctrl = RateController::new(0);
        assert!(ctrl.should_tick(0));
        assert!(ctrl.should_tick(0));
        assert_eq!(ctrl.interval_ns(), 0);
    }
}
