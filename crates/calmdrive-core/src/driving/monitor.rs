//! Driving state monitor.
//!
//! Samples a [`TelemetrySource`] on a fixed interval and classifies the
//! vehicle as driving or stationary. Like the session engine it has no
//! internal thread: the caller invokes `tick_at()` and the monitor decides
//! whether a sample is due.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::telemetry::TelemetrySource;
use crate::events::Event;

/// Velocity above which the vehicle counts as driving, km/h.
pub const DRIVING_THRESHOLD_KMH: f64 = 5.0;

/// Sampling interval used by the app, ms.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrivingState {
    pub velocity: f64,
    pub is_driving: bool,
}

impl DrivingState {
    /// Classify a raw reading. Negative or non-finite readings count as 0.
    pub fn from_velocity(velocity: f64, threshold_kmh: f64) -> Self {
        let velocity = if velocity.is_finite() { velocity.max(0.0) } else { 0.0 };
        Self {
            velocity,
            is_driving: velocity > threshold_kmh,
        }
    }

    pub fn stationary() -> Self {
        Self {
            velocity: 0.0,
            is_driving: false,
        }
    }
}

impl Default for DrivingState {
    fn default() -> Self {
        Self::stationary()
    }
}

pub struct DrivingMonitor<T: TelemetrySource> {
    source: T,
    state: DrivingState,
    interval_ms: u64,
    threshold_kmh: f64,
    last_sample_ms: Option<u64>,
}

impl<T: TelemetrySource> DrivingMonitor<T> {
    pub fn new(source: T) -> Self {
        Self {
            source,
            state: DrivingState::stationary(),
            interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            threshold_kmh: DRIVING_THRESHOLD_KMH,
            last_sample_ms: None,
        }
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms.max(1);
        self
    }

    pub fn with_threshold_kmh(mut self, threshold_kmh: f64) -> Self {
        self.threshold_kmh = threshold_kmh;
        self
    }

    pub fn state(&self) -> DrivingState {
        self.state
    }

    pub fn is_driving(&self) -> bool {
        self.state.is_driving
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Sample if the interval has elapsed since the last sample.
    ///
    /// The first call always samples. Returns `DrivingStateChanged` only when
    /// the driving classification flips.
    pub fn tick_at(&mut self, now_ms: u64) -> Option<Event> {
        let due = match self.last_sample_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if !due {
            return None;
        }
        self.last_sample_ms = Some(now_ms);
        self.sample()
    }

    /// Take a sample immediately, ignoring the interval.
    pub fn sample(&mut self) -> Option<Event> {
        let was_driving = self.state.is_driving;
        self.state = DrivingState::from_velocity(self.source.next_velocity(), self.threshold_kmh);
        tracing::debug!(
            velocity = self.state.velocity,
            is_driving = self.state.is_driving,
            "driving sample"
        );

        if self.state.is_driving == was_driving {
            return None;
        }
        tracing::info!(is_driving = self.state.is_driving, "driving state changed");
        Some(Event::DrivingStateChanged {
            is_driving: self.state.is_driving,
            velocity: self.state.velocity,
            at: Utc::now(),
        })
    }
}
