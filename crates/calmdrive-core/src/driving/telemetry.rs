//! Velocity sources for the driving monitor.
//!
//! A real deployment feeds vehicle telemetry; the app ships with a seeded
//! simulation and tests replay scripted sequences.

use std::collections::VecDeque;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

/// Anything that can report the current vehicle velocity in km/h.
pub trait TelemetrySource {
    /// Read the next velocity sample.
    fn next_velocity(&mut self) -> f64;
}

/// Simulated vehicle: usually keeps its speed, occasionally jumps to a new one.
#[derive(Debug, Clone)]
pub struct SimulatedTelemetry {
    rng: Mcg128Xsl64,
    velocity: f64,
    change_probability: f64,
    max_velocity: f64,
}

impl SimulatedTelemetry {
    /// Probability that a sample draws a fresh velocity.
    pub const DEFAULT_CHANGE_PROBABILITY: f64 = 0.1;
    /// Upper bound (exclusive) for drawn velocities, km/h.
    pub const DEFAULT_MAX_VELOCITY: f64 = 60.0;

    /// Create a simulation; `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            rng,
            velocity: 0.0,
            change_probability: Self::DEFAULT_CHANGE_PROBABILITY,
            max_velocity: Self::DEFAULT_MAX_VELOCITY,
        }
    }

    pub fn with_change_probability(mut self, probability: f64) -> Self {
        self.change_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = max_velocity.max(0.0);
        self
    }

    pub fn with_initial_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity.max(0.0);
        self
    }
}

impl TelemetrySource for SimulatedTelemetry {
    fn next_velocity(&mut self) -> f64 {
        if self.rng.gen::<f64>() < self.change_probability {
            self.velocity = self.rng.gen::<f64>() * self.max_velocity;
        }
        self.velocity
    }
}

/// Replays a fixed sequence, then holds the last value (0.0 if empty).
#[derive(Debug, Clone, Default)]
pub struct ScriptedTelemetry {
    remaining: VecDeque<f64>,
    last: f64,
}

impl ScriptedTelemetry {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            remaining: samples.into_iter().collect(),
            last: 0.0,
        }
    }
}

impl TelemetrySource for ScriptedTelemetry {
    fn next_velocity(&mut self) -> f64 {
        if let Some(v) = self.remaining.pop_front() {
            self.last = v;
        }
        self.last
    }
}
