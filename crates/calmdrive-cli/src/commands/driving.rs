use clap::Subcommand;
use serde::Serialize;

use calmdrive_core::{Config, DrivingMonitor, DrivingState, InteractionKind, SimulatedTelemetry};

use super::CmdResult;

#[derive(Subcommand)]
pub enum DrivingAction {
    /// Print simulated driving-state samples
    Simulate {
        /// Seed for a reproducible velocity feed
        #[arg(long)]
        seed: Option<u64>,
        /// Number of samples to take
        #[arg(long, default_value = "10")]
        samples: u32,
    },
    /// Print whether an interaction is restricted at a given velocity
    Restrict {
        /// Interaction kind: essential, basic or complex
        #[arg(long)]
        kind: InteractionKind,
        /// Velocity in km/h
        #[arg(long)]
        velocity: f64,
    },
}

#[derive(Serialize)]
struct Sample {
    at_ms: u64,
    velocity: f64,
    is_driving: bool,
    changed: bool,
}

#[derive(Serialize)]
struct Decision {
    kind: InteractionKind,
    velocity: f64,
    is_driving: bool,
    restricted: bool,
}

pub fn run(action: DrivingAction) -> CmdResult {
    let config = Config::load()?;
    let driving = &config.driving;

    match action {
        DrivingAction::Simulate { seed, samples } => {
            let telemetry = SimulatedTelemetry::new(seed)
                .with_change_probability(driving.change_probability)
                .with_max_velocity(driving.max_velocity_kmh);
            let mut monitor = DrivingMonitor::new(telemetry)
                .with_interval_ms(driving.sample_interval_ms())
                .with_threshold_kmh(driving.driving_threshold_kmh);

            for i in 0..u64::from(samples) {
                let at_ms = i * monitor.interval_ms();
                let changed = monitor.tick_at(at_ms).is_some();
                let state = monitor.state();
                let sample = Sample {
                    at_ms,
                    velocity: state.velocity,
                    is_driving: state.is_driving,
                    changed,
                };
                println!("{}", serde_json::to_string(&sample)?);
            }
        }
        DrivingAction::Restrict { kind, velocity } => {
            let state = DrivingState::from_velocity(velocity, driving.driving_threshold_kmh);
            let decision = Decision {
                kind,
                velocity: state.velocity,
                is_driving: state.is_driving,
                restricted: driving.policy().should_restrict(&state, kind),
            };
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
    }
    Ok(())
}
