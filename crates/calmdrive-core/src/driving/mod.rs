mod monitor;
mod policy;
mod telemetry;

pub use monitor::{DrivingMonitor, DrivingState, DEFAULT_SAMPLE_INTERVAL_MS, DRIVING_THRESHOLD_KMH};
pub use policy::{should_restrict, InteractionKind, RestrictionPolicy, BASIC_RESTRICT_KMH};
pub use telemetry::{ScriptedTelemetry, SimulatedTelemetry, TelemetrySource};
