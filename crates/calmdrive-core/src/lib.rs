//! # CalmDrive Core Library
//!
//! This library provides the core logic for CalmDrive, a guided-breathing
//! companion for use in vehicles. The CLI (and any other shell) is a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Session Engine**: wall-clock state machine; the caller invokes
//!   `tick_at()` once per frame for phase progress and guidance cues
//! - **Driving Monitor**: samples a pluggable telemetry source on an interval
//!   and feeds the interaction restriction policy
//! - **Media**: resolves stored clip paths to public object-storage URLs
//! - **Storage**: SQLite session log and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`BreathingSession`]: phase animation + guidance for one session
//! - [`GuidanceScheduler`]: min-heap cue scheduler with generation cancellation
//! - [`DrivingMonitor`] and [`RestrictionPolicy`]
//! - [`MediaResolver`]: path to URL resolution
//! - [`Database`] and [`Config`]

pub mod app_state;
pub mod breathing;
pub mod driving;
pub mod error;
pub mod events;
pub mod exercise;
pub mod guidance;
pub mod media;
pub mod session;
pub mod storage;

pub use app_state::{AppState, Orientation, OrientationLock, Theme, ThemePreference};
pub use breathing::{BreathingPhase, PhaseAnimator, PhaseCycle, PhaseDurations};
pub use driving::{
    should_restrict, DrivingMonitor, DrivingState, InteractionKind, RestrictionPolicy,
    ScriptedTelemetry, SimulatedTelemetry, TelemetrySource,
};
pub use error::{
    ConfigError, CoreError, DatabaseError, MediaError, OrientationError, PlaybackError,
    ValidationError,
};
pub use events::Event;
pub use exercise::{builtin_exercises, exercise_from_deep_link, find_exercise, Exercise};
pub use guidance::{AudioPlayer, GuidanceCue, GuidanceScheduler, GuidanceState, RecordingPlayer};
pub use media::{MediaResolver, ObjectStorage, SupabaseStorage};
pub use session::{BreathingSession, SessionConfig, SessionState};
pub use storage::{Config, Database};

/// Milliseconds since the Unix epoch, for callers driving `tick_at()`.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
