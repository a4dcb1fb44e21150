use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::breathing::BreathingPhase;
use crate::session::SessionState;

/// Every state change in the system produces an Event.
/// The shell renders them; the session log consumes completion events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        exercise_id: String,
        duration_secs: u64,
        cue_count: usize,
        at: DateTime<Utc>,
    },
    SessionPaused {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        phase: BreathingPhase,
        cycle: u64,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    CuePlayed {
        audio_ref: String,
        offset_secs: f64,
        at: DateTime<Utc>,
    },
    /// A cue fired but its clip could not be played. Later cues still run.
    CueFailed {
        audio_ref: String,
        reason: String,
        at: DateTime<Utc>,
    },
    /// All cues fired and the last clip finished.
    GuidanceFinished {
        at: DateTime<Utc>,
    },
    SessionCompleted {
        exercise_id: String,
        elapsed_ms: u64,
        cycles: u64,
        at: DateTime<Utc>,
    },
    SessionStopped {
        exercise_id: String,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    DrivingStateChanged {
        is_driving: bool,
        velocity: f64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        exercise_id: String,
        phase: BreathingPhase,
        progress: f64,
        cycle: u64,
        elapsed_ms: u64,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
}
