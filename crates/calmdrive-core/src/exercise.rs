//! Built-in breathing exercises and deep-link selection.
//!
//! The installable app exposes shortcuts such as `/?exercise=quick-calm`;
//! the `exercise` query parameter picks the starting exercise.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::breathing::PhaseDurations;
use crate::guidance::GuidanceCue;
use crate::session::SessionConfig;

pub const DEFAULT_EXERCISE_ID: &str = "quick-calm";

const LINK_BASE: &str = "https://calmdrive.local/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub label: String,
    pub description: String,
    pub phases: PhaseDurations,
    pub duration_secs: u64,
    /// Guidance clips as storage paths in the audio bucket.
    pub cues: Vec<GuidanceCue>,
}

impl Exercise {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            exercise_id: self.id.clone(),
            duration_secs: self.duration_secs,
            phase_durations: self.phases,
        }
    }

    /// Full breathing cycles that fit in the session.
    pub fn cycles(&self) -> u64 {
        let cycle_ms = self.phases.cycle_ms();
        if cycle_ms == 0 {
            return 0;
        }
        self.duration_secs.saturating_mul(1000) / cycle_ms
    }
}

pub fn builtin_exercises() -> Vec<Exercise> {
    vec![
        Exercise {
            id: "quick-calm".into(),
            label: "Quick Calm".into(),
            description: "Two minutes of lengthened exhales to settle at a red light.".into(),
            phases: PhaseDurations::from_secs(4, 2, 6),
            duration_secs: 120,
            cues: vec![
                GuidanceCue::new("/guidance/quick-calm/intro.mp3", 0.0),
                GuidanceCue::new("/guidance/quick-calm/midpoint.mp3", 60.0),
                GuidanceCue::new("/guidance/quick-calm/outro.mp3", 110.0),
            ],
        },
        Exercise {
            id: "deep-focus".into(),
            label: "Deep Focus".into(),
            description: "Five minutes of box breathing before a long drive.".into(),
            phases: PhaseDurations::from_secs(4, 4, 4),
            duration_secs: 300,
            cues: vec![
                GuidanceCue::new("/guidance/deep-focus/intro.mp3", 0.0),
                GuidanceCue::new("/guidance/deep-focus/settle.mp3", 90.0),
                GuidanceCue::new("/guidance/deep-focus/refocus.mp3", 180.0),
                GuidanceCue::new("/guidance/deep-focus/outro.mp3", 285.0),
            ],
        },
        Exercise {
            id: "wind-down".into(),
            label: "Wind Down".into(),
            description: "4-7-8 breathing for the parked car after a stressful commute.".into(),
            phases: PhaseDurations::from_secs(4, 7, 8),
            duration_secs: 190,
            cues: vec![
                GuidanceCue::new("/guidance/wind-down/intro.mp3", 0.0),
                GuidanceCue::new("/guidance/wind-down/outro.mp3", 171.0),
            ],
        },
    ]
}

pub fn find_exercise(id: &str) -> Option<Exercise> {
    builtin_exercises().into_iter().find(|e| e.id == id)
}

/// Exercise selected by a deep link, relative (`/?exercise=deep-focus`) or absolute.
///
/// Unknown ids and links without the parameter yield `None`.
pub fn exercise_from_deep_link(link: &str) -> Option<Exercise> {
    let base = Url::parse(LINK_BASE).ok()?;
    let url = Url::options().base_url(Some(&base)).parse(link).ok()?;
    let id = url
        .query_pairs()
        .find(|(key, _)| key == "exercise")
        .map(|(_, value)| value.into_owned())?;
    let found = find_exercise(&id);
    if found.is_none() {
        tracing::debug!(id, "deep link names an unknown exercise");
    }
    found
}
