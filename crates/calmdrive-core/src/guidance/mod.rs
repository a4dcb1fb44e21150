mod cue;
mod player;
mod scheduler;

pub use cue::GuidanceCue;
pub use player::{AudioPlayer, RecordingPlayer};
pub use scheduler::{GuidanceScheduler, GuidanceState};
