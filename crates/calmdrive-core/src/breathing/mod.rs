mod animator;
mod phase;

pub use animator::{FrameInput, PhaseAnimator, PhaseKey};
pub use phase::{BreathingPhase, PhaseCycle, PhaseDurations};
