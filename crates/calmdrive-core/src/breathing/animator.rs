//! Frame-driven phase progress.
//!
//! The animator is fed once per rendered frame. Progress accrues from the
//! delta between consecutive active frames, so a pause simply stops the
//! deltas and the next active frame continues from the held value.
//!
//! ```text
//! frame(t0, inhale) -> 0.0
//! frame(t0 + D/2)   -> 0.5
//! frame(.., paused) -> 0.5   (held)
//! frame(t0 + D)     -> 1.0   (clamped)
//! frame(.., exhale) -> 0.0   (identity changed: reset once)
//! ```

use serde::{Deserialize, Serialize};

use super::phase::BreathingPhase;

/// Identity of a phase occurrence. Two inhales in different cycles differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseKey {
    pub cycle: u64,
    pub phase: BreathingPhase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub is_active: bool,
    pub is_paused: bool,
    pub key: PhaseKey,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseAnimator {
    key: Option<PhaseKey>,
    elapsed_ms: u64,
    progress: f64,
    /// Timestamp of the previous frame that accrued time. `None` while held.
    last_frame_ms: Option<u64>,
    resets: u64,
}

impl PhaseAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 0.0 ..= 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn key(&self) -> Option<PhaseKey> {
        self.key
    }

    /// How many times progress was reset by a phase change.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Process one animation frame and return the progress to render.
    pub fn frame(&mut self, now_ms: u64, input: FrameInput) -> f64 {
        if self.key != Some(input.key) {
            self.key = Some(input.key);
            self.elapsed_ms = 0;
            self.progress = 0.0;
            self.resets += 1;
            // The new phase starts on this frame.
            self.last_frame_ms = (input.is_active && !input.is_paused).then_some(now_ms);
            return self.progress;
        }

        if !input.is_active || input.is_paused {
            self.last_frame_ms = None;
            return self.progress;
        }

        if let Some(last) = self.last_frame_ms {
            self.elapsed_ms = self
                .elapsed_ms
                .saturating_add(now_ms.saturating_sub(last));
        }
        self.last_frame_ms = Some(now_ms);

        self.progress = if input.duration_ms == 0 {
            1.0
        } else {
            (self.elapsed_ms as f64 / input.duration_ms as f64).min(1.0)
        };
        self.progress
    }

    /// Forget the current phase entirely (new session).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
