//! Breathing session engine.
//!
//! Owns the phase animation and the guidance schedule of exactly one session.
//! Like the driving monitor it does not use internal threads: the caller
//! passes the current time to `tick_at()` once per rendered frame.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> (Completed | Idle on stop)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = BreathingSession::new(player);
//! session.start(exercise.session_config(), &exercise.cues, now_ms())?;
//! // Once per frame:
//! for event in session.tick_at(now_ms()) { render(event) }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::config::SessionConfig;
use crate::breathing::{BreathingPhase, FrameInput, PhaseAnimator, PhaseCycle, PhaseKey};
use crate::error::ValidationError;
use crate::events::Event;
use crate::guidance::{AudioPlayer, GuidanceCue, GuidanceScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Completed,
}

pub struct BreathingSession<P: AudioPlayer> {
    config: Option<SessionConfig>,
    state: SessionState,
    cycle: Option<PhaseCycle>,
    animator: PhaseAnimator,
    guidance: GuidanceScheduler<P>,
    /// Active (unpaused) time in this session.
    elapsed_ms: u64,
    last_tick_ms: Option<u64>,
    /// The previous frame rendered the current phase at 1.0.
    phase_complete: bool,
}

impl<P: AudioPlayer> BreathingSession<P> {
    pub fn new(player: P) -> Self {
        Self {
            config: None,
            state: SessionState::Idle,
            cycle: None,
            animator: PhaseAnimator::new(),
            guidance: GuidanceScheduler::new(player),
            elapsed_ms: 0,
            last_tick_ms: None,
            phase_complete: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    pub fn phase(&self) -> BreathingPhase {
        self.cycle
            .as_ref()
            .map(|c| c.phase())
            .unwrap_or(BreathingPhase::Inhale)
    }

    /// Completed breathing cycles.
    pub fn cycles(&self) -> u64 {
        self.cycle.as_ref().map(|c| c.cycle()).unwrap_or(0)
    }

    /// 0.0 ..= 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        self.animator.progress()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.config
            .as_ref()
            .map(|c| c.duration_ms().saturating_sub(self.elapsed_ms))
            .unwrap_or(0)
    }

    pub fn guidance(&self) -> &GuidanceScheduler<P> {
        &self.guidance
    }

    pub fn guidance_mut(&mut self) -> &mut GuidanceScheduler<P> {
        &mut self.guidance
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            exercise_id: self
                .config
                .as_ref()
                .map(|c| c.exercise_id.clone())
                .unwrap_or_default(),
            phase: self.phase(),
            progress: self.progress(),
            cycle: self.cycles(),
            elapsed_ms: self.elapsed_ms,
            remaining_ms: self.remaining_ms(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session, cancelling whatever the previous one left running.
    ///
    /// # Errors
    /// Returns an error if the config is invalid; the previous session is
    /// left untouched in that case.
    pub fn start(
        &mut self,
        config: SessionConfig,
        cues: &[GuidanceCue],
        now_ms: u64,
    ) -> Result<Vec<Event>, ValidationError> {
        config.validate()?;

        self.guidance.stop();
        self.animator.reset();

        let cycle = PhaseCycle::new(config.phase_durations);
        let phase = cycle.phase();
        let duration_ms = cycle.current_duration_ms();
        self.cycle = Some(cycle);
        self.elapsed_ms = 0;
        self.last_tick_ms = Some(now_ms);
        self.phase_complete = false;
        self.state = SessionState::Running;
        self.render_frame(now_ms);

        let cue_count = self.guidance.start(cues, now_ms);
        tracing::info!(exercise = %config.exercise_id, cue_count, "session started");

        let events = vec![
            Event::SessionStarted {
                exercise_id: config.exercise_id.clone(),
                duration_secs: config.duration_secs,
                cue_count,
                at: Utc::now(),
            },
            Event::PhaseChanged {
                phase,
                cycle: 0,
                duration_ms,
                at: Utc::now(),
            },
        ];
        self.config = Some(config);
        Ok(events)
    }

    pub fn pause(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != SessionState::Running {
            return None;
        }
        self.flush_elapsed(now_ms);
        // Accrue up to the pause, then hold.
        self.render_frame(now_ms);
        self.state = SessionState::Paused;
        self.last_tick_ms = None;
        self.render_frame(now_ms);
        Some(Event::SessionPaused {
            elapsed_ms: self.elapsed_ms,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != SessionState::Paused {
            return None;
        }
        self.state = SessionState::Running;
        self.last_tick_ms = Some(now_ms);
        self.render_frame(now_ms);
        Some(Event::SessionResumed {
            elapsed_ms: self.elapsed_ms,
            at: Utc::now(),
        })
    }

    /// Cancel guidance and animation. Safe to call repeatedly.
    pub fn stop(&mut self) -> Option<Event> {
        self.guidance.stop();
        if !matches!(self.state, SessionState::Running | SessionState::Paused) {
            return None;
        }
        self.state = SessionState::Idle;
        self.last_tick_ms = None;
        self.animator.reset();
        let exercise_id = self
            .config
            .as_ref()
            .map(|c| c.exercise_id.clone())
            .unwrap_or_default();
        tracing::info!(exercise = %exercise_id, elapsed_ms = self.elapsed_ms, "session stopped");
        Some(Event::SessionStopped {
            exercise_id,
            elapsed_ms: self.elapsed_ms,
            at: Utc::now(),
        })
    }

    pub fn set_guidance_enabled(&mut self, enabled: bool) {
        self.guidance.set_enabled(enabled);
    }

    /// Advance to `now_ms`: one animation frame plus due guidance cues.
    pub fn tick_at(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        match self.state {
            SessionState::Running => {
                self.flush_elapsed(now_ms);
                if self.phase_complete {
                    events.push(self.advance_phase());
                }
                self.render_frame(now_ms);
                events.extend(self.guidance.tick_at(now_ms));

                let done = self
                    .config
                    .as_ref()
                    .is_some_and(|c| self.elapsed_ms >= c.duration_ms());
                if done {
                    events.push(self.complete());
                }
            }
            SessionState::Paused => {
                self.render_frame(now_ms);
                events.extend(self.guidance.tick_at(now_ms));
            }
            SessionState::Idle | SessionState::Completed => {}
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn render_frame(&mut self, now_ms: u64) {
        let Some(cycle) = self.cycle.as_ref() else {
            return;
        };
        let input = FrameInput {
            is_active: matches!(self.state, SessionState::Running | SessionState::Paused),
            is_paused: self.state == SessionState::Paused,
            key: PhaseKey {
                cycle: cycle.cycle(),
                phase: cycle.phase(),
            },
            duration_ms: cycle.current_duration_ms(),
        };
        let progress = self.animator.frame(now_ms, input);
        self.phase_complete = progress >= 1.0;
    }

    fn advance_phase(&mut self) -> Event {
        self.phase_complete = false;
        let (phase, cycle, duration_ms) = match self.cycle.as_mut() {
            Some(c) => {
                let phase = c.advance();
                (phase, c.cycle(), c.current_duration_ms())
            }
            None => (BreathingPhase::Inhale, 0, 0),
        };
        tracing::debug!(%phase, cycle, "phase changed");
        Event::PhaseChanged {
            phase,
            cycle,
            duration_ms,
            at: Utc::now(),
        }
    }

    fn complete(&mut self) -> Event {
        self.guidance.stop();
        self.state = SessionState::Completed;
        self.last_tick_ms = None;
        let exercise_id = self
            .config
            .as_ref()
            .map(|c| c.exercise_id.clone())
            .unwrap_or_default();
        tracing::info!(exercise = %exercise_id, cycles = self.cycles(), "session completed");
        Event::SessionCompleted {
            exercise_id,
            elapsed_ms: self.elapsed_ms,
            cycles: self.cycles(),
            at: Utc::now(),
        }
    }

    fn flush_elapsed(&mut self, now_ms: u64) {
        if let Some(last) = self.last_tick_ms {
            self.elapsed_ms = self.elapsed_ms.saturating_add(now_ms.saturating_sub(last));
            self.last_tick_ms = Some(now_ms);
        }
    }
}
