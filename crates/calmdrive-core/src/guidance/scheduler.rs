//! Voice-guidance scheduler.
//!
//! Pending cues sit in a min-heap ordered by fire time. Each schedule is
//! stamped with a generation number; cancelling bumps the generation, and
//! entries carrying an old generation are discarded when they surface.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Scheduled -> Playing -> Idle   (stop, or last clip finished)
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::cue::GuidanceCue;
use super::player::AudioPlayer;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceState {
    Idle,
    Scheduled,
    Playing,
}

#[derive(Debug, Clone)]
struct PendingCue {
    fire_at_ms: u64,
    /// Insertion order; breaks ties between equal fire times.
    seq: u64,
    generation: u64,
    cue: GuidanceCue,
}

impl PartialEq for PendingCue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingCue {}

impl PartialOrd for PendingCue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingCue {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.fire_at_ms, self.seq).cmp(&(other.fire_at_ms, other.seq))
    }
}

pub struct GuidanceScheduler<P: AudioPlayer> {
    player: P,
    state: GuidanceState,
    enabled: bool,
    pending: BinaryHeap<Reverse<PendingCue>>,
    generation: u64,
    next_seq: u64,
    current: Option<String>,
}

impl<P: AudioPlayer> GuidanceScheduler<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            state: GuidanceState::Idle,
            enabled: true,
            pending: BinaryHeap::new(),
            generation: 0,
            next_seq: 0,
            current: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> GuidanceState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cues of the current schedule that have not fired yet.
    pub fn pending_count(&self) -> usize {
        self.pending
            .iter()
            .filter(|Reverse(p)| p.generation == self.generation)
            .count()
    }

    /// Clip most recently started, while it is considered playing.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace any existing schedule with `cues`, offsets relative to `now_ms`.
    ///
    /// Returns the number of cues scheduled (0 when guidance is disabled).
    pub fn start(&mut self, cues: &[GuidanceCue], now_ms: u64) -> usize {
        self.stop();

        if !self.enabled || cues.is_empty() {
            return 0;
        }

        for cue in cues {
            self.pending.push(Reverse(PendingCue {
                fire_at_ms: now_ms.saturating_add(cue.offset_ms()),
                seq: self.next_seq,
                generation: self.generation,
                cue: cue.clone(),
            }));
            self.next_seq += 1;
        }
        self.state = GuidanceState::Scheduled;
        tracing::debug!(
            count = cues.len(),
            generation = self.generation,
            "guidance scheduled"
        );
        cues.len()
    }

    /// Cancel pending cues and silence the player. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state != GuidanceState::Idle {
            self.generation += 1;
            tracing::debug!(generation = self.generation, "guidance cancelled");
        }
        self.pending.clear();
        self.player.stop();
        self.player.rewind();
        self.current = None;
        self.state = GuidanceState::Idle;
    }

    /// Disabling guidance mid-session stops it.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    /// Fire every cue due at `now_ms`, in fire-time order.
    pub fn tick_at(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state == GuidanceState::Idle {
            return events;
        }

        while let Some(Reverse(next)) = self.pending.peek() {
            if next.generation != self.generation {
                self.pending.pop();
                continue;
            }
            if next.fire_at_ms > now_ms {
                break;
            }
            if let Some(Reverse(due)) = self.pending.pop() {
                events.push(self.fire(due.cue));
            }
        }

        if self.pending_count() == 0 && !self.player.is_playing() {
            self.current = None;
            self.state = GuidanceState::Idle;
            tracing::debug!("guidance finished");
            events.push(Event::GuidanceFinished { at: Utc::now() });
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn fire(&mut self, cue: GuidanceCue) -> Event {
        // Interrupt whatever is still speaking.
        self.player.stop();
        self.player.rewind();

        let started = self
            .player
            .load(&cue.audio_ref)
            .and_then(|_| self.player.play());

        match started {
            Ok(()) => {
                tracing::info!(audio_ref = %cue.audio_ref, "guidance cue playing");
                self.current = Some(cue.audio_ref.clone());
                self.state = GuidanceState::Playing;
                Event::CuePlayed {
                    audio_ref: cue.audio_ref,
                    offset_secs: cue.offset_seconds,
                    at: Utc::now(),
                }
            }
            Err(e) => {
                tracing::warn!(audio_ref = %cue.audio_ref, error = %e, "guidance cue failed to play");
                self.current = None;
                self.state = GuidanceState::Scheduled;
                Event::CueFailed {
                    audio_ref: cue.audio_ref,
                    reason: e.to_string(),
                    at: Utc::now(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::RecordingPlayer;

    fn cues(pairs: &[(&str, f64)]) -> Vec<GuidanceCue> {
        pairs.iter().map(|(a, o)| GuidanceCue::new(*a, *o)).collect()
    }

    #[test]
    fn fires_in_time_order_not_input_order() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        sched.start(&cues(&[("late", 10.0), ("early", 2.0), ("mid", 5.0)]), 0);

        sched.tick_at(2_000);
        sched.tick_at(5_000);
        sched.tick_at(10_000);
        assert_eq!(sched.player().plays(), ["early", "mid", "late"]);
    }

    #[test]
    fn equal_offsets_fire_in_input_order() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        sched.start(&cues(&[("x", 3.0), ("y", 3.0)]), 0);
        sched.tick_at(3_000);
        assert_eq!(sched.player().plays(), ["x", "y"]);
    }

    #[test]
    fn nothing_fires_early() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        sched.start(&cues(&[("a", 1.0)]), 500);
        assert!(sched.tick_at(1_499).is_empty());
        assert_eq!(sched.state(), GuidanceState::Scheduled);
        assert_eq!(sched.tick_at(1_500).len(), 1);
        assert_eq!(sched.state(), GuidanceState::Playing);
    }

    #[test]
    fn new_cue_interrupts_playing_clip() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        sched.start(&cues(&[("a", 0.0), ("b", 1.0)]), 0);
        sched.tick_at(0);
        assert_eq!(sched.current(), Some("a"));
        sched.tick_at(1_000);
        assert_eq!(sched.current(), Some("b"));
        assert_eq!(sched.player().stops(), 1);
    }

    #[test]
    fn playback_failure_is_not_fatal() {
        let player = RecordingPlayer::new().fail_on("broken");
        let mut sched = GuidanceScheduler::new(player);
        sched.start(&cues(&[("broken", 0.0), ("ok", 1.0)]), 0);

        let events = sched.tick_at(0);
        assert!(matches!(events[0], Event::CueFailed { .. }));
        assert_eq!(sched.state(), GuidanceState::Scheduled);

        let events = sched.tick_at(1_000);
        assert!(matches!(events[0], Event::CuePlayed { .. }));
        assert_eq!(sched.player().plays(), ["ok"]);
    }

    #[test]
    fn natural_completion_returns_to_idle() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        sched.start(&cues(&[("a", 0.0)]), 0);
        sched.tick_at(0);
        assert_eq!(sched.state(), GuidanceState::Playing);

        // Still speaking.
        assert!(sched.tick_at(100).is_empty());
        sched.player_mut().finish();
        let events = sched.tick_at(200);
        assert!(matches!(events.as_slice(), [Event::GuidanceFinished { .. }]));
        assert_eq!(sched.state(), GuidanceState::Idle);
    }

    #[test]
    fn stop_cancels_by_generation() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        sched.start(&cues(&[("a", 1.0)]), 0);
        let generation = sched.generation();
        sched.stop();
        assert_eq!(sched.generation(), generation + 1);
        assert_eq!(sched.pending_count(), 0);
        assert!(sched.pending.is_empty());
        assert!(sched.tick_at(60_000).is_empty());
        assert!(sched.player().plays().is_empty());
    }

    #[test]
    fn restart_discards_previous_schedule() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        sched.start(&cues(&[("old", 5.0)]), 0);
        sched.start(&cues(&[("new", 5.0)]), 1_000);
        sched.tick_at(10_000);
        assert_eq!(sched.player().plays(), ["new"]);
    }

    #[test]
    fn disabling_stops_and_blocks_new_schedules() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        sched.start(&cues(&[("a", 0.0), ("b", 1.0)]), 0);
        sched.tick_at(0);
        sched.set_enabled(false);
        assert_eq!(sched.state(), GuidanceState::Idle);
        assert!(!sched.player().is_playing());

        assert_eq!(sched.start(&cues(&[("c", 0.0)]), 2_000), 0);
        sched.tick_at(5_000);
        assert_eq!(sched.player().plays(), ["a"]);
    }

    #[test]
    fn empty_cue_list_stays_idle() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        assert_eq!(sched.start(&[], 0), 0);
        assert_eq!(sched.state(), GuidanceState::Idle);
    }

    #[test]
    fn infinite_offset_never_fires() {
        let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
        sched.start(&cues(&[("now", 0.0), ("never", f64::INFINITY)]), 1_000);
        sched.tick_at(1_000);
        sched.tick_at(u64::MAX - 1);
        assert_eq!(sched.player().plays(), ["now"]);
        assert_eq!(sched.pending_count(), 1);
    }
}
