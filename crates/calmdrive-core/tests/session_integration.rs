//! Integration tests for the breathing session engine.
//!
//! These tests drive a full session with simulated time and verify the
//! phase animation and guidance guarantees end to end.

use calmdrive_core::breathing::PhaseDurations;
use calmdrive_core::guidance::{GuidanceCue, GuidanceScheduler, GuidanceState, RecordingPlayer};
use calmdrive_core::session::{BreathingSession, SessionConfig, SessionState};
use calmdrive_core::{find_exercise, BreathingPhase, Event};

fn config(inhale: u64, hold: u64, exhale: u64, duration_secs: u64) -> SessionConfig {
    SessionConfig {
        exercise_id: "test".into(),
        duration_secs,
        phase_durations: PhaseDurations::from_secs(inhale, hold, exhale),
    }
}

#[test]
fn test_progress_reaches_one_exactly_once_per_phase() {
    let mut session = BreathingSession::new(RecordingPlayer::new());
    session.start(config(4, 2, 4, 600), &[], 0).unwrap();

    let mut inhale_progress = vec![session.progress()];
    let mut changed_to = None;
    let mut t = 0;
    while changed_to.is_none() {
        t += 50;
        for event in session.tick_at(t) {
            if let Event::PhaseChanged { phase, .. } = event {
                changed_to = Some(phase);
            }
        }
        if changed_to.is_none() {
            inhale_progress.push(session.progress());
        }
    }

    assert_eq!(changed_to, Some(BreathingPhase::Hold));
    assert_eq!(inhale_progress.first(), Some(&0.0));
    assert!(inhale_progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(inhale_progress.iter().filter(|&&p| p == 1.0).count(), 1);
    // The transition frame starts the next phase at zero.
    assert_eq!(session.progress(), 0.0);
}

#[test]
fn test_phase_sequence_over_two_cycles() {
    let mut session = BreathingSession::new(RecordingPlayer::new());
    session.start(config(1, 1, 1, 600), &[], 0).unwrap();

    let mut phases = Vec::new();
    for t in (10..=6_200).step_by(10) {
        for event in session.tick_at(t) {
            if let Event::PhaseChanged { phase, cycle, .. } = event {
                phases.push((phase, cycle));
            }
        }
    }
    assert_eq!(
        &phases[..5],
        &[
            (BreathingPhase::Hold, 0),
            (BreathingPhase::Exhale, 0),
            (BreathingPhase::Inhale, 1),
            (BreathingPhase::Hold, 1),
            (BreathingPhase::Exhale, 1),
        ]
    );
}

#[test]
fn test_guidance_plays_a_then_b() {
    let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
    sched.start(
        &[GuidanceCue::new("a", 0.0), GuidanceCue::new("b", 5.0)],
        1_000,
    );

    for t in (1_000..=6_000).step_by(250) {
        sched.tick_at(t);
    }
    assert_eq!(sched.player().plays(), ["a", "b"]);

    // Nothing beyond the scheduled count, however long we wait.
    sched.tick_at(120_000);
    assert_eq!(sched.player().plays().len(), 2);
}

#[test]
fn test_stop_before_first_cue_means_no_playback() {
    let mut sched = GuidanceScheduler::new(RecordingPlayer::new());
    sched.start(
        &[GuidanceCue::new("a", 1.0), GuidanceCue::new("b", 5.0)],
        0,
    );
    sched.stop();
    for t in (0..=10_000).step_by(500) {
        assert!(sched.tick_at(t).is_empty());
    }
    assert!(sched.player().plays().is_empty());
}

#[test]
fn test_stop_twice_equals_stop_once() {
    let mut once = GuidanceScheduler::new(RecordingPlayer::new());
    let mut twice = GuidanceScheduler::new(RecordingPlayer::new());
    let cues = [GuidanceCue::new("a", 0.0), GuidanceCue::new("b", 3.0)];
    for sched in [&mut once, &mut twice] {
        sched.start(&cues, 0);
        sched.tick_at(0);
    }

    once.stop();
    twice.stop();
    twice.stop();

    assert_eq!(once.state(), twice.state());
    assert_eq!(once.state(), GuidanceState::Idle);
    assert_eq!(once.generation(), twice.generation());
    assert_eq!(once.pending_count(), twice.pending_count());
    assert_eq!(once.current(), twice.current());
    assert_eq!(once.player().plays(), twice.player().plays());
}

#[test]
fn test_new_session_cancels_previous_guidance() {
    let mut session = BreathingSession::new(RecordingPlayer::new());
    session
        .start(config(4, 4, 4, 600), &[GuidanceCue::new("first/outro", 30.0)], 0)
        .unwrap();
    session.tick_at(10_000);

    session
        .start(config(4, 4, 4, 600), &[GuidanceCue::new("second/intro", 0.0)], 10_000)
        .unwrap();
    for t in (10_000..=60_000).step_by(100) {
        session.tick_at(t);
    }
    assert_eq!(session.guidance().player().plays(), ["second/intro"]);
}

#[test]
fn test_disabling_guidance_mid_session() {
    let mut session = BreathingSession::new(RecordingPlayer::new());
    session
        .start(
            config(4, 4, 4, 600),
            &[GuidanceCue::new("a", 0.0), GuidanceCue::new("b", 2.0)],
            0,
        )
        .unwrap();
    session.tick_at(0);
    session.set_guidance_enabled(false);
    for t in (0..=5_000).step_by(100) {
        session.tick_at(t);
    }
    assert_eq!(session.guidance().player().plays(), ["a"]);
    assert_eq!(session.state(), SessionState::Running);
}

#[test]
fn test_builtin_exercise_runs_to_completion() {
    let exercise = find_exercise("quick-calm").unwrap();
    let mut session = BreathingSession::new(RecordingPlayer::new());
    session
        .start(exercise.session_config(), &exercise.cues, 0)
        .unwrap();

    let mut completed = None;
    let mut t = 0;
    while completed.is_none() && t <= 200_000 {
        t += 100;
        for event in session.tick_at(t) {
            if let Event::SessionCompleted { cycles, .. } = event {
                completed = Some(cycles);
            }
        }
    }

    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(t, 120_000);
    assert!(completed.unwrap() >= 9);
    assert_eq!(session.guidance().player().plays().len(), exercise.cues.len());
}
