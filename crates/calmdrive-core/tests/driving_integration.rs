//! Integration tests for driving detection and the restriction policy.

use calmdrive_core::driving::{
    should_restrict, DrivingMonitor, DrivingState, InteractionKind, RestrictionPolicy,
    ScriptedTelemetry, SimulatedTelemetry, DRIVING_THRESHOLD_KMH,
};
use calmdrive_core::Event;
use proptest::prelude::*;

fn kind() -> impl Strategy<Value = InteractionKind> {
    prop_oneof![
        Just(InteractionKind::Complex),
        Just(InteractionKind::Basic),
        Just(InteractionKind::Essential),
    ]
}

proptest! {
    #[test]
    fn essential_is_never_restricted(v in 0.0f64..500.0, is_driving in any::<bool>()) {
        let state = DrivingState { velocity: v, is_driving };
        prop_assert!(!should_restrict(&state, InteractionKind::Essential));
    }

    #[test]
    fn basic_restricted_above_twenty(v in 20.0001f64..500.0) {
        let state = DrivingState::from_velocity(v, DRIVING_THRESHOLD_KMH);
        prop_assert!(should_restrict(&state, InteractionKind::Basic));
    }

    #[test]
    fn basic_allowed_between_five_and_twenty(v in 5.0001f64..=20.0) {
        let state = DrivingState::from_velocity(v, DRIVING_THRESHOLD_KMH);
        prop_assert!(state.is_driving);
        prop_assert!(!should_restrict(&state, InteractionKind::Basic));
    }

    #[test]
    fn stationary_never_restricts(v in 0.0f64..=5.0, k in kind()) {
        let state = DrivingState::from_velocity(v, DRIVING_THRESHOLD_KMH);
        prop_assert!(!should_restrict(&state, k));
    }

    #[test]
    fn classification_matches_threshold(v in -50.0f64..200.0) {
        let state = DrivingState::from_velocity(v, DRIVING_THRESHOLD_KMH);
        prop_assert!(state.velocity >= 0.0);
        prop_assert_eq!(state.is_driving, v > DRIVING_THRESHOLD_KMH);
    }
}

#[test]
fn test_monitor_feeds_policy() {
    let policy = RestrictionPolicy::default();
    let mut monitor = DrivingMonitor::new(ScriptedTelemetry::new([0.0, 12.0, 45.0, 3.0]));

    let mut decisions = Vec::new();
    for tick in 0..4u64 {
        monitor.tick_at(tick * 10_000);
        let state = monitor.state();
        decisions.push((
            policy.should_restrict(&state, InteractionKind::Complex),
            policy.should_restrict(&state, InteractionKind::Basic),
        ));
    }
    assert_eq!(
        decisions,
        [(false, false), (true, false), (true, true), (false, false)]
    );
}

#[test]
fn test_monitor_reports_only_transitions() {
    let mut monitor =
        DrivingMonitor::new(ScriptedTelemetry::new([0.0, 30.0, 35.0, 2.0, 1.0]));
    let events: Vec<Event> = (0..5u64)
        .filter_map(|i| monitor.tick_at(i * 10_000))
        .collect();
    let flips: Vec<bool> = events
        .iter()
        .map(|e| match e {
            Event::DrivingStateChanged { is_driving, .. } => *is_driving,
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(flips, [true, false]);
}

#[test]
fn test_simulated_feed_is_reproducible() {
    let run = |seed| {
        let mut monitor = DrivingMonitor::new(
            SimulatedTelemetry::new(Some(seed)).with_change_probability(0.3),
        );
        (0..100u64)
            .map(|i| {
                monitor.tick_at(i * 10_000);
                monitor.state().velocity
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(99), run(99));
}
