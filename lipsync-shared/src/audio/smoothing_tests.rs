// SPDX-License-Identifier: GPL-3.0-only
use super::{Rejection, TemporalSmoother, TickOutcome, TimingState};
use crate::config::SmootherConfig;
use crate::models::viseme::Viseme;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_same_label_accumulates_without_history() {
    let mut smoother = TemporalSmoother::default();
    for i in 0..10 {
        let now = f64::from(i) * 0.016;
        assert_eq!(smoother.tick(Viseme::Silence, now), Viseme::Silence);
    }
    assert!(approx(smoother.state().elapsed_in_label, 0.16));
    assert!(smoother.history().is_empty());
}

#[test]
fn test_first_transition_is_not_blocked_by_cooldown() {
    let mut smoother = TemporalSmoother::default();
    assert_eq!(smoother.state().last_transition_time, None);
    assert_eq!(smoother.tick(Viseme::I, 0.0), Viseme::I);
    assert_eq!(smoother.history().len(), 1);
    assert_eq!(smoother.history().last_viseme(), Viseme::Silence);
    assert_eq!(smoother.state().last_transition_time, Some(0.0));
}

#[test]
fn test_reset_clears_cooldown_anchor() {
    let mut smoother = TemporalSmoother::default();
    smoother.tick(Viseme::I, 0.0);

    // Straight after a reset the cooldown has nothing to measure from
    smoother.reset();
    assert_eq!(smoother.state().last_transition_time, None);
    assert_eq!(
        smoother.step(Viseme::O, 0.01, 0.016),
        TickOutcome::Transitioned {
            from: Viseme::Silence,
            to: Viseme::M
        }
    );
}

#[test]
fn test_cooldown_holds_first_post_change_label() {
    let mut smoother = TemporalSmoother::default();
    // silence -> a right away is rewritten to m
    let first = smoother.tick(Viseme::A, 0.0);
    assert_eq!(first, Viseme::M);

    assert_eq!(
        smoother.step(Viseme::E, 0.02, 0.016),
        TickOutcome::Rejected(Rejection::Cooldown)
    );
    assert_eq!(smoother.current(), first);
    assert!(approx(smoother.state().elapsed_in_label, 0.016));
}

#[test]
fn test_cooldown_applies_to_silence_transitions() {
    let mut smoother = TemporalSmoother::default();
    smoother.tick(Viseme::I, 0.0);
    assert_eq!(smoother.tick(Viseme::Silence, 0.03), Viseme::I);
    assert_eq!(smoother.tick(Viseme::Silence, 0.05), Viseme::Silence);
}

#[test]
fn test_minimum_duration_between_non_silence_labels() {
    let mut smoother = TemporalSmoother::default();
    assert_eq!(smoother.tick(Viseme::I, 0.0), Viseme::I);
    smoother.tick_with_delta(Viseme::I, 0.02, 0.05);
    assert!(approx(smoother.state().elapsed_in_label, 0.05));

    assert_eq!(
        smoother.step(Viseme::E, 0.2, 0.016),
        TickOutcome::Rejected(Rejection::MinimumDuration)
    );
    assert_eq!(smoother.current(), Viseme::I);

    smoother.tick_with_delta(Viseme::I, 0.25, 0.024);
    assert!(approx(smoother.state().elapsed_in_label, 0.09));

    assert_eq!(
        smoother.step(Viseme::E, 0.3, 0.016),
        TickOutcome::Transitioned {
            from: Viseme::I,
            to: Viseme::E
        }
    );
    let last = smoother.history().last().copied().unwrap();
    assert_eq!(last.viseme, Viseme::I);
    assert!(approx(last.duration, 0.09));
    assert!(approx(last.timestamp, 0.21));
    assert_eq!(
        *smoother.state(),
        TimingState {
            current: Viseme::E,
            elapsed_in_label: 0.0,
            last_transition_time: Some(0.3),
        }
    );
}

#[test]
fn test_silence_is_exempt_from_minimum_duration() {
    let mut smoother = TemporalSmoother::default();
    smoother.tick_with_delta(Viseme::Silence, 0.1, 0.07);
    // Held 0.07 < 0.08 but leaving silence is always allowed.
    assert_eq!(smoother.tick(Viseme::A, 0.2), Viseme::A);

    smoother.tick_with_delta(Viseme::A, 0.22, 0.01);
    assert_eq!(smoother.tick(Viseme::Silence, 0.26), Viseme::Silence);
}

#[test]
fn test_history_is_bounded_and_evicts_oldest() {
    let mut smoother = TemporalSmoother::default();
    for k in 0..100 {
        let now = f64::from(k) * 0.1;
        let raw = if k % 2 == 0 { Viseme::I } else { Viseme::Silence };
        smoother.tick(raw, now);
        assert!(smoother.history().len() <= 30);
    }
    assert_eq!(smoother.history().len(), 30);
    let first = smoother.history().iter().next().copied().unwrap();
    assert!(approx(first.timestamp, 7.0));
    assert_eq!(first.viseme, Viseme::Silence);
}

#[test]
fn test_remap_table() {
    let smoother = TemporalSmoother::default();
    let cases = [
        (Viseme::Silence, Viseme::A, 0.0, Viseme::M),
        (Viseme::Silence, Viseme::E, 0.01, Viseme::Ch),
        (Viseme::Silence, Viseme::I, 0.01, Viseme::I),
        (Viseme::Silence, Viseme::O, 0.05, Viseme::M),
        (Viseme::Silence, Viseme::U, 0.05, Viseme::M),
        (Viseme::A, Viseme::I, 0.05, Viseme::E),
        (Viseme::I, Viseme::A, 0.05, Viseme::E),
        (Viseme::O, Viseme::U, 0.05, Viseme::O),
        (Viseme::U, Viseme::O, 0.05, Viseme::U),
        (Viseme::A, Viseme::E, 0.02, Viseme::A),
        (Viseme::A, Viseme::E, 0.04, Viseme::E),
        (Viseme::E, Viseme::A, 0.02, Viseme::E),
        (Viseme::E, Viseme::A, 0.04, Viseme::A),
        (Viseme::R, Viseme::L, 0.0, Viseme::L),
        (Viseme::Silence, Viseme::A, 0.06, Viseme::A),
        (Viseme::A, Viseme::I, 0.2, Viseme::I),
    ];
    for (from, to, held, expected) in cases {
        assert_eq!(
            smoother.remap(from, to, held),
            expected,
            "{from}_{to} held {held}"
        );
    }
}

#[test]
fn test_reset_restores_initial_state() {
    let mut smoother = TemporalSmoother::default();
    smoother.tick(Viseme::I, 0.0);
    smoother.tick(Viseme::Silence, 0.5);
    assert_eq!(smoother.history().len(), 2);

    smoother.reset();
    assert_eq!(*smoother.state(), TimingState::default());
    assert!(smoother.history().is_empty());
    assert_eq!(smoother.tick(Viseme::I, 0.0), Viseme::I);
}

#[test]
fn test_custom_config_is_honoured() {
    let config = SmootherConfig {
        transition_cooldown: 0.2,
        history_capacity: 2,
        ..SmootherConfig::default()
    };
    let mut smoother = TemporalSmoother::new(config);
    smoother.tick(Viseme::I, 0.0);
    assert_eq!(smoother.tick(Viseme::Silence, 0.1), Viseme::I);
    assert_eq!(smoother.tick(Viseme::Silence, 0.3), Viseme::Silence);
    smoother.tick(Viseme::I, 0.6);
    assert_eq!(smoother.history().len(), 2);
}
