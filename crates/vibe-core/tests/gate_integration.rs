//! Integration tests for the session window gate.
//!
//! These cover the full 30 minute feed window tick by tick, plus
//! property checks over arbitrary durations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use vibe_core::gate::{format_clock, SessionWindowGate, WindowState};
use vibe_core::{Event, GateError};

fn counting_gate(total: u64, threshold: u64) -> (SessionWindowGate, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let gate = SessionWindowGate::with_threshold(total, threshold, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .expect("valid duration");
    (gate, fired)
}

#[test]
fn test_feed_window_warning_latch() {
    let (mut gate, _) = counting_gate(1800, 60);
    for tick in 1..=1800u64 {
        gate.tick();
        if tick < 1740 {
            assert!(!gate.is_warning(), "warning too early at tick {tick}");
        } else {
            assert!(gate.is_warning(), "warning missing at tick {tick}");
        }
    }
}

#[test]
fn test_feed_window_expiry_scenario() {
    let (mut gate, fired) = counting_gate(1800, 60);
    for _ in 0..1799 {
        gate.tick();
    }
    assert!(gate.is_warning());
    assert!(!gate.is_expired());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(gate.formatted_remaining(), "0:01");

    let event = gate.tick();
    assert!(matches!(event, Some(Event::WindowExpired { elapsed_secs: 1800, .. })));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(gate.progress_ratio(), 1.0);
    assert_eq!(gate.formatted_time(), "30:00");
    assert_eq!(gate.window().state(), WindowState::Expired);
}

#[test]
fn test_formatted_time_examples() {
    let (mut gate, _) = counting_gate(1800, 60);
    let mut seen = Vec::new();
    for tick in 1..=1800u64 {
        gate.tick();
        if matches!(tick, 5 | 65 | 1800) {
            seen.push(gate.formatted_time());
        }
    }
    assert_eq!(seen, vec!["0:05", "1:05", "30:00"]);
    assert_eq!(format_clock(90), "1:30");
}

#[test]
fn test_zero_duration_rejected() {
    let err = SessionWindowGate::new(0, || panic!("must not fire")).unwrap_err();
    assert!(matches!(err, GateError::InvalidConfiguration { total_duration_secs: 0, .. }));
}

proptest! {
    #[test]
    fn expiry_fires_exactly_once(total in 1u64..2_000, extra in 0u64..50) {
        let (mut gate, fired) = counting_gate(total, 60);
        for _ in 0..total {
            gate.tick();
        }
        prop_assert_eq!(fired.load(Ordering::SeqCst), 1);
        for _ in 0..extra {
            prop_assert!(gate.tick().is_none());
        }
        prop_assert_eq!(fired.load(Ordering::SeqCst), 1);
        prop_assert_eq!(gate.elapsed_secs(), total);
    }

    #[test]
    fn progress_is_monotonic_and_bounded(total in 1u64..1_000, threshold in 0u64..120) {
        let (mut gate, _) = counting_gate(total, threshold);
        let mut last = gate.progress_ratio();
        prop_assert_eq!(last, 0.0);
        for _ in 0..total + 5 {
            gate.tick();
            let ratio = gate.progress_ratio();
            prop_assert!(ratio >= last);
            prop_assert!((0.0..=1.0).contains(&ratio));
            last = ratio;
        }
        prop_assert_eq!(last, 1.0);
    }

    #[test]
    fn warning_latch_never_clears(total in 1u64..1_000, threshold in 0u64..120) {
        let (mut gate, _) = counting_gate(total, threshold);
        let mut latched = gate.is_warning();
        let mut warning_events = 0;
        for _ in 0..total {
            if let Some(Event::WarningEntered { .. }) = gate.tick() {
                warning_events += 1;
            }
            if latched {
                prop_assert!(gate.is_warning());
            }
            latched = gate.is_warning();
            prop_assert!(gate.elapsed_secs() <= gate.total_secs());
        }
        prop_assert!(warning_events <= 1);
    }
}
