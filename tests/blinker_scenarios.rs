//! Timing scenarios for blinkers, driven by a manual clock.

use std::time::Duration;
use tickwise::blinker::{Blinker, BlinkerState, Side, SideBlinkers};
use tickwise::core::ManualClock;

const POLL: Duration = Duration::from_millis(50);

#[test]
fn blink1_quarter_duty_cycle() {
    let clock = ManualClock::new();
    let mut blinker = Blinker::new(clock.shared()).unwrap();
    blinker.blink1(Duration::from_secs(1), 0.25, true).unwrap();

    for tick in 0..100u64 {
        let elapsed_ms = tick * 50;
        blinker.track().unwrap();
        let expected_on = elapsed_ms % 1_000 < 250;
        assert_eq!(
            blinker.is_on(),
            expected_on,
            "tick at {elapsed_ms}ms in state {}",
            blinker.state()
        );
        clock.advance(POLL);
    }
}

#[test]
fn blink3_lands_off_after_total_duration() {
    let clock = ManualClock::new();
    let mut blinker = Blinker::new(clock.shared()).unwrap();
    blinker
        .blink3(Duration::from_secs(6), 3, 0.5, true, true)
        .unwrap();

    let mut lit_ms = 0;
    for tick in 0..120u64 {
        let elapsed_ms = tick * 50;
        blinker.track().unwrap();
        if elapsed_ms < 6_000 {
            let expected_on = (elapsed_ms / 1_000) % 2 == 0;
            assert_eq!(blinker.is_on(), expected_on, "tick at {elapsed_ms}ms");
            if expected_on {
                lit_ms += 50;
            }
        } else if elapsed_ms > 6_000 {
            assert_eq!(blinker.state(), BlinkerState::Off, "tick at {elapsed_ms}ms");
        }
        clock.advance(POLL);
    }
    assert_eq!(lit_ms, 3_000);
}

#[test]
fn side_blinkers_reciprocal_turn_on() {
    let clock = ManualClock::new();
    let mut blinkers = SideBlinkers::new(clock.shared()).unwrap();
    blinkers.turn_on1(Side::LeftReciprocal).unwrap();

    assert!(blinkers.left().is_on());
    assert!(!blinkers.right().is_on());
    assert_eq!(blinkers.left().state(), BlinkerState::On);
    assert_eq!(blinkers.right().state(), BlinkerState::Off);
}

#[test]
fn blinker_history_records_the_pattern() {
    let clock = ManualClock::new();
    let mut blinker = Blinker::new(clock.shared()).unwrap();
    blinker.blink1(Duration::from_millis(200), 0.5, true).unwrap();
    for _ in 0..4 {
        clock.advance(Duration::from_millis(100));
        blinker.track().unwrap();
    }

    let path = blinker.machine().history().get_path();
    assert_eq!(
        path,
        vec!["off", "blink_begin", "blink_on", "blink_off", "blink_on", "blink_off", "blink_on"]
    );
}

#[test]
fn bounded_blink_deadline_cuts_a_phase_short() {
    let clock = ManualClock::new();
    let mut blinker = Blinker::new(clock.shared()).unwrap();
    blinker
        .blink2(
            Duration::from_millis(1_250),
            Duration::from_secs(1),
            0.5,
            true,
            true,
        )
        .unwrap();

    for tick in 0..40u64 {
        let elapsed_ms = tick * 50;
        blinker.track().unwrap();
        let expected = match elapsed_ms {
            0..=499 | 1_000..=1_249 => BlinkerState::BlinkStopOn,
            500..=999 => BlinkerState::BlinkStopOff,
            1_250 => BlinkerState::BlinkStopEnd,
            _ => BlinkerState::Off,
        };
        assert_eq!(blinker.state(), expected, "tick at {elapsed_ms}ms");
        clock.advance(POLL);
    }
}
