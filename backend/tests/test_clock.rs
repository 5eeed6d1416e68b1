//! Simulated clock tests
//!
//! Timers in the office are absolute millisecond deadlines, so the clock has
//! to count ticks and milliseconds independently and never go backwards.

use virtual_office_core::orchestrator::MeetingPhase;
use virtual_office_core::{Notice, OfficeConfig, OfficeEngine, SimClock};

#[test]
fn test_clock_starts_at_zero() {
    let clock = SimClock::new();
    assert_eq!(clock.current_tick(), 0);
    assert_eq!(clock.now_ms(), 0);
}

#[test]
fn test_variable_frame_lengths_accumulate() {
    let mut clock = SimClock::new();
    for dt in [16, 17, 16, 33, 0] {
        clock.advance(dt);
    }
    assert_eq!(clock.current_tick(), 5);
    assert_eq!(clock.now_ms(), 82);
}

#[test]
fn test_deadline_is_due_exactly_at_its_time() {
    let mut clock = SimClock::new();
    let deadline = clock.deadline_after(600);

    clock.advance(599);
    assert!(!clock.is_due(deadline));

    clock.advance(1);
    assert!(clock.is_due(deadline));
}

#[test]
fn test_deadline_saturates_instead_of_overflowing() {
    let mut clock = SimClock::new();
    clock.advance(u64::MAX - 10);
    assert_eq!(clock.deadline_after(100), u64::MAX);
    clock.advance(100);
    assert_eq!(clock.now_ms(), u64::MAX);
}

#[test]
fn test_engine_tick_drives_clock() {
    let mut engine = OfficeEngine::new(OfficeConfig::default()).unwrap();
    for _ in 0..10 {
        engine.tick(16);
    }
    assert_eq!(engine.current_tick(), 10);
    assert_eq!(engine.now_ms(), 160);
}

#[test]
fn test_phase_timers_follow_elapsed_ms_not_tick_count() {
    let mut engine = OfficeEngine::new(OfficeConfig::default()).unwrap();
    engine.submit_notice(Notice::new("n1", "emergency meeting", "drill"));

    // Many short ticks: still fading in below 600 ms
    for _ in 0..100 {
        engine.tick(5);
    }
    assert_eq!(engine.phase(), MeetingPhase::FadingIn);

    // One long tick crosses the deadline
    engine.tick(100);
    assert_ne!(engine.phase(), MeetingPhase::FadingIn);
}
