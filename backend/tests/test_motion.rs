//! Agent motion simulator tests
//!
//! Critical invariants tested:
//! - Convergence: an agent with a fixed target ends within the arrive threshold
//! - Containment: positions never leave the walkable floor
//! - Forced precedence: a forced target beats every wander firing
//! - Throttling: notifications are spaced by more than notify_distance

use proptest::prelude::*;
use virtual_office_core::config::MotionConfig;
use virtual_office_core::motion::{MotionSimulator, PositionChanged};
use virtual_office_core::{AgentSpec, Bounds, Facing, MotionMode, Point, RngManager};

// ============================================================================
// Test Helpers
// ============================================================================

fn floor() -> Bounds {
    Bounds::floor(3000.0, 2000.0, 200.0, 200.0)
}

fn simulator() -> MotionSimulator {
    MotionSimulator::new(MotionConfig::default(), floor())
}

fn quiet(_: &str) -> bool {
    false
}

/// Run `ticks` frames of 16 ms starting after `start_tick`
fn run(sim: &mut MotionSimulator, rng: &mut RngManager, start_tick: u64, ticks: u64) -> Vec<PositionChanged> {
    let mut notes = Vec::new();
    for tick in start_tick + 1..=start_tick + ticks {
        notes.extend(sim.step(tick, tick * 16, rng, quiet).notifications);
    }
    notes
}

// ============================================================================
// Wandering
// ============================================================================

#[test]
fn test_idle_agent_picks_new_target_when_timer_fires() {
    let mut sim = simulator();
    let mut rng = RngManager::new(11);
    sim.spawn(AgentSpec::new("a1", "Bolt", "#fff").at(Point::new(1000.0, 1000.0)), 0, &mut rng)
        .unwrap();
    let fire_at = sim.agent("a1").unwrap().next_wander_ms();

    // Before the timer: standing still
    let before_ticks = fire_at / 16 - 1;
    run(&mut sim, &mut rng, 0, before_ticks);
    assert_eq!(sim.agent("a1").unwrap().position(), Point::new(1000.0, 1000.0));

    run(&mut sim, &mut rng, before_ticks, 5);
    let agent = sim.agent("a1").unwrap();
    assert_ne!(agent.target(), Point::new(1000.0, 1000.0));
    assert!(floor().contains(agent.target()));
    let expected_facing = if agent.target().x < 1000.0 { Facing::Left } else { Facing::Right };
    assert_eq!(agent.facing(), expected_facing);
}

#[test]
fn test_wander_intervals_stay_in_range() {
    let mut sim = simulator();
    let mut rng = RngManager::new(3);
    sim.spawn(AgentSpec::new("a1", "Bolt", "#fff"), 0, &mut rng).unwrap();

    let mut last = sim.agent("a1").unwrap().next_wander_ms();
    assert!((4000..=7000).contains(&last));
    for tick in 1..=3000u64 {
        sim.step(tick, tick * 16, &mut rng, quiet);
        let next = sim.agent("a1").unwrap().next_wander_ms();
        if next != last {
            let fired_at = tick * 16;
            assert!(fired_at >= last);
            assert!((4000..=7000).contains(&(next - fired_at)));
            last = next;
        }
    }
}

// ============================================================================
// Forced targets
// ============================================================================

#[test]
fn test_forced_target_beats_wandering() {
    let mut sim = simulator();
    let mut rng = RngManager::new(21);
    sim.spawn(AgentSpec::new("a1", "Bolt", "#fff").at(Point::new(2500.0, 500.0)), 0, &mut rng)
        .unwrap();
    let rally = Point::new(1500.0, 1000.0);
    sim.set_forced_target("a1", Some(rally));

    // Long enough for several wander firings
    run(&mut sim, &mut rng, 0, 1500);
    let agent = sim.agent("a1").unwrap();
    assert_eq!(agent.mode(), MotionMode::Forced);
    assert_eq!(agent.target(), rally);
    assert!(agent.position().distance_to(rally) < 1.0);
}

#[test]
fn test_forced_target_clamped_to_floor() {
    let mut sim = simulator();
    let mut rng = RngManager::new(1);
    sim.spawn(AgentSpec::new("a1", "Bolt", "#fff"), 0, &mut rng).unwrap();
    sim.set_forced_target("a1", Some(Point::new(5000.0, -100.0)));
    assert_eq!(sim.agent("a1").unwrap().forced_target(), Some(Point::new(2800.0, 200.0)));
}

#[test]
fn test_wander_timer_firing_while_forced_keeps_forced_target() {
    let mut sim = simulator();
    let mut rng = RngManager::new(13);
    sim.spawn(AgentSpec::new("a1", "Bolt", "#fff").at(Point::new(700.0, 900.0)), 0, &mut rng)
        .unwrap();
    let pending = sim.agent("a1").unwrap().next_wander_ms();
    let rally = Point::new(1500.0, 1000.0);
    sim.set_forced_target("a1", Some(rally));

    // Step up to and including the first tick at or after the pending timer
    let fire_tick = pending.div_ceil(16);
    run(&mut sim, &mut rng, 0, fire_tick);
    let agent = sim.agent("a1").unwrap();
    assert!(agent.next_wander_ms() > pending, "timer should have fired and been rescheduled");
    assert_eq!(agent.target(), rally);
}

#[test]
fn test_cleared_forced_target_retargets_on_next_wander() {
    let mut sim = simulator();
    let mut rng = RngManager::new(8);
    sim.spawn(AgentSpec::new("a1", "Bolt", "#fff").at(Point::new(600.0, 600.0)), 0, &mut rng)
        .unwrap();
    let forced = Point::new(900.0, 600.0);
    sim.set_forced_target("a1", Some(forced));
    run(&mut sim, &mut rng, 0, 2);

    sim.set_forced_target("a1", None);
    run(&mut sim, &mut rng, 2, 1);
    let agent = sim.agent("a1").unwrap();
    assert_eq!(agent.mode(), MotionMode::Wandering);
    assert_eq!(agent.target(), forced);

    // Up to the tick before the timer: still heading for the old forced point
    let due = agent.next_wander_ms();
    let fire_tick = due.div_ceil(16);
    run(&mut sim, &mut rng, 3, fire_tick - 1 - 3);
    assert_eq!(sim.agent("a1").unwrap().target(), forced);

    run(&mut sim, &mut rng, fire_tick - 1, 1);
    let agent = sim.agent("a1").unwrap();
    assert_ne!(agent.target(), forced);
    assert!(floor().contains(agent.target()));
    assert!(agent.next_wander_ms() > due);
}

// ============================================================================
// Speaking and notifications
// ============================================================================

#[test]
fn test_wobble_is_edge_triggered_and_time_boxed() {
    let mut sim = simulator();
    let mut rng = RngManager::new(2);
    sim.spawn(AgentSpec::new("a1", "Bolt", "#fff"), 0, &mut rng).unwrap();

    // Speaking continuously for 5 s: one wobble of 2 s
    let mut wobbling_ticks = 0;
    for tick in 1..=312u64 {
        let now = tick * 16;
        sim.step(tick, now, &mut rng, |_| true);
        if sim.agent("a1").unwrap().is_wobbling(now) {
            wobbling_ticks += 1;
        }
    }
    assert!((124..=126).contains(&wobbling_ticks), "got {}", wobbling_ticks);
}

#[test]
fn test_arrived_agent_stops_notifying() {
    let mut sim = simulator();
    let mut rng = RngManager::new(4);
    sim.spawn(AgentSpec::new("a1", "Bolt", "#fff").at(Point::new(300.0, 300.0)), 0, &mut rng)
        .unwrap();
    sim.set_forced_target("a1", Some(Point::new(2700.0, 1700.0)));

    let notes = run(&mut sim, &mut rng, 0, 800);
    assert!(notes.len() > 10);
    for pair in notes.windows(2) {
        assert!(pair[0].position.distance_to(pair[1].position) > 50.0);
    }

    let later = run(&mut sim, &mut rng, 800, 200);
    assert!(later.is_empty());
    assert_eq!(sim.step(1001, 1001 * 16, &mut rng, quiet).moved, 0);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_forced_agent_converges(
        seed in 1u64..10_000,
        sx in 200.0f64..2800.0, sy in 200.0f64..1800.0,
        tx in 200.0f64..2800.0, ty in 200.0f64..1800.0,
    ) {
        let mut sim = simulator();
        let mut rng = RngManager::new(seed);
        sim.spawn(AgentSpec::new("a1", "Bolt", "#fff").at(Point::new(sx, sy)), 0, &mut rng).unwrap();
        let target = Point::new(tx, ty);
        sim.set_forced_target("a1", Some(target));

        let mut last = sim.agent("a1").unwrap().position().distance_to(target);
        for tick in 1..=600u64 {
            sim.step(tick, tick * 16, &mut rng, quiet);
            let now = sim.agent("a1").unwrap().position().distance_to(target);
            prop_assert!(now <= last + 1e-9, "distance grew at tick {}: {} -> {}", tick, last, now);
            last = now;
        }
        prop_assert!(last < 1.0);
    }

    #[test]
    fn prop_wandering_agents_stay_on_floor(seed in 1u64..10_000) {
        let mut sim = simulator();
        let mut rng = RngManager::new(seed);
        for i in 0..4 {
            sim.spawn(AgentSpec::new(format!("a{}", i), "Bot", "#fff"), 0, &mut rng).unwrap();
        }
        for tick in 1..=2000u64 {
            sim.step(tick, tick * 16, &mut rng, quiet);
            for agent in sim.agents() {
                prop_assert!(floor().contains(agent.position()));
                prop_assert!(floor().contains(agent.target()));
            }
        }
    }
}
