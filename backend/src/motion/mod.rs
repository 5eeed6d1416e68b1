//! Agent motion simulator
//!
//! Runs once per frame. For every agent, independently and in this order:
//!
//! ```text
//! 1. Sample the speaking flag (rising edge starts a time-boxed wobble)
//! 2. Adopt the forced target, if the orchestrator set one
//! 3. Fire the wander timer: reschedule, and pick a random target unless
//!    forced or speaking
//! 4. Interpolate: position += (target - position) × lerp_rate
//! 5. Queue a position notification if the agent travelled far enough
//! ```
//!
//! Interpolation is an exponential approach, so an agent never lands exactly
//! on its target; once closer than `arrive_threshold` it stops moving and
//! stops producing notifications.

pub mod notify;

pub use notify::{PositionChanged, PositionListener, PositionNotifier};

use crate::config::MotionConfig;
use crate::core::geometry::{Bounds, Point};
use crate::models::agent::{Agent, AgentSpec, MotionMode};
use crate::orchestrator::SimulationError;
use crate::rng::RngManager;
use tracing::debug;

/// Outcome of one simulator step
#[derive(Debug, Clone, Default)]
pub struct MotionStep {
    /// Agents whose position changed this tick
    pub moved: usize,
    /// Throttled notifications emitted this tick
    pub notifications: Vec<PositionChanged>,
}

/// Owns every agent's body and advances them each tick
#[derive(Debug)]
pub struct MotionSimulator {
    agents: Vec<Agent>,
    bounds: Bounds,
    config: MotionConfig,
    notifier: PositionNotifier,
}

impl MotionSimulator {
    pub fn new(config: MotionConfig, bounds: Bounds) -> Self {
        Self {
            agents: Vec::new(),
            bounds,
            config,
            notifier: PositionNotifier::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == agent_id)
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.agent(agent_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn subscribe(&mut self, listener: PositionListener) {
        self.notifier.subscribe(listener);
    }

    fn wander_delay(&self, rng: &mut RngManager) -> u64 {
        let (min, max) = (self.config.wander_min_ms, self.config.wander_max_ms);
        if max > min {
            rng.range(min, max + 1)
        } else {
            min
        }
    }

    /// Add an agent; spawns at a random walkable point unless one is given
    pub fn spawn(
        &mut self,
        spec: AgentSpec,
        now_ms: u64,
        rng: &mut RngManager,
    ) -> Result<Point, SimulationError> {
        if self.contains(&spec.id) {
            return Err(SimulationError::DuplicateAgent(spec.id));
        }
        let position = match spec.position {
            Some(p) => self.bounds.clamp(p),
            None => self.bounds.random_point(rng),
        };
        let next_wander = now_ms.saturating_add(self.wander_delay(rng));
        debug!(agent_id = %spec.id, x = position.x, y = position.y, "Agent spawned");
        self.agents.push(Agent::new(spec, position, next_wander));
        Ok(position)
    }

    /// Override hook: impose (or lift, with `None`) a target on one agent
    ///
    /// The target is clamped to the floor. Takes effect on the next step.
    /// Returns false for an unknown agent.
    pub fn set_forced_target(&mut self, agent_id: &str, target: Option<Point>) -> bool {
        let bounds = self.bounds;
        match self.agents.iter_mut().find(|a| a.id() == agent_id) {
            Some(agent) => {
                agent.set_forced_target(target.map(|t| bounds.clamp(t)));
                true
            }
            None => false,
        }
    }

    /// Whether an agent is far enough from its target to be drawn walking
    pub fn is_walking(&self, agent: &Agent) -> bool {
        agent.distance_to_target() > self.config.walking_threshold
    }

    /// Advance every agent by one tick
    ///
    /// `is_speaking` is sampled once per agent per tick.
    pub fn step<F>(&mut self, tick: u64, now_ms: u64, rng: &mut RngManager, is_speaking: F) -> MotionStep
    where
        F: Fn(&str) -> bool,
    {
        let mut result = MotionStep::default();

        for index in 0..self.agents.len() {
            let delay = self.wander_delay_if_due(index, now_ms, rng);
            let bounds = self.bounds;
            let config = &self.config;
            let agent = &mut self.agents[index];

            let speaking = is_speaking(agent.id());
            agent.observe_speaking(speaking, now_ms, config.wobble_ms);

            if let Some(forced) = agent.forced_target() {
                if agent.target() != forced {
                    agent.retarget(forced);
                }
            }

            if let Some(delay) = delay {
                agent.set_next_wander_ms(now_ms.saturating_add(delay));
                if agent.mode() == MotionMode::Wandering && !speaking {
                    agent.retarget(bounds.random_point(rng));
                }
            }

            if agent.step(config.lerp_rate, config.arrive_threshold) {
                result.moved += 1;
            }

            if agent.take_notification(config.notify_distance) {
                result.notifications.push(PositionChanged {
                    tick,
                    agent_id: agent.id().to_string(),
                    position: agent.position(),
                    facing: agent.facing(),
                });
            }
        }

        self.notifier.dispatch(&result.notifications);
        result
    }

    /// Draw the next wander delay for agent `index` if its timer has fired
    fn wander_delay_if_due(&self, index: usize, now_ms: u64, rng: &mut RngManager) -> Option<u64> {
        if now_ms >= self.agents[index].next_wander_ms() {
            Some(self.wander_delay(rng))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::agent::Facing;
    use std::sync::{Arc, Mutex};

    fn simulator() -> MotionSimulator {
        MotionSimulator::new(MotionConfig::default(), Bounds::floor(3000.0, 2000.0, 200.0, 200.0))
    }

    fn never_speaking(_: &str) -> bool {
        false
    }

    #[test]
    fn test_duplicate_spawn_rejected() {
        let mut sim = simulator();
        let mut rng = RngManager::new(1);
        sim.spawn(AgentSpec::new("a1", "Robo", "#fff"), 0, &mut rng).unwrap();
        let err = sim.spawn(AgentSpec::new("a1", "Robo", "#fff"), 0, &mut rng).unwrap_err();
        assert_eq!(err, SimulationError::DuplicateAgent("a1".to_string()));
    }

    #[test]
    fn test_spawn_clamps_requested_position() {
        let mut sim = simulator();
        let mut rng = RngManager::new(1);
        let p = sim
            .spawn(AgentSpec::new("a1", "Robo", "#fff").at(Point::new(0.0, 5000.0)), 0, &mut rng)
            .unwrap();
        assert_eq!(p, Point::new(200.0, 1800.0));
    }

    #[test]
    fn test_first_wander_within_configured_interval() {
        let mut sim = simulator();
        let mut rng = RngManager::new(5);
        sim.spawn(AgentSpec::new("a1", "Robo", "#fff"), 1000, &mut rng).unwrap();
        let next = sim.agent("a1").unwrap().next_wander_ms();
        assert!((5000..=8000).contains(&next));
    }

    #[test]
    fn test_forced_target_visible_next_step() {
        let mut sim = simulator();
        let mut rng = RngManager::new(1);
        sim.spawn(AgentSpec::new("a1", "Robo", "#fff").at(Point::new(1000.0, 1000.0)), 0, &mut rng)
            .unwrap();
        assert!(sim.set_forced_target("a1", Some(Point::new(400.0, 1000.0))));
        assert_eq!(sim.agent("a1").unwrap().target(), Point::new(1000.0, 1000.0));

        sim.step(1, 16, &mut rng, never_speaking);
        let agent = sim.agent("a1").unwrap();
        assert_eq!(agent.target(), Point::new(400.0, 1000.0));
        assert_eq!(agent.facing(), Facing::Left);
        assert_eq!(agent.mode(), MotionMode::Forced);
    }

    #[test]
    fn test_unknown_agent_override_reports_false() {
        let mut sim = simulator();
        assert!(!sim.set_forced_target("ghost", None));
    }

    #[test]
    fn test_speaking_agent_keeps_target_when_timer_fires() {
        let mut sim = simulator();
        let mut rng = RngManager::new(9);
        sim.spawn(AgentSpec::new("a1", "Robo", "#fff").at(Point::new(1000.0, 1000.0)), 0, &mut rng)
            .unwrap();
        let fire_at = sim.agent("a1").unwrap().next_wander_ms();

        sim.step(1, fire_at, &mut rng, |_| true);
        let agent = sim.agent("a1").unwrap();
        assert_eq!(agent.target(), Point::new(1000.0, 1000.0));
        assert!(agent.next_wander_ms() > fire_at, "timer is rescheduled anyway");
        assert!(agent.is_wobbling(fire_at));
    }

    #[test]
    fn test_listeners_receive_notifications() {
        let mut sim = simulator();
        let mut rng = RngManager::new(1);
        sim.spawn(AgentSpec::new("a1", "Robo", "#fff").at(Point::new(300.0, 1000.0)), 0, &mut rng)
            .unwrap();
        sim.set_forced_target("a1", Some(Point::new(2700.0, 1000.0)));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        sim.subscribe(Box::new(move |change: &PositionChanged| {
            sink.lock().unwrap().push(change.position);
        }));

        let mut returned = 0;
        for tick in 1..=200 {
            returned += sim.step(tick, tick * 16, &mut rng, never_speaking).notifications.len();
        }

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert_eq!(seen.len(), returned);
        for pair in seen.windows(2) {
            assert!(pair[0].distance_to(pair[1]) > 50.0);
        }
    }
}
