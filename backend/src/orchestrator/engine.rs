//! Office Engine
//!
//! Sans-IO glue integrating all components behind one owner:
//! - Viewport (camera transform, pointer input)
//! - Motion (agent wandering, forced targets, throttled notifications)
//! - Meeting orchestration (phase machine, reaction fan-out hand-off)
//! - Event logging (typed office history)
//!
//! # Architecture
//!
//! ```text
//! For each tick(dt_ms):
//! 1. Advance the simulated clock
//! 2. Step every agent (speaking flags sampled here)
//! 3. Fire due meeting timers (forced targets set now are seen next tick)
//! 4. Log events
//! ```
//!
//! Nothing here sleeps or performs I/O. Reaction requests leave through
//! `take_reaction_batch` and come back through `settle_reactions`; the async
//! runtime in `crate::runtime` does that plumbing for a live session.
//!
//! # Example
//!
//! ```rust
//! use virtual_office_core::orchestrator::{MeetingPhase, MeetingTrigger, OfficeEngine};
//! use virtual_office_core::{AgentSpec, Notice, OfficeConfig};
//!
//! let mut engine = OfficeEngine::new(OfficeConfig::default()).unwrap();
//! engine.spawn_agent(AgentSpec::new("a1", "Robo", "#4caf50")).unwrap();
//!
//! let trigger = engine.submit_notice(Notice::new("n1", "emergency meeting", "Fire drill"));
//! assert!(matches!(trigger, MeetingTrigger::Started { .. }));
//!
//! // Fade-in lasts 600 ms by default
//! for _ in 0..40 {
//!     engine.tick(16);
//! }
//! assert_eq!(engine.phase(), MeetingPhase::Convening);
//! assert_eq!(engine.take_reaction_batch().unwrap().requests.len(), 1);
//! ```

use crate::config::OfficeConfig;
use crate::core::geometry::Point;
use crate::core::time::SimClock;
use crate::models::agent::AgentSpec;
use crate::models::event::{Event, EventLog};
use crate::models::notice::Notice;
use crate::motion::{MotionSimulator, PositionChanged, PositionListener};
use crate::orchestrator::checkpoint::{AgentView, OfficeSnapshot};
use crate::orchestrator::meeting::{
    MeetingOrchestrator, MeetingPhase, MeetingTrigger, ReactionBatch, ReactionOutcome,
};
use crate::reasoning::NextState;
use crate::rng::RngManager;
use crate::viewport::{ViewportController, ViewportState};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Agent not found
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// Agent id already taken
    #[error("Duplicate agent: {0}")]
    DuplicateAgent(String),

    /// Snapshot or config could not be serialized
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result of a single tick
#[derive(Debug, Clone)]
pub struct TickResult {
    /// Tick number
    pub tick: u64,

    /// Simulated milliseconds elapsed after this tick
    pub time_ms: u64,

    /// Number of agents whose position changed
    pub moved: usize,

    /// Throttled position notifications emitted this tick
    pub notifications: Vec<PositionChanged>,

    /// Meeting phase at the end of the tick
    pub phase: MeetingPhase,
}

/// Main engine owning all office state
///
/// # Determinism
///
/// All randomness is via `rng` (seeded xorshift64*), meeting ids included.
/// Same seed + same config + same input sequence = identical snapshots.
pub struct OfficeEngine {
    config: OfficeConfig,
    clock: SimClock,
    rng: RngManager,
    viewport: ViewportController,
    motion: MotionSimulator,
    meeting: MeetingOrchestrator,
    event_log: EventLog,
    speaking: BTreeSet<String>,
    chat_lines: BTreeMap<String, String>,
    /// Chat turns awaiting a reply, per agent
    pending_chats: BTreeMap<String, u32>,
    tags: BTreeMap<String, BTreeSet<String>>,
    thoughts: BTreeMap<String, String>,
    active_agent: Option<String>,
}

/// What a chat turn needs to ask for the agent's next state
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub agent_name: String,
    pub tags: Vec<String>,
}

impl OfficeEngine {
    /// Create a new engine from configuration
    ///
    /// The camera starts centred on the central plaza at `default_zoom`.
    pub fn new(config: OfficeConfig) -> Result<Self, SimulationError> {
        config
            .validate_or_err()
            .map_err(|e| SimulationError::InvalidConfig(e.to_string()))?;

        let plaza = config.map.central_plaza;
        let viewport = ViewportController::new(&config.viewport, plaza);
        let motion = MotionSimulator::new(config.motion.clone(), config.floor_bounds());
        let meeting = MeetingOrchestrator::new(config.meeting.clone(), config.rally_point());

        info!(seed = config.rng_seed, "Office engine initialised");

        Ok(Self {
            rng: RngManager::new(config.rng_seed),
            clock: SimClock::new(),
            viewport,
            motion,
            meeting,
            event_log: EventLog::new(),
            speaking: BTreeSet::new(),
            chat_lines: BTreeMap::new(),
            pending_chats: BTreeMap::new(),
            tags: BTreeMap::new(),
            thoughts: BTreeMap::new(),
            active_agent: None,
            config,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &OfficeConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn current_tick(&self) -> u64 {
        self.clock.current_tick()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn motion(&self) -> &MotionSimulator {
        &self.motion
    }

    pub fn meeting(&self) -> &MeetingOrchestrator {
        &self.meeting
    }

    pub fn phase(&self) -> MeetingPhase {
        self.meeting.phase()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn agent_count(&self) -> usize {
        self.motion.len()
    }

    pub fn active_agent(&self) -> Option<&str> {
        self.active_agent.as_deref()
    }

    /// Speaking flag set by the chat collaborator, or a chat turn in flight
    pub fn is_speaking(&self, agent_id: &str) -> bool {
        self.speaking.contains(agent_id) || self.pending_chats.contains_key(agent_id)
    }

    pub fn is_thinking(&self, agent_id: &str) -> bool {
        self.pending_chats.contains_key(agent_id)
    }

    /// State tags gathered from chat turns, sorted
    pub fn agent_tags(&self, agent_id: &str) -> Vec<String> {
        self.tags
            .get(agent_id)
            .map(|tags| tags.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn active_thought(&self, agent_id: &str) -> Option<&str> {
        self.thoughts.get(agent_id).map(String::as_str)
    }

    pub fn chat_line(&self, agent_id: &str) -> Option<&str> {
        self.chat_lines.get(agent_id).map(String::as_str)
    }

    fn require_agent(&self, agent_id: &str) -> Result<(), SimulationError> {
        if self.motion.contains(agent_id) {
            Ok(())
        } else {
            Err(SimulationError::AgentNotFound(agent_id.to_string()))
        }
    }

    fn collect_meeting_events(&mut self) {
        for event in self.meeting.drain_events() {
            self.event_log.log(event);
        }
    }

    // ========================================================================
    // Agents
    // ========================================================================

    /// Add an agent; without an explicit position it lands on a random walkable point
    pub fn spawn_agent(&mut self, spec: AgentSpec) -> Result<(), SimulationError> {
        let agent_id = spec.id.clone();
        let position = self.motion.spawn(spec, self.clock.now_ms(), &mut self.rng)?;
        self.event_log.log(Event::AgentSpawned {
            tick: self.clock.current_tick(),
            time_ms: self.clock.now_ms(),
            agent_id,
            position,
        });
        Ok(())
    }

    /// Chat collaborator's "is speaking" signal
    pub fn set_speaking(&mut self, agent_id: &str, speaking: bool) -> Result<(), SimulationError> {
        self.require_agent(agent_id)?;
        if speaking {
            self.speaking.insert(agent_id.to_string());
        } else {
            self.speaking.remove(agent_id);
        }
        Ok(())
    }

    /// Store an agent's latest chat reply for bubble display
    pub fn record_chat_reply(&mut self, agent_id: &str, text: impl Into<String>) -> Result<(), SimulationError> {
        self.require_agent(agent_id)?;
        let text = text.into();
        self.event_log.log(Event::ChatReply {
            tick: self.clock.current_tick(),
            time_ms: self.clock.now_ms(),
            agent_id: agent_id.to_string(),
            text: text.clone(),
        });
        self.chat_lines.insert(agent_id.to_string(), text);
        Ok(())
    }

    /// Open a chat turn: the agent speaks and thinks until its reply lands
    ///
    /// Turns stack; the agent stays speaking until every open turn is
    /// finished.
    pub fn begin_chat(&mut self, agent_id: &str) -> Result<ChatTurn, SimulationError> {
        let agent_name = self
            .motion
            .agent(agent_id)
            .map(|a| a.name().to_string())
            .ok_or_else(|| SimulationError::AgentNotFound(agent_id.to_string()))?;
        *self.pending_chats.entry(agent_id.to_string()).or_insert(0) += 1;
        Ok(ChatTurn {
            agent_name,
            tags: self.agent_tags(agent_id),
        })
    }

    /// Close one chat turn with the agent's decided next state
    pub fn finish_chat(&mut self, agent_id: &str, state: NextState) -> Result<(), SimulationError> {
        self.require_agent(agent_id)?;
        if let Some(open) = self.pending_chats.get_mut(agent_id) {
            *open -= 1;
            if *open == 0 {
                self.pending_chats.remove(agent_id);
            }
        }

        if state.tags().next().is_some() {
            let tags = self.tags.entry(agent_id.to_string()).or_default();
            tags.extend(state.tags().map(str::to_string));
            self.event_log.log(Event::ThoughtRecorded {
                tick: self.clock.current_tick(),
                time_ms: self.clock.now_ms(),
                agent_id: agent_id.to_string(),
                thought_tag: state.thought_tag.clone(),
                action_tag: state.action_tag.clone(),
            });
        }
        if !state.reasoning.trim().is_empty() {
            self.thoughts.insert(agent_id.to_string(), state.reasoning);
        }
        self.record_chat_reply(agent_id, state.message)
    }

    /// Mark an agent as the UI's active one and bring it into view
    ///
    /// While a meeting is running the camera belongs to the meeting, so only
    /// the selection changes.
    pub fn select_agent(&mut self, agent_id: &str) -> Result<(), SimulationError> {
        let position = self
            .motion
            .agent(agent_id)
            .map(|a| a.position())
            .ok_or_else(|| SimulationError::AgentNotFound(agent_id.to_string()))?;
        self.active_agent = Some(agent_id.to_string());
        if !self.meeting.is_active() {
            self.viewport.center_on(position, Some(self.config.viewport.focus_zoom));
        }
        Ok(())
    }

    pub fn subscribe_positions(&mut self, listener: PositionListener) {
        self.motion.subscribe(listener);
    }

    // ========================================================================
    // Tick loop
    // ========================================================================

    /// Advance the office by `dt_ms` of simulated time
    pub fn tick(&mut self, dt_ms: u64) -> TickResult {
        self.clock.advance(dt_ms);
        let tick = self.clock.current_tick();
        let now_ms = self.clock.now_ms();

        let speaking = &self.speaking;
        let chatting = &self.pending_chats;
        let step = self.motion.step(tick, now_ms, &mut self.rng, |id| {
            speaking.contains(id) || chatting.contains_key(id)
        });

        self.meeting
            .advance(&self.clock, &mut self.motion, &mut self.viewport);
        self.collect_meeting_events();

        TickResult {
            tick,
            time_ms: now_ms,
            moved: step.moved,
            notifications: step.notifications,
            phase: self.meeting.phase(),
        }
    }

    // ========================================================================
    // Meetings
    // ========================================================================

    /// Post a notice; a trigger notice starts a meeting when none is running
    pub fn submit_notice(&mut self, notice: Notice) -> MeetingTrigger {
        self.event_log.log(Event::NoticeSubmitted {
            tick: self.clock.current_tick(),
            time_ms: self.clock.now_ms(),
            notice_id: notice.id.clone(),
            category: notice.category.clone(),
        });

        let rng = &mut self.rng;
        let outcome = self
            .meeting
            .submit_notice(&notice, &self.clock, &mut self.viewport, || mint_meeting_id(rng));
        self.collect_meeting_events();

        if let MeetingTrigger::Started { meeting_id } = outcome {
            debug!(meeting_id = %meeting_id, notice_id = %notice.id, "Meeting started");
        }
        outcome
    }

    /// Pending reaction fan-out, if a meeting just started convening
    pub fn take_reaction_batch(&mut self) -> Option<ReactionBatch> {
        self.meeting.take_reaction_batch()
    }

    /// Hand back the settled fan-out; false if it no longer applies
    pub fn settle_reactions(&mut self, meeting_id: Uuid, outcomes: Vec<ReactionOutcome>) -> bool {
        let accepted = self.meeting.settle_reactions(meeting_id, outcomes, &self.clock);
        self.collect_meeting_events();
        accepted
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    pub fn on_wheel(&mut self, delta_y: f64, screen: Point) {
        self.viewport.on_wheel(delta_y, screen);
    }

    pub fn on_pointer_down(&mut self, screen: Point) {
        self.viewport.on_pointer_down(screen);
    }

    pub fn on_pointer_move(&mut self, screen: Point) {
        self.viewport.on_pointer_move(screen);
    }

    pub fn on_pointer_up(&mut self) {
        self.viewport.on_pointer_up();
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out()
    }

    /// Home button: plaza centred at the default zoom
    pub fn reset_view(&mut self) {
        if self.viewport.is_input_suspended() {
            return;
        }
        self.viewport
            .center_on(self.config.map.central_plaza, Some(self.config.viewport.default_zoom));
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
    }

    // ========================================================================
    // Render view
    // ========================================================================

    pub fn snapshot(&self) -> OfficeSnapshot {
        let now_ms = self.clock.now_ms();
        let agents = self
            .motion
            .agents()
            .iter()
            .map(|agent| AgentView {
                id: agent.id().to_string(),
                name: agent.name().to_string(),
                color: agent.color().to_string(),
                position: agent.position(),
                target: agent.target(),
                facing: agent.facing(),
                is_wobbling: agent.is_wobbling(now_ms),
                is_walking: self.motion.is_walking(agent),
                forced_target: agent.forced_target(),
                reaction: self.meeting.reaction_for(agent.id()).map(str::to_string),
                chat_line: self.chat_line(agent.id()).map(str::to_string),
                tags: self.agent_tags(agent.id()),
                active_thought: self.active_thought(agent.id()).map(str::to_string),
                is_thinking: self.is_thinking(agent.id()),
                is_active: self.active_agent.as_deref() == Some(agent.id()),
            })
            .collect();

        OfficeSnapshot {
            tick: self.clock.current_tick(),
            time_ms: now_ms,
            viewport: self.viewport.state(),
            input_suspended: self.meeting.input_suspended(),
            meeting_active: self.meeting.is_active(),
            phase: self.meeting.phase(),
            agents,
        }
    }
}

/// Meeting ids come from the engine RNG so replays see the same ids
fn mint_meeting_id(rng: &mut RngManager) -> Uuid {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&rng.next().to_le_bytes());
    bytes[8..].copy_from_slice(&rng.next().to_le_bytes());
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

impl std::fmt::Debug for OfficeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfficeEngine")
            .field("tick", &self.clock.current_tick())
            .field("now_ms", &self.clock.now_ms())
            .field("agents", &self.motion.len())
            .field("phase", &self.meeting.phase())
            .field("viewport", &self.viewport.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> OfficeEngine {
        OfficeEngine::new(OfficeConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = OfficeConfig::default();
        config.viewport.min_zoom = 3.0;
        let err = OfficeEngine::new(config).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_agent_operations_fail() {
        let mut engine = engine();
        assert_eq!(
            engine.set_speaking("ghost", true),
            Err(SimulationError::AgentNotFound("ghost".to_string()))
        );
        assert!(engine.select_agent("ghost").is_err());
        assert!(engine.record_chat_reply("ghost", "hi").is_err());
    }

    #[test]
    fn test_select_agent_centres_camera() {
        let mut engine = engine();
        engine
            .spawn_agent(AgentSpec::new("a1", "Robo", "#fff").at(Point::new(600.0, 500.0)))
            .unwrap();
        engine.select_agent("a1").unwrap();

        let vp = engine.viewport_state();
        assert_eq!(vp.zoom, 1.0);
        assert!((600.0 * vp.zoom + vp.offset_x - 640.0).abs() < 1e-9);
        assert!((500.0 * vp.zoom + vp.offset_y - 400.0).abs() < 1e-9);
        assert!(engine.snapshot().agent("a1").unwrap().is_active);
    }

    #[test]
    fn test_meeting_ids_are_seed_deterministic() {
        let start = |seed| {
            let mut config = OfficeConfig::default();
            config.rng_seed = seed;
            let mut engine = OfficeEngine::new(config).unwrap();
            match engine.submit_notice(Notice::new("n", "emergency meeting", "x")) {
                MeetingTrigger::Started { meeting_id } => meeting_id,
                other => panic!("unexpected {:?}", other),
            }
        };
        assert_eq!(start(7), start(7));
        assert_ne!(start(7), start(8));
    }

    #[test]
    fn test_reset_view_ignored_during_fade() {
        let mut engine = engine();
        engine.zoom_in();
        let zoomed = engine.viewport_state();
        engine.submit_notice(Notice::new("n", "emergency meeting", "x"));
        engine.reset_view();
        assert_eq!(engine.viewport_state(), zoomed);
    }

    #[test]
    fn test_chat_reply_is_logged_and_shown() {
        let mut engine = engine();
        engine.spawn_agent(AgentSpec::new("a1", "Robo", "#fff")).unwrap();
        engine.record_chat_reply("a1", "Beep boop").unwrap();

        assert_eq!(engine.snapshot().agent("a1").unwrap().chat_line.as_deref(), Some("Beep boop"));
        assert_eq!(engine.event_log().events_of_type("ChatReply").len(), 1);
    }

    fn next_state(thought: &str, action: &str, message: &str) -> NextState {
        NextState {
            reasoning: format!("feeling {}", thought),
            thought_tag: thought.to_string(),
            action_tag: action.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_overlapping_chats_keep_agent_speaking() {
        let mut engine = engine();
        engine.spawn_agent(AgentSpec::new("a1", "Robo", "#fff")).unwrap();

        engine.begin_chat("a1").unwrap();
        engine.begin_chat("a1").unwrap();
        engine.finish_chat("a1", next_state("happy", "wave", "first")).unwrap();
        assert!(engine.is_speaking("a1"));
        assert!(engine.is_thinking("a1"));

        engine.finish_chat("a1", next_state("curious", "walk", "second")).unwrap();
        assert!(!engine.is_speaking("a1"));
        assert!(!engine.is_thinking("a1"));
        assert_eq!(engine.chat_line("a1"), Some("second"));
    }

    #[test]
    fn test_speaking_flag_survives_chat_turn() {
        let mut engine = engine();
        engine.spawn_agent(AgentSpec::new("a1", "Robo", "#fff")).unwrap();
        engine.set_speaking("a1", true).unwrap();

        engine.begin_chat("a1").unwrap();
        engine.finish_chat("a1", NextState::fallback("Bzzt")).unwrap();
        assert!(engine.is_speaking("a1"));
    }

    #[test]
    fn test_chat_turns_accumulate_tags_and_thought() {
        let mut engine = engine();
        engine.spawn_agent(AgentSpec::new("a1", "Robo", "#fff")).unwrap();

        let turn = engine.begin_chat("a1").unwrap();
        assert_eq!(turn.agent_name, "Robo");
        assert!(turn.tags.is_empty());
        assert!(engine.snapshot().agent("a1").unwrap().is_thinking);
        engine.finish_chat("a1", next_state("happy", "wave", "hi")).unwrap();

        let turn = engine.begin_chat("a1").unwrap();
        assert_eq!(turn.tags, vec!["happy".to_string(), "wave".to_string()]);
        engine.finish_chat("a1", NextState::fallback("Bzzt")).unwrap();

        let view = engine.snapshot().agent("a1").cloned().unwrap();
        assert_eq!(view.tags, vec!["happy".to_string(), "wave".to_string()]);
        assert_eq!(view.active_thought.as_deref(), Some("feeling happy"));
        assert_eq!(view.chat_line.as_deref(), Some("Bzzt"));
        assert!(!view.is_thinking);
        assert_eq!(engine.event_log().events_of_type("ThoughtRecorded").len(), 1);
    }
}
