//! Emergency meeting orchestrator
//!
//! Phase machine driven by notices, by the simulated clock and by the
//! settling of the per-agent reaction fan-out:
//!
//! ```text
//! Idle ──notice(trigger)──▶ FadingIn ──fade_ms──▶ Convening
//!   ▲                                                 │ all reactions settled
//!   └──fade_ms── FadingOut ◀──hold_ms── Holding ◀─────┘
//! ```
//!
//! The orchestrator never performs I/O. On entering `Convening` it queues a
//! `ReactionBatch`; whoever drives the office runs the requests (all at
//! once) and hands the outcomes back through `settle_reactions`.
//!
//! # Invariants
//!
//! 1. At most one meeting is active; trigger notices outside `Idle` are dropped
//! 2. Phases are visited strictly in order, each exactly once per meeting
//! 3. Only one phase timer is live, and it belongs to the current phase

use crate::config::MeetingConfig;
use crate::core::geometry::Point;
use crate::core::time::SimClock;
use crate::models::event::Event;
use crate::models::notice::Notice;
use crate::motion::MotionSimulator;
use crate::reasoning::ReasoningError;
use crate::viewport::{ViewportController, ViewportState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Meeting phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeetingPhase {
    #[default]
    Idle,
    FadingIn,
    Convening,
    Holding,
    FadingOut,
}

impl MeetingPhase {
    /// Pointer and zoom input is ignored during the screen fades
    pub fn suspends_input(&self) -> bool {
        matches!(self, MeetingPhase::FadingIn | MeetingPhase::FadingOut)
    }

    pub fn is_active(&self) -> bool {
        *self != MeetingPhase::Idle
    }
}

// ============================================================================
// Seams to the rest of the office
// ============================================================================

/// The agents a meeting gathers, and the hook to steer them
pub trait AgentRoster {
    /// `(agent_id, display_name)` for every agent, in a stable order
    fn roster(&self) -> Vec<(String, String)>;

    /// Impose (`Some`) or lift (`None`) a forced target
    fn set_forced_target(&mut self, agent_id: &str, target: Option<Point>) -> bool;
}

/// Camera moves the meeting needs
pub trait CameraControl {
    fn camera_state(&self) -> ViewportState;
    fn center_camera(&mut self, map: Point, zoom: Option<f64>);
    fn restore_camera(&mut self, saved: ViewportState);
    fn set_input_suspended(&mut self, suspended: bool);
}

impl AgentRoster for MotionSimulator {
    fn roster(&self) -> Vec<(String, String)> {
        self.agents()
            .iter()
            .map(|a| (a.id().to_string(), a.name().to_string()))
            .collect()
    }

    fn set_forced_target(&mut self, agent_id: &str, target: Option<Point>) -> bool {
        MotionSimulator::set_forced_target(self, agent_id, target)
    }
}

impl CameraControl for ViewportController {
    fn camera_state(&self) -> ViewportState {
        self.state()
    }

    fn center_camera(&mut self, map: Point, zoom: Option<f64>) {
        self.center_on(map, zoom);
    }

    fn restore_camera(&mut self, saved: ViewportState) {
        self.restore(saved);
    }

    fn set_input_suspended(&mut self, suspended: bool) {
        ViewportController::set_input_suspended(self, suspended);
    }
}

// ============================================================================
// Requests and outcomes
// ============================================================================

/// Why a notice did not start a meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    NotTriggerCategory,
    MeetingInProgress,
}

/// Result of submitting a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingTrigger {
    Started { meeting_id: Uuid },
    Ignored { reason: IgnoreReason },
}

/// One agent's reaction request
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionRequest {
    pub agent_id: String,
    pub agent_name: String,
    /// Notice content, passed through opaquely
    pub context: String,
}

/// Every reaction request of one meeting; run them concurrently
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionBatch {
    pub meeting_id: Uuid,
    pub requests: Vec<ReactionRequest>,
}

/// Settled result of one reaction request
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionOutcome {
    pub agent_id: String,
    pub result: Result<String, ReasoningError>,
}

#[derive(Debug, Clone, Copy)]
struct PhaseTimer {
    phase: MeetingPhase,
    due_ms: u64,
}

#[derive(Debug, Clone)]
struct ActiveMeeting {
    id: Uuid,
    notice: Notice,
    saved_camera: ViewportState,
    participants: Vec<String>,
}

// ============================================================================
// Orchestrator
// ============================================================================

#[derive(Debug)]
pub struct MeetingOrchestrator {
    config: MeetingConfig,
    rally: Point,
    phase: MeetingPhase,
    timer: Option<PhaseTimer>,
    active: Option<ActiveMeeting>,
    reactions: BTreeMap<String, String>,
    outbox: Option<ReactionBatch>,
    events: Vec<Event>,
}

impl MeetingOrchestrator {
    pub fn new(config: MeetingConfig, rally: Point) -> Self {
        Self {
            config,
            rally,
            phase: MeetingPhase::Idle,
            timer: None,
            active: None,
            reactions: BTreeMap::new(),
            outbox: None,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> MeetingPhase {
        self.phase
    }

    /// "Meeting active" signal for UI banners
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    /// "Input suspended" signal, asserted during both fades
    pub fn input_suspended(&self) -> bool {
        self.phase.suspends_input()
    }

    pub fn rally_point(&self) -> Point {
        self.rally
    }

    pub fn meeting_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|m| m.id)
    }

    pub fn active_notice(&self) -> Option<&Notice> {
        self.active.as_ref().map(|m| &m.notice)
    }

    pub fn reaction_for(&self, agent_id: &str) -> Option<&str> {
        self.reactions.get(agent_id).map(String::as_str)
    }

    pub fn reactions(&self) -> &BTreeMap<String, String> {
        &self.reactions
    }

    /// Absolute time the current phase ends, for timed phases
    pub fn phase_deadline_ms(&self) -> Option<u64> {
        self.timer
            .filter(|t| t.phase == self.phase)
            .map(|t| t.due_ms)
    }

    /// Hand over the pending fan-out (once per meeting)
    pub fn take_reaction_batch(&mut self) -> Option<ReactionBatch> {
        self.outbox.take()
    }

    /// Events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Point agent `index` of `count` walks to: spread evenly on a circle
    /// around the rally point
    pub fn rally_slot(&self, index: usize, count: usize) -> Point {
        let step = TAU / count.max(1) as f64;
        let angle = index as f64 * step;
        Point::new(
            self.rally.x + angle.cos() * self.config.rally_radius,
            self.rally.y + angle.sin() * self.config.rally_radius,
        )
    }

    fn meeting_label(&self) -> String {
        self.meeting_id().map(|id| id.to_string()).unwrap_or_default()
    }

    fn transition(&mut self, to: MeetingPhase, clock: &SimClock) {
        let from = self.phase;
        self.phase = to;
        self.timer = None;
        info!(from = ?from, to = ?to, meeting_id = %self.meeting_label(), "Meeting phase changed");
        self.events.push(Event::PhaseChanged {
            tick: clock.current_tick(),
            time_ms: clock.now_ms(),
            meeting_id: self.meeting_label(),
            from,
            to,
        });
    }

    fn schedule(&mut self, delay_ms: u64, clock: &SimClock) {
        self.schedule_at(clock.deadline_after(delay_ms));
    }

    fn schedule_at(&mut self, due_ms: u64) {
        self.timer = Some(PhaseTimer {
            phase: self.phase,
            due_ms,
        });
    }

    /// Offer a notice; starts a meeting only for the trigger category and only from `Idle`
    ///
    /// `mint_id` is called only when a meeting actually starts.
    pub fn submit_notice<C, F>(
        &mut self,
        notice: &Notice,
        clock: &SimClock,
        camera: &mut C,
        mint_id: F,
    ) -> MeetingTrigger
    where
        C: CameraControl + ?Sized,
        F: FnOnce() -> Uuid,
    {
        let reason = if !notice.is_category(&self.config.trigger_category) {
            Some(IgnoreReason::NotTriggerCategory)
        } else if self.phase != MeetingPhase::Idle {
            Some(IgnoreReason::MeetingInProgress)
        } else {
            None
        };

        if let Some(reason) = reason {
            if reason == IgnoreReason::MeetingInProgress {
                warn!(notice_id = %notice.id, phase = ?self.phase, "Meeting already running, trigger notice dropped");
            } else {
                debug!(notice_id = %notice.id, category = %notice.category, "Notice is not a meeting trigger");
            }
            self.events.push(Event::NoticeIgnored {
                tick: clock.current_tick(),
                time_ms: clock.now_ms(),
                notice_id: notice.id.clone(),
                reason: format!("{:?}", reason),
            });
            return MeetingTrigger::Ignored { reason };
        }

        let meeting_id = mint_id();
        self.active = Some(ActiveMeeting {
            id: meeting_id,
            notice: notice.clone(),
            saved_camera: camera.camera_state(),
            participants: Vec::new(),
        });
        self.transition(MeetingPhase::FadingIn, clock);
        self.schedule(self.config.fade_ms, clock);
        camera.set_input_suspended(true);

        MeetingTrigger::Started { meeting_id }
    }

    /// Fire any phase timer that is due
    ///
    /// A timed phase that follows another is scheduled from the expired
    /// deadline, not from the current time, so one long tick can cross
    /// several timed phases.
    pub fn advance<R, C>(&mut self, clock: &SimClock, roster: &mut R, camera: &mut C)
    where
        R: AgentRoster + ?Sized,
        C: CameraControl + ?Sized,
    {
        while let Some(timer) = self.timer {
            if timer.phase != self.phase {
                self.timer = None;
                continue;
            }
            if !clock.is_due(timer.due_ms) {
                break;
            }
            self.timer = None;
            match self.phase {
                MeetingPhase::FadingIn => self.enter_convening(clock, roster, camera),
                MeetingPhase::Holding => {
                    self.transition(MeetingPhase::FadingOut, clock);
                    self.schedule_at(timer.due_ms.saturating_add(self.config.fade_ms));
                    camera.set_input_suspended(true);
                }
                MeetingPhase::FadingOut => self.finish(clock, roster, camera),
                MeetingPhase::Idle | MeetingPhase::Convening => {}
            }
        }
    }

    fn enter_convening<R, C>(&mut self, clock: &SimClock, roster: &mut R, camera: &mut C)
    where
        R: AgentRoster + ?Sized,
        C: CameraControl + ?Sized,
    {
        self.transition(MeetingPhase::Convening, clock);
        camera.set_input_suspended(false);

        let agents = roster.roster();
        let count = agents.len();
        for (index, (agent_id, _)) in agents.iter().enumerate() {
            roster.set_forced_target(agent_id, Some(self.rally_slot(index, count)));
        }
        camera.center_camera(self.rally, Some(self.config.elevated_zoom));

        let Some(meeting) = self.active.as_mut() else {
            return;
        };
        meeting.participants = agents.iter().map(|(id, _)| id.clone()).collect();
        let context = meeting.notice.content.clone();
        let batch = ReactionBatch {
            meeting_id: meeting.id,
            requests: agents
                .into_iter()
                .map(|(agent_id, agent_name)| ReactionRequest {
                    agent_id,
                    agent_name,
                    context: context.clone(),
                })
                .collect(),
        };

        if batch.requests.is_empty() {
            let meeting_id = batch.meeting_id;
            self.settle_reactions(meeting_id, Vec::new(), clock);
        } else {
            debug!(requests = batch.requests.len(), "Reaction fan-out queued");
            self.outbox = Some(batch);
        }
    }

    /// Accept the settled fan-out and move to `Holding`
    ///
    /// Agents without a successful outcome get the fallback reaction. Outcomes
    /// for a different meeting, or arriving outside `Convening`, are discarded
    /// (returns false).
    pub fn settle_reactions(
        &mut self,
        meeting_id: Uuid,
        outcomes: Vec<ReactionOutcome>,
        clock: &SimClock,
    ) -> bool {
        if self.phase != MeetingPhase::Convening || self.meeting_id() != Some(meeting_id) {
            debug!(meeting_id = %meeting_id, phase = ?self.phase, "Stale reaction outcomes discarded");
            return false;
        }
        self.outbox = None;

        let mut by_agent: BTreeMap<String, Result<String, ReasoningError>> = outcomes
            .into_iter()
            .map(|o| (o.agent_id, o.result))
            .collect();
        let participants = self
            .active
            .as_ref()
            .map(|m| m.participants.clone())
            .unwrap_or_default();

        for agent_id in participants {
            let (text, fallback) = match by_agent.remove(&agent_id) {
                Some(Ok(text)) => (text, false),
                Some(Err(err)) => {
                    warn!(agent_id = %agent_id, error = %err, "Reaction failed, showing fallback");
                    (self.config.fallback_reaction.clone(), true)
                }
                None => (self.config.fallback_reaction.clone(), true),
            };
            self.events.push(Event::ReactionAssigned {
                tick: clock.current_tick(),
                time_ms: clock.now_ms(),
                meeting_id: meeting_id.to_string(),
                agent_id: agent_id.clone(),
                text: text.clone(),
                fallback,
            });
            self.reactions.insert(agent_id, text);
        }

        self.transition(MeetingPhase::Holding, clock);
        self.schedule(self.config.hold_ms, clock);
        true
    }

    fn finish<R, C>(&mut self, clock: &SimClock, roster: &mut R, camera: &mut C)
    where
        R: AgentRoster + ?Sized,
        C: CameraControl + ?Sized,
    {
        for (agent_id, _) in roster.roster() {
            roster.set_forced_target(&agent_id, None);
        }
        self.reactions.clear();
        self.outbox = None;

        if let Some(meeting) = self.active.as_ref() {
            let saved = meeting.saved_camera;
            camera.restore_camera(saved);
            self.events.push(Event::ViewportRestored {
                tick: clock.current_tick(),
                time_ms: clock.now_ms(),
                zoom: saved.zoom,
                offset_x: saved.offset_x,
                offset_y: saved.offset_y,
            });
        }
        camera.set_input_suspended(false);
        self.transition(MeetingPhase::Idle, clock);
        self.active = None;
    }
}
