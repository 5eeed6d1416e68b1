//! Event logging for replay and inspection.
//!
//! Every significant state change in the office is captured as an `Event`.
//! The log is in-memory and append-only for the session; it complements the
//! `tracing` output with typed records tests and tools can query.
//!
//! # Example
//!
//! ```rust
//! use virtual_office_core::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::NoticeSubmitted {
//!     tick: 10,
//!     time_ms: 160,
//!     notice_id: "n1".to_string(),
//!     category: "emergency meeting".to_string(),
//! });
//!
//! assert_eq!(log.events_of_type("NoticeSubmitted").len(), 1);
//! ```

use crate::core::geometry::Point;
use crate::orchestrator::MeetingPhase;
use serde::{Deserialize, Serialize};

/// Office event capturing a state change.
///
/// All events carry the tick and simulated time at which they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Agent added to the floor
    AgentSpawned {
        tick: u64,
        time_ms: u64,
        agent_id: String,
        position: Point,
    },

    /// Notice posted on the bulletin board
    NoticeSubmitted {
        tick: u64,
        time_ms: u64,
        notice_id: String,
        category: String,
    },

    /// Notice did not start a meeting
    NoticeIgnored {
        tick: u64,
        time_ms: u64,
        notice_id: String,
        reason: String,
    },

    /// Meeting moved to a new phase
    PhaseChanged {
        tick: u64,
        time_ms: u64,
        meeting_id: String,
        from: MeetingPhase,
        to: MeetingPhase,
    },

    /// Reaction text assigned to an agent once the fan-out settled
    ReactionAssigned {
        tick: u64,
        time_ms: u64,
        meeting_id: String,
        agent_id: String,
        text: String,
        fallback: bool,
    },

    /// Agent answered a chat message
    ChatReply {
        tick: u64,
        time_ms: u64,
        agent_id: String,
        text: String,
    },

    /// Agent settled on a new thought after a chat turn
    ThoughtRecorded {
        tick: u64,
        time_ms: u64,
        agent_id: String,
        thought_tag: String,
        action_tag: String,
    },

    /// Camera put back where it was before a meeting
    ViewportRestored {
        tick: u64,
        time_ms: u64,
        zoom: f64,
        offset_x: f64,
        offset_y: f64,
    },
}

impl Event {
    /// Get the tick number when this event occurred
    pub fn tick(&self) -> u64 {
        match self {
            Event::AgentSpawned { tick, .. }
            | Event::NoticeSubmitted { tick, .. }
            | Event::NoticeIgnored { tick, .. }
            | Event::PhaseChanged { tick, .. }
            | Event::ReactionAssigned { tick, .. }
            | Event::ChatReply { tick, .. }
            | Event::ThoughtRecorded { tick, .. }
            | Event::ViewportRestored { tick, .. } => *tick,
        }
    }

    /// Get the simulated time when this event occurred
    pub fn time_ms(&self) -> u64 {
        match self {
            Event::AgentSpawned { time_ms, .. }
            | Event::NoticeSubmitted { time_ms, .. }
            | Event::NoticeIgnored { time_ms, .. }
            | Event::PhaseChanged { time_ms, .. }
            | Event::ReactionAssigned { time_ms, .. }
            | Event::ChatReply { time_ms, .. }
            | Event::ThoughtRecorded { time_ms, .. }
            | Event::ViewportRestored { time_ms, .. } => *time_ms,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::AgentSpawned { .. } => "AgentSpawned",
            Event::NoticeSubmitted { .. } => "NoticeSubmitted",
            Event::NoticeIgnored { .. } => "NoticeIgnored",
            Event::PhaseChanged { .. } => "PhaseChanged",
            Event::ReactionAssigned { .. } => "ReactionAssigned",
            Event::ChatReply { .. } => "ChatReply",
            Event::ThoughtRecorded { .. } => "ThoughtRecorded",
            Event::ViewportRestored { .. } => "ViewportRestored",
        }
    }

    /// Get the agent this event concerns (if any)
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Event::AgentSpawned { agent_id, .. }
            | Event::ReactionAssigned { agent_id, .. }
            | Event::ChatReply { agent_id, .. }
            | Event::ThoughtRecorded { agent_id, .. } => Some(agent_id.as_str()),
            _ => None,
        }
    }
}

/// Append-only log of office events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific tick
    pub fn events_at_tick(&self, tick: u64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific agent
    pub fn events_for_agent(&self, agent_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.agent_id() == Some(agent_id))
            .collect()
    }

    /// Phase transitions in the order they happened
    pub fn phase_sequence(&self) -> Vec<MeetingPhase> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::PhaseChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawned(tick: u64, agent_id: &str) -> Event {
        Event::AgentSpawned {
            tick,
            time_ms: tick * 16,
            agent_id: agent_id.to_string(),
            position: Point::new(500.0, 500.0),
        }
    }

    #[test]
    fn test_event_accessors() {
        let event = spawned(42, "a1");
        assert_eq!(event.tick(), 42);
        assert_eq!(event.time_ms(), 672);
        assert_eq!(event.event_type(), "AgentSpawned");
        assert_eq!(event.agent_id(), Some("a1"));
    }

    #[test]
    fn test_filter_by_agent_and_tick() {
        let mut log = EventLog::new();
        log.log(spawned(1, "a1"));
        log.log(spawned(1, "a2"));
        log.log(spawned(2, "a1"));

        assert_eq!(log.events_for_agent("a1").len(), 2);
        assert_eq!(log.events_at_tick(1).len(), 2);
        assert!(log.phase_sequence().is_empty());
    }

    #[test]
    fn test_phase_sequence_follows_log_order() {
        let mut log = EventLog::new();
        for (from, to) in [
            (MeetingPhase::Idle, MeetingPhase::FadingIn),
            (MeetingPhase::FadingIn, MeetingPhase::Convening),
        ] {
            log.log(Event::PhaseChanged {
                tick: 0,
                time_ms: 0,
                meeting_id: "m".to_string(),
                from,
                to,
            });
        }
        assert_eq!(
            log.phase_sequence(),
            vec![MeetingPhase::FadingIn, MeetingPhase::Convening]
        );
    }
}
