//! Throttled position notifications
//!
//! Agents move every frame, but consumers that anchor UI to an agent (speech
//! bubbles, name tags) only need to hear about it after a meaningful move.
//! The simulator decides *when* to notify; this module fans each
//! notification out to the registered listeners.

use crate::core::geometry::Point;
use crate::models::agent::Facing;
use serde::{Deserialize, Serialize};

/// An agent moved far enough since its previous notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionChanged {
    pub tick: u64,
    pub agent_id: String,
    pub position: Point,
    pub facing: Facing,
}

pub type PositionListener = Box<dyn FnMut(&PositionChanged) + Send>;

/// Listener list for position notifications
#[derive(Default)]
pub struct PositionNotifier {
    listeners: Vec<PositionListener>,
}

impl PositionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: PositionListener) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver every notification to every listener, in subscription order
    pub fn dispatch(&mut self, changes: &[PositionChanged]) {
        for change in changes {
            for listener in self.listeners.iter_mut() {
                listener(change);
            }
        }
    }
}

impl std::fmt::Debug for PositionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
