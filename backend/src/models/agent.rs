//! Agent (office avatar) model
//!
//! An agent's body (position, target, facing and its wander timer) is owned
//! by the motion simulator. The only field written from
//! outside is `forced_target`, which belongs to the meeting orchestrator and
//! reaches the agent through the simulator's override hook.
//!
//! # Invariants
//!
//! 1. `position` and `target` always lie inside the floor bounds
//! 2. `facing` only changes when a new target is set

use crate::core::geometry::Point;
use serde::{Deserialize, Serialize};

/// Horizontal direction an agent's sprite is drawn facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing for travel from `from_x` to `to_x`; `current` when there is no
    /// horizontal component.
    ///
    /// # Example
    /// ```
    /// use virtual_office_core::Facing;
    ///
    /// assert_eq!(Facing::towards(500.0, 100.0, Facing::Right), Facing::Left);
    /// assert_eq!(Facing::towards(500.0, 900.0, Facing::Left), Facing::Right);
    /// assert_eq!(Facing::towards(500.0, 500.0, Facing::Left), Facing::Left);
    /// ```
    pub fn towards(from_x: f64, to_x: f64, current: Facing) -> Facing {
        if to_x < from_x {
            Facing::Left
        } else if to_x > from_x {
            Facing::Right
        } else {
            current
        }
    }
}

/// Who currently decides where an agent walks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    /// Random wandering on the agent's own timer
    Wandering,
    /// Walking to a target imposed by the meeting orchestrator
    Forced,
}

/// Request to add an agent to the office (from the agent-creation form)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: String,
    /// Display name; also used when asking the reasoning client for a reaction
    pub name: String,
    pub color: String,
    /// Spawn point; a random walkable point when absent
    #[serde(default)]
    pub position: Option<Point>,
}

impl AgentSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            position: None,
        }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }
}

/// Live body of one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: String,
    name: String,
    color: String,
    position: Point,
    target: Point,
    facing: Facing,
    forced_target: Option<Point>,

    /// Absolute time of the next wander timer firing
    next_wander_ms: u64,
    /// Wobble animation runs until this time
    wobble_until_ms: Option<u64>,
    /// Speaking flag seen on the previous tick (wobble triggers on the rising edge)
    was_speaking: bool,
    /// Position reported by the last position notification
    last_notified: Point,
}

impl Agent {
    /// Create an agent standing still at `position`
    pub fn new(spec: AgentSpec, position: Point, next_wander_ms: u64) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            color: spec.color,
            position,
            target: position,
            facing: Facing::default(),
            forced_target: None,
            next_wander_ms,
            wobble_until_ms: None,
            was_speaking: false,
            last_notified: position,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn forced_target(&self) -> Option<Point> {
        self.forced_target
    }

    pub fn mode(&self) -> MotionMode {
        if self.forced_target.is_some() {
            MotionMode::Forced
        } else {
            MotionMode::Wandering
        }
    }

    pub fn next_wander_ms(&self) -> u64 {
        self.next_wander_ms
    }

    pub fn distance_to_target(&self) -> f64 {
        self.position.distance_to(self.target)
    }

    pub fn is_wobbling(&self, now_ms: u64) -> bool {
        self.wobble_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Set a new target and turn towards it
    pub(crate) fn retarget(&mut self, target: Point) {
        self.facing = Facing::towards(self.position.x, target.x, self.facing);
        self.target = target;
    }

    pub(crate) fn set_forced_target(&mut self, target: Option<Point>) {
        self.forced_target = target;
    }

    pub(crate) fn set_next_wander_ms(&mut self, at_ms: u64) {
        self.next_wander_ms = at_ms;
    }

    /// Advance one interpolation step; returns false once arrived
    pub(crate) fn step(&mut self, rate: f64, arrive_threshold: f64) -> bool {
        if self.distance_to_target() < arrive_threshold {
            return false;
        }
        self.position = self.position.approach(self.target, rate);
        true
    }

    /// Feed this tick's speaking flag; starts a wobble on the rising edge
    pub(crate) fn observe_speaking(&mut self, speaking: bool, now_ms: u64, wobble_ms: u64) {
        if speaking && !self.was_speaking {
            self.wobble_until_ms = Some(now_ms.saturating_add(wobble_ms));
        }
        if self.wobble_until_ms.is_some_and(|until| now_ms >= until) {
            self.wobble_until_ms = None;
        }
        self.was_speaking = speaking;
    }

    /// Record a notification if the agent travelled far enough since the last one
    pub(crate) fn take_notification(&mut self, notify_distance: f64) -> bool {
        if self.position.distance_to(self.last_notified) > notify_distance {
            self.last_notified = self.position;
            true
        } else {
            false
        }
    }
}
