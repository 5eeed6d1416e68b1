//! Office configuration
//!
//! Every section deserializes with defaults, so a config file only needs the
//! fields it overrides:
//!
//! ```
//! use virtual_office_core::OfficeConfig;
//!
//! let config = OfficeConfig::from_json_str(r#"{ "rng_seed": 7, "meeting": { "hold_ms": 5000 } }"#).unwrap();
//! assert_eq!(config.rng_seed, 7);
//! assert_eq!(config.meeting.hold_ms, 5000);
//! assert_eq!(config.map.floor_width, 3000.0);
//! ```

mod validation;

use crate::core::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid floor: {0}")]
    InvalidFloor(String),

    #[error("Invalid screen size: {width}x{height}")]
    InvalidScreen { width: f64, height: f64 },

    #[error("Invalid zoom range: min {min}, max {max}")]
    InvalidZoomRange { min: f64, max: f64 },

    #[error("{field} = {value} is outside the zoom range [{min}, {max}]")]
    ZoomOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid motion config: {0}")]
    InvalidMotion(String),

    #[error("Invalid meeting config: {0}")]
    InvalidMeeting(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Complete office configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Seed for every random draw (spawn points, wander targets and intervals)
    pub rng_seed: u64,
    pub map: MapConfig,
    pub viewport: ViewportConfig,
    pub motion: MotionConfig,
    pub meeting: MeetingConfig,
    pub reasoning: ReasoningConfig,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            map: MapConfig::default(),
            viewport: ViewportConfig::default(),
            motion: MotionConfig::default(),
            meeting: MeetingConfig::default(),
            reasoning: ReasoningConfig::default(),
        }
    }
}

impl OfficeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Walkable floor area
    pub fn floor_bounds(&self) -> Bounds {
        Bounds::floor(
            self.map.floor_width,
            self.map.floor_height,
            self.map.margin_x,
            self.map.margin_y,
        )
    }

    /// Where agents converge for a meeting (the central plaza unless overridden)
    pub fn rally_point(&self) -> Point {
        self.meeting.rally_point.unwrap_or(self.map.central_plaza)
    }
}

/// Floor plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub floor_width: f64,
    pub floor_height: f64,
    /// Agents never walk closer than this to the left/right walls
    pub margin_x: f64,
    /// Agents never walk closer than this to the top/bottom walls
    pub margin_y: f64,
    /// Point the camera starts on and resets to
    pub central_plaza: Point,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            floor_width: 3000.0,
            floor_height: 2000.0,
            margin_x: 200.0,
            margin_y: 200.0,
            central_plaza: Point::new(1500.0, 1000.0),
        }
    }
}

/// Camera limits and input steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub screen_width: f64,
    pub screen_height: f64,
    pub default_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per wheel notch
    pub wheel_step: f64,
    /// Zoom change per zoom-button press
    pub button_step: f64,
    /// Zoom used when the camera jumps to a selected agent
    pub focus_zoom: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280.0,
            screen_height: 800.0,
            default_zoom: 0.8,
            min_zoom: 0.3,
            max_zoom: 2.0,
            wheel_step: 0.05,
            button_step: 0.2,
            focus_zoom: 1.0,
        }
    }
}

/// Agent movement tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Fraction of the remaining distance covered each tick
    pub lerp_rate: f64,
    /// Below this distance an agent counts as arrived and stops moving
    pub arrive_threshold: f64,
    /// Minimum travel between two position notifications
    pub notify_distance: f64,
    pub wander_min_ms: u64,
    pub wander_max_ms: u64,
    /// How long the speaking wobble lasts once triggered
    pub wobble_ms: u64,
    /// Distance to target above which an agent is drawn walking
    pub walking_threshold: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            lerp_rate: 0.02,
            arrive_threshold: 1.0,
            notify_distance: 50.0,
            wander_min_ms: 4000,
            wander_max_ms: 7000,
            wobble_ms: 2000,
            walking_threshold: 10.0,
        }
    }
}

/// Emergency meeting choreography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    /// Notice category that starts a meeting
    pub trigger_category: String,
    /// Defaults to the map's central plaza
    pub rally_point: Option<Point>,
    /// Agents spread on a circle of this radius around the rally point
    pub rally_radius: f64,
    pub elevated_zoom: f64,
    pub fade_ms: u64,
    pub hold_ms: u64,
    /// Shown for agents whose reaction request failed
    pub fallback_reaction: String,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            trigger_category: "emergency meeting".to_string(),
            rally_point: None,
            rally_radius: 150.0,
            elevated_zoom: 1.2,
            fade_ms: 600,
            hold_ms: 15_000,
            fallback_reaction: "Bleep?!".to_string(),
        }
    }
}

/// Retry policy and canned replies for the reasoning client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles after each further failure
    pub initial_backoff_ms: u64,
    /// Upper bound on a single attempt
    pub attempt_timeout_ms: u64,
    /// Used when the client answers with an empty text
    pub empty_reaction: String,
    /// Chat reply used when every attempt failed
    pub chat_fallback: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            attempt_timeout_ms: 10_000,
            empty_reaction: "That's big news!".to_string(),
            chat_fallback: "Bzzt... bad signal, try again!".to_string(),
        }
    }
}

impl ReasoningConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}
