//! Viewport: the camera over the office floor
//!
//! - **coords**: pure conversions between screen space and map space
//! - **controller**: zoom/pan/drag state driven by pointer input and by the
//!   meeting orchestrator's camera moves
//!
//! The rendered transform is `translate(offset_x, offset_y) scale(zoom)`, so a
//! map point `m` lands on screen at `m * zoom + offset`.

pub mod controller;
pub mod coords;

pub use controller::ViewportController;
pub use coords::{map_point_under_screen_point, offset_pinning, screen_point_for_map_point};

use serde::{Deserialize, Serialize};

/// Current camera transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewportState {
    pub fn new(zoom: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            zoom,
            offset_x,
            offset_y,
        }
    }
}
