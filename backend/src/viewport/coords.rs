//! Screen ⇄ map coordinate conversion
//!
//! Stateless and total: every function is defined for any finite input and
//! any viewport with a non-zero zoom (the controller never produces one).

use super::ViewportState;
use crate::core::geometry::Point;

/// Map point currently drawn under a screen point
///
/// # Example
/// ```
/// use virtual_office_core::viewport::{map_point_under_screen_point, ViewportState};
/// use virtual_office_core::Point;
///
/// let vp = ViewportState::new(2.0, 100.0, -50.0);
/// let map = map_point_under_screen_point(Point::new(300.0, 150.0), &vp);
/// assert_eq!(map, Point::new(100.0, 100.0));
/// ```
pub fn map_point_under_screen_point(screen: Point, viewport: &ViewportState) -> Point {
    Point {
        x: (screen.x - viewport.offset_x) / viewport.zoom,
        y: (screen.y - viewport.offset_y) / viewport.zoom,
    }
}

/// Screen point a map point is drawn at
pub fn screen_point_for_map_point(map: Point, viewport: &ViewportState) -> Point {
    Point {
        x: map.x * viewport.zoom + viewport.offset_x,
        y: map.y * viewport.zoom + viewport.offset_y,
    }
}

/// Offset that draws `map` exactly at `screen` under `zoom`
///
/// Used both for pivot-preserving zoom and for centring the camera.
pub fn offset_pinning(map: Point, screen: Point, zoom: f64) -> (f64, f64) {
    (screen.x - map.x * zoom, screen.y - map.y * zoom)
}
