//! Viewport controller
//!
//! Single writer of the camera transform. User input (wheel, drag, zoom
//! buttons) goes through the `on_*`/`zoom_*`/`pan_by` entry points, which
//! are ignored while input is suspended for a meeting fade. Programmatic
//! moves (`center_on`, `restore`) always apply.
//!
//! # Invariants
//!
//! 1. `min_zoom <= zoom <= max_zoom` after every operation
//! 2. Pivoted zoom keeps the map point under the pivot on the same screen pixel

use super::coords::{map_point_under_screen_point, offset_pinning};
use super::ViewportState;
use crate::config::ViewportConfig;
use crate::core::geometry::Point;
use tracing::debug;

/// Reference captured when a drag starts
#[derive(Debug, Clone, Copy)]
struct DragSession {
    anchor: Point,
    start_offset_x: f64,
    start_offset_y: f64,
}

/// Owns zoom and pan offset for the session
///
/// # Example
/// ```
/// use virtual_office_core::config::ViewportConfig;
/// use virtual_office_core::viewport::ViewportController;
/// use virtual_office_core::Point;
///
/// let mut vp = ViewportController::new(&ViewportConfig::default(), Point::new(1500.0, 1000.0));
/// vp.zoom_by(10.0, None);
/// assert_eq!(vp.zoom(), 2.0); // clamped to max_zoom
/// ```
#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewportState,
    screen_width: f64,
    screen_height: f64,
    min_zoom: f64,
    max_zoom: f64,
    wheel_step: f64,
    button_step: f64,
    input_suspended: bool,
    drag: Option<DragSession>,
}

impl ViewportController {
    /// Camera at `default_zoom`, centred on `home`
    pub fn new(config: &ViewportConfig, home: Point) -> Self {
        let mut controller = Self {
            state: ViewportState::new(config.default_zoom, 0.0, 0.0),
            screen_width: config.screen_width,
            screen_height: config.screen_height,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            wheel_step: config.wheel_step,
            button_step: config.button_step,
            input_suspended: false,
            drag: None,
        };
        controller.center_on(home, Some(config.default_zoom));
        controller
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_input_suspended(&self) -> bool {
        self.input_suspended
    }

    /// Midpoint of the visible surface in screen coordinates
    pub fn screen_center(&self) -> Point {
        Point::new(self.screen_width / 2.0, self.screen_height / 2.0)
    }

    /// Suspend or resume user input; suspending abandons any drag in progress
    pub fn set_input_suspended(&mut self, suspended: bool) {
        self.input_suspended = suspended;
        if suspended {
            self.drag = None;
        }
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Change zoom by `delta`, keeping the map point under `pivot` in place
    ///
    /// Without a pivot the screen centre is used. Returns whether the zoom
    /// actually changed; a request at a zoom bound is a no-op.
    pub fn zoom_by(&mut self, delta: f64, pivot: Option<Point>) -> bool {
        if self.input_suspended {
            return false;
        }
        let new_zoom = self.clamp_zoom(self.state.zoom + delta);
        if new_zoom == self.state.zoom {
            return false;
        }

        let pivot = pivot.unwrap_or_else(|| self.screen_center());
        let anchored = map_point_under_screen_point(pivot, &self.state);
        let (offset_x, offset_y) = offset_pinning(anchored, pivot, new_zoom);

        // Keep an active drag consistent with the shifted offset
        if let Some(drag) = self.drag.as_mut() {
            drag.start_offset_x += offset_x - self.state.offset_x;
            drag.start_offset_y += offset_y - self.state.offset_y;
        }

        self.state = ViewportState::new(new_zoom, offset_x, offset_y);
        true
    }

    /// Shift the view by a screen-space delta
    ///
    /// The offset is already in zoom-scaled screen units, so the delta is
    /// applied as-is.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if self.input_suspended {
            return;
        }
        self.state.offset_x += dx;
        self.state.offset_y += dy;
    }

    /// Put `map` at the middle of the screen, optionally switching zoom
    pub fn center_on(&mut self, map: Point, target_zoom: Option<f64>) {
        let zoom = self.clamp_zoom(target_zoom.unwrap_or(self.state.zoom));
        let (offset_x, offset_y) = offset_pinning(map, self.screen_center(), zoom);
        self.state = ViewportState::new(zoom, offset_x, offset_y);
        debug!(x = map.x, y = map.y, zoom, "Camera centred");
    }

    /// Jump back to a previously saved transform
    pub fn restore(&mut self, saved: ViewportState) {
        self.state = ViewportState::new(self.clamp_zoom(saved.zoom), saved.offset_x, saved.offset_y);
    }

    /// Resize the visible surface; the map point at the old centre stays centred
    pub fn resize(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let centred = map_point_under_screen_point(self.screen_center(), &self.state);
        self.screen_width = width;
        self.screen_height = height;
        self.center_on(centred, None);
    }

    pub fn begin_drag(&mut self, screen: Point) {
        if self.input_suspended {
            return;
        }
        self.drag = Some(DragSession {
            anchor: screen,
            start_offset_x: self.state.offset_x,
            start_offset_y: self.state.offset_y,
        });
    }

    /// Move the view so the map follows the pointer since `begin_drag`
    ///
    /// The offset is recomputed from the drag's starting reference, so
    /// repeated moves never accumulate rounding drift.
    pub fn drag_to(&mut self, screen: Point) {
        if self.input_suspended {
            return;
        }
        if let Some(drag) = self.drag {
            self.state.offset_x = drag.start_offset_x + (screen.x - drag.anchor.x);
            self.state.offset_y = drag.start_offset_y + (screen.y - drag.anchor.y);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    // ------------------------------------------------------------------
    // Raw pointer handlers for the rendered surface
    // ------------------------------------------------------------------

    /// Wheel notch at `screen`: scrolling down zooms out, up zooms in
    pub fn on_wheel(&mut self, delta_y: f64, screen: Point) {
        if delta_y == 0.0 {
            return;
        }
        let step = if delta_y > 0.0 {
            -self.wheel_step
        } else {
            self.wheel_step
        };
        self.zoom_by(step, Some(screen));
    }

    pub fn on_pointer_down(&mut self, screen: Point) {
        self.begin_drag(screen);
    }

    pub fn on_pointer_move(&mut self, screen: Point) {
        self.drag_to(screen);
    }

    pub fn on_pointer_up(&mut self) {
        self.end_drag();
    }

    /// Zoom-in button
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.button_step, None)
    }

    /// Zoom-out button
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(-self.button_step, None)
    }
}
