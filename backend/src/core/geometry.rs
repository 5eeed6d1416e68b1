//! Plane geometry shared by the viewport and the motion simulator
//!
//! Map space and screen space both use `Point`; which space a value lives in
//! is carried by the name of the field or argument, not by the type.

use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// A 2D point (map units or screen pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Move a fraction `rate` of the way towards `target`, per axis
    ///
    /// # Example
    /// ```
    /// use virtual_office_core::Point;
    ///
    /// let p = Point::new(0.0, 100.0).approach(Point::new(100.0, 0.0), 0.5);
    /// assert_eq!(p, Point::new(50.0, 50.0));
    /// ```
    pub fn approach(&self, target: Point, rate: f64) -> Point {
        Point {
            x: self.x + (target.x - self.x) * rate,
            y: self.y + (target.y - self.y) * rate,
        }
    }
}

/// Axis-aligned walkable rectangle of the floor (inclusive on all edges)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Walkable area of a `width × height` floor with the given margins
    ///
    /// # Example
    /// ```
    /// use virtual_office_core::Bounds;
    ///
    /// let b = Bounds::floor(3000.0, 2000.0, 200.0, 200.0);
    /// assert_eq!((b.min_x, b.max_x), (200.0, 2800.0));
    /// assert_eq!((b.min_y, b.max_y), (200.0, 1800.0));
    /// ```
    pub fn floor(width: f64, height: f64, margin_x: f64, margin_y: f64) -> Self {
        Self {
            min_x: margin_x,
            max_x: width - margin_x,
            min_y: margin_y,
            max_y: height - margin_y,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Nearest point inside the bounds
    pub fn clamp(&self, p: Point) -> Point {
        Point {
            x: p.x.clamp(self.min_x, self.max_x),
            y: p.y.clamp(self.min_y, self.max_y),
        }
    }

    /// Uniformly distributed point inside the bounds
    pub fn random_point(&self, rng: &mut RngManager) -> Point {
        Point {
            x: rng.uniform(self.min_x, self.max_x),
            y: rng.uniform(self.min_y, self.max_y),
        }
    }
}
