use serde::{Deserialize, Serialize};

/// Screen-space position. Which way `y` grows is up to the host; the
/// selection strategies document the convention they assume.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let d = self.offset_from(other);
        d.x.hypot(d.y)
    }
}

/// Angle of `(dx, dy)` in degrees, normalized to `[0, 360)`.
pub fn angle_degrees(dx: f64, dy: f64) -> f64 {
    let angle = dy.atan2(dx).to_degrees();
    let angle = if angle < 0.0 { angle + 360.0 } else { angle };
    // -0.0 and tiny negatives round up to exactly 360
    if angle >= 360.0 { 0.0 } else { angle }
}

/// Wraps any angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest unsigned distance between two angles in degrees.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    ((a - b + 180.0).rem_euclid(360.0) - 180.0).abs()
}
