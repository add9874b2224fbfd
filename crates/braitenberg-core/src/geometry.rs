//! Pose and distance primitives shared by every entity.

use serde::{Deserialize, Serialize};

const FULL_TURN_DEGREES: f32 = 360.0;

/// Reduce an angle in degrees to `[0, 360)`.
#[must_use]
pub fn wrap_degrees(mut angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    angle %= FULL_TURN_DEGREES;
    if angle < 0.0 {
        angle += FULL_TURN_DEGREES;
    }
    // -0.0001 % 360 + 360 rounds up to exactly 360.0 in f32.
    if angle >= FULL_TURN_DEGREES {
        angle = 0.0;
    }
    angle
}

/// Axis-aligned 2D position in arena pixels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Construct a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// Position plus heading. Heading is in degrees and always within `[0, 360)`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    pub position: Position,
    heading: f32,
}

impl Pose {
    #[must_use]
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            position: Position::new(x, y),
            heading: wrap_degrees(heading),
        }
    }

    #[must_use]
    pub const fn x(&self) -> f32 {
        self.position.x
    }

    #[must_use]
    pub const fn y(&self) -> f32 {
        self.position.y
    }

    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    pub fn set_heading(&mut self, heading: f32) {
        self.heading = wrap_degrees(heading);
    }

    /// Rotate by `delta` degrees, keeping the heading normalised.
    pub fn rotate(&mut self, delta: f32) {
        self.set_heading(self.heading + delta);
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Position::new(x, y);
    }

    /// Heading expressed in radians.
    #[must_use]
    pub fn heading_radians(&self) -> f32 {
        self.heading.to_radians()
    }
}

/// True when two disks touch or overlap.
#[must_use]
pub fn overlaps(a: Position, radius_a: f32, b: Position, radius_b: f32) -> bool {
    a.distance(b) <= radius_a + radius_b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_degrees_reduces_into_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(450.0), 90.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(f32::NAN), 0.0);
        let tiny = wrap_degrees(-1.0e-6);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn pose_rotation_stays_normalised() {
        let mut pose = Pose::new(10.0, 20.0, 350.0);
        pose.rotate(20.0);
        assert!((pose.heading() - 10.0).abs() < 1e-4);
        pose.rotate(-30.0);
        assert!((pose.heading() - 340.0).abs() < 1e-4);
    }

    #[test]
    fn overlap_is_inclusive_at_contact() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(10.0, 0.0);
        assert!(overlaps(a, 4.0, b, 6.0));
        assert!(!overlaps(a, 4.0, b, 5.9));
        assert_eq!(a.distance(b), 10.0);
    }
}
