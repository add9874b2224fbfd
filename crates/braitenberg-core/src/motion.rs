//! Differential-drive wheel velocities and pose integration.

use serde::{Deserialize, Serialize};

use crate::geometry::Pose;

/// Smallest half-axle used when turning wheel speed differences into rotation.
const MIN_HALF_AXLE: f32 = 1.0;

/// Left/right wheel speeds in px/tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct WheelVelocity {
    pub left: f32,
    pub right: f32,
}

impl WheelVelocity {
    #[must_use]
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Mean of both wheels, i.e. forward speed.
    #[must_use]
    pub fn forward(&self) -> f32 {
        (self.left + self.right) * 0.5
    }
}

/// Owns an entity's current wheel velocity and enforces its speed limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MotionHandler {
    velocity: WheelVelocity,
    min_speed: f32,
    max_speed: f32,
    speed_delta: f32,
    angle_delta: f32,
}

impl MotionHandler {
    #[must_use]
    pub fn new(min_speed: f32, max_speed: f32, speed_delta: f32, angle_delta: f32) -> Self {
        Self {
            velocity: WheelVelocity::zero(),
            min_speed,
            max_speed,
            speed_delta,
            angle_delta,
        }
    }

    #[must_use]
    pub const fn velocity(&self) -> WheelVelocity {
        self.velocity
    }

    #[must_use]
    pub const fn max_speed(&self) -> f32 {
        self.max_speed
    }

    #[must_use]
    pub const fn min_speed(&self) -> f32 {
        self.min_speed
    }

    pub fn stop(&mut self) {
        self.velocity = WheelVelocity::zero();
    }

    /// Apply a behavior-derived command, clamped to the speed limits.
    pub fn update_velocity(&mut self, velocity: WheelVelocity) {
        self.velocity = self.clamp_velocities(velocity);
    }

    /// Apply a command as-is; used for forced post-collision manoeuvres.
    pub fn update_velocity_override(&mut self, velocity: WheelVelocity) {
        self.velocity = velocity;
    }

    pub fn increase_speed(&mut self) {
        self.velocity = WheelVelocity::new(
            self.clamp_wheel(self.velocity.left + self.speed_delta),
            self.clamp_wheel(self.velocity.right + self.speed_delta),
        );
    }

    pub fn decrease_speed(&mut self) {
        self.velocity = WheelVelocity::new(
            self.clamp_wheel(self.velocity.left - self.speed_delta),
            self.clamp_wheel(self.velocity.right - self.speed_delta),
        );
    }

    pub fn turn_left(&mut self) {
        self.velocity = WheelVelocity::new(
            self.clamp_wheel(self.velocity.left - self.angle_delta),
            self.clamp_wheel(self.velocity.right + self.angle_delta),
        );
    }

    pub fn turn_right(&mut self) {
        self.velocity = WheelVelocity::new(
            self.clamp_wheel(self.velocity.left + self.angle_delta),
            self.clamp_wheel(self.velocity.right - self.angle_delta),
        );
    }

    /// Floor each wheel at the minimum speed, then scale both wheels by the
    /// same factor when either exceeds the maximum so the turn ratio holds.
    #[must_use]
    pub fn clamp_velocities(&self, velocity: WheelVelocity) -> WheelVelocity {
        let floor = |value: f32| {
            if value.is_nan() || value < self.min_speed {
                self.min_speed
            } else {
                value
            }
        };
        let mut left = floor(velocity.left);
        let mut right = floor(velocity.right);
        let fastest = left.max(right);
        if fastest > self.max_speed {
            let scale = self.max_speed / fastest;
            left = (left * scale).max(self.min_speed);
            right = (right * scale).max(self.min_speed);
        }
        WheelVelocity::new(left, right)
    }

    fn clamp_wheel(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min_speed;
        }
        value.clamp(self.min_speed, self.max_speed)
    }
}

/// Advance `pose` by `dt` ticks of differential drive: translate along the
/// heading by the mean wheel speed, rotate by the wheel difference over the
/// axle (two body radii). The arena is y-down, so a faster right wheel
/// lowers the heading and turns the robot towards its left side.
pub fn integrate_pose(pose: &mut Pose, radius: f32, velocity: WheelVelocity, dt: f32) {
    if !(dt > 0.0) {
        return;
    }
    let half_axle = radius.max(MIN_HALF_AXLE);
    let heading = pose.heading_radians();
    let forward = velocity.forward() * dt;
    let x = pose.x() + forward * heading.cos();
    let y = pose.y() + forward * heading.sin();
    if !(x.is_finite() && y.is_finite()) {
        return;
    }
    pose.set_position(x, y);
    let angular = (velocity.left - velocity.right) / (2.0 * half_axle) * dt;
    if angular.is_finite() {
        pose.rotate(angular.to_degrees());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> MotionHandler {
        MotionHandler::new(0.0, 10.0, 1.0, 1.0)
    }

    #[test]
    fn clamp_scales_both_wheels_and_keeps_ratio() {
        let mut motion = handler();
        motion.update_velocity(WheelVelocity::new(20.0, 10.0));
        let v = motion.velocity();
        assert_eq!(v.left, 10.0);
        assert_eq!(v.right, 5.0);

        motion.update_velocity(WheelVelocity::new(4.0, 40.0));
        let v = motion.velocity();
        assert!((v.left - 1.0).abs() < 1e-5);
        assert_eq!(v.right, 10.0);
    }

    #[test]
    fn clamp_floors_negative_wheels() {
        let mut motion = handler();
        motion.update_velocity(WheelVelocity::new(-3.0, 6.0));
        assert_eq!(motion.velocity(), WheelVelocity::new(0.0, 6.0));
        motion.update_velocity(WheelVelocity::new(f32::NAN, -1.0));
        assert_eq!(motion.velocity(), WheelVelocity::zero());
    }

    #[test]
    fn clamp_never_reverses_turn_direction() {
        let motion = handler();
        let samples = [
            (0.0, 0.0),
            (3.0, 7.0),
            (70.0, 12.0),
            (-5.0, 25.0),
            (11.0, 10.5),
            (60.0, 60.0),
        ];
        for (left, right) in samples {
            let clamped = motion.clamp_velocities(WheelVelocity::new(left, right));
            assert!((0.0..=10.0).contains(&clamped.left));
            assert!((0.0..=10.0).contains(&clamped.right));
            let before = (left.max(0.0) - right.max(0.0)).signum();
            let after = clamped.left - clamped.right;
            if after != 0.0 {
                assert_eq!(before, after.signum(), "turn flipped for ({left}, {right})");
            }
        }
    }

    #[test]
    fn override_bypasses_limits() {
        let mut motion = handler();
        motion.update_velocity_override(WheelVelocity::new(-10.0, -9.0));
        assert_eq!(motion.velocity(), WheelVelocity::new(-10.0, -9.0));
    }

    #[test]
    fn manual_commands_clamp_each_wheel() {
        let mut motion = handler();
        motion.decrease_speed();
        assert_eq!(motion.velocity(), WheelVelocity::zero());
        for _ in 0..12 {
            motion.increase_speed();
        }
        assert_eq!(motion.velocity(), WheelVelocity::new(10.0, 10.0));
        motion.turn_left();
        assert_eq!(motion.velocity(), WheelVelocity::new(9.0, 10.0));
        motion.turn_right();
        motion.turn_right();
        assert_eq!(motion.velocity(), WheelVelocity::new(10.0, 8.0));
    }

    #[test]
    fn equal_wheels_drive_straight() {
        let mut pose = Pose::new(100.0, 100.0, 0.0);
        integrate_pose(&mut pose, 10.0, WheelVelocity::new(5.0, 5.0), 1.0);
        assert!((pose.x() - 105.0).abs() < 1e-4);
        assert!((pose.y() - 100.0).abs() < 1e-4);
        assert_eq!(pose.heading(), 0.0);

        let mut pose = Pose::new(100.0, 100.0, 90.0);
        integrate_pose(&mut pose, 10.0, WheelVelocity::new(2.0, 2.0), 1.0);
        assert!((pose.x() - 100.0).abs() < 1e-4);
        assert!((pose.y() - 102.0).abs() < 1e-4);
    }

    #[test]
    fn faster_right_wheel_turns_left() {
        let mut pose = Pose::new(0.0, 0.0, 0.0);
        integrate_pose(&mut pose, 10.0, WheelVelocity::new(2.0, 4.0), 1.0);
        let expected = 360.0 - (2.0_f32 / 20.0).to_degrees();
        assert!((pose.heading() - expected).abs() < 1e-3);

        let mut pose = Pose::new(0.0, 0.0, 0.0);
        integrate_pose(&mut pose, 10.0, WheelVelocity::new(4.0, 2.0), 1.0);
        let expected = (2.0_f32 / 20.0).to_degrees();
        assert!((pose.heading() - expected).abs() < 1e-3);
    }

    #[test]
    fn non_positive_dt_is_ignored() {
        let mut pose = Pose::new(1.0, 2.0, 30.0);
        integrate_pose(&mut pose, 10.0, WheelVelocity::new(5.0, 5.0), 0.0);
        integrate_pose(&mut pose, 10.0, WheelVelocity::new(5.0, 5.0), -1.0);
        assert_eq!(pose, Pose::new(1.0, 2.0, 30.0));
    }
}
