//! Distance-based intensity sensors mounted on a robot's rim.

use serde::{Deserialize, Serialize};

use crate::config::SensorConfig;
use crate::entity::Rgb;
use crate::geometry::{Pose, Position};

/// Radius used when drawing a sensor.
pub const SENSOR_DRAW_RADIUS: f32 = 3.0;

/// Which sources a sensor listens to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Light,
    Food,
}

impl SensorKind {
    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            Self::Light => [255, 255, 255],
            Self::Food => [255, 0, 0],
        }
    }
}

/// Accumulates `sensitivity / distance^exponent` for every source it is
/// notified of during one sensing phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sensor {
    kind: SensorKind,
    position: Position,
    angle_offset: f32,
    mount_radius: f32,
    sensitivity: f32,
    exponent: f32,
    min_distance: f32,
    reading: f32,
}

impl Sensor {
    #[must_use]
    pub fn new(kind: SensorKind, angle_offset: f32, config: &SensorConfig) -> Self {
        let sensitivity = match kind {
            SensorKind::Light => config.light_sensitivity,
            SensorKind::Food => config.food_sensitivity,
        };
        Self {
            kind,
            position: Position::default(),
            angle_offset,
            mount_radius: 0.0,
            sensitivity,
            exponent: config.exponent,
            min_distance: config.min_distance,
            reading: 0.0,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SensorKind {
        self.kind
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Place the sensor directly; mostly useful in tests.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    #[must_use]
    pub const fn angle_offset(&self) -> f32 {
        self.angle_offset
    }

    #[must_use]
    pub const fn reading(&self) -> f32 {
        self.reading
    }

    #[must_use]
    pub const fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    pub fn set_mount_radius(&mut self, radius: f32) {
        self.mount_radius = radius;
    }

    /// Move the sensor onto the robot's rim at `heading + angle_offset`.
    pub fn mount(&mut self, robot: &Pose) {
        let angle = (robot.heading() + self.angle_offset).to_radians();
        self.position = Position::new(
            robot.x() + self.mount_radius * angle.cos(),
            robot.y() + self.mount_radius * angle.sin(),
        );
    }

    /// Reset the accumulated reading; called at the start of each sensing phase.
    pub fn clear(&mut self) {
        self.reading = 0.0;
    }

    /// Add the contribution of one source located at `source`.
    pub fn notify(&mut self, source: Position) {
        let distance = self.position.distance(source).max(self.min_distance);
        let contribution = self.sensitivity / distance.powf(self.exponent);
        if contribution.is_finite() {
            self.reading += contribution;
        }
    }
}

/// The four sensors a robot carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SensorArray {
    pub left_light: Sensor,
    pub right_light: Sensor,
    pub left_food: Sensor,
    pub right_food: Sensor,
}

impl SensorArray {
    /// Left sensors sit at `-angle_offset`, right sensors at `+angle_offset`.
    #[must_use]
    pub fn new(config: &SensorConfig) -> Self {
        let offset = config.angle_offset;
        Self {
            left_light: Sensor::new(SensorKind::Light, -offset, config),
            right_light: Sensor::new(SensorKind::Light, offset, config),
            left_food: Sensor::new(SensorKind::Food, -offset, config),
            right_food: Sensor::new(SensorKind::Food, offset, config),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sensor> {
        [
            &self.left_light,
            &self.right_light,
            &self.left_food,
            &self.right_food,
        ]
        .into_iter()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sensor> {
        [
            &mut self.left_light,
            &mut self.right_light,
            &mut self.left_food,
            &mut self.right_food,
        ]
        .into_iter()
    }

    pub fn set_mount_radius(&mut self, radius: f32) {
        for sensor in self.iter_mut() {
            sensor.set_mount_radius(radius);
        }
    }

    pub fn mount(&mut self, robot: &Pose) {
        for sensor in self.iter_mut() {
            sensor.mount(robot);
        }
    }

    pub fn clear(&mut self) {
        for sensor in self.iter_mut() {
            sensor.clear();
        }
    }

    pub fn set_light_sensitivity(&mut self, sensitivity: f32) {
        self.left_light.set_sensitivity(sensitivity);
        self.right_light.set_sensitivity(sensitivity);
    }

    /// Feed one sensing phase: clear, then accumulate every light and food source.
    pub fn sense(&mut self, robot: &Pose, lights: &[Position], foods: &[Position]) {
        self.mount(robot);
        self.clear();
        for &light in lights {
            self.left_light.notify(light);
            self.right_light.notify(light);
        }
        for &food in foods {
            self.left_food.notify(food);
            self.right_food.notify(food);
        }
    }

    #[must_use]
    pub fn light_readings(&self) -> (f32, f32) {
        (self.left_light.reading(), self.right_light.reading())
    }

    #[must_use]
    pub fn food_readings(&self) -> (f32, f32) {
        (self.left_food.reading(), self.right_food.reading())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_sensor_at(x: f32, y: f32) -> Sensor {
        let mut sensor = Sensor::new(SensorKind::Light, 0.0, &SensorConfig::default());
        sensor.set_position(Position::new(x, y));
        sensor
    }

    #[test]
    fn close_medium_and_far_sources() {
        let mut close = light_sensor_at(100.0, 100.0);
        close.notify(Position::new(110.0, 100.0));
        assert!(close.reading() > 50.0);

        let mut medium = light_sensor_at(100.0, 100.0);
        medium.notify(Position::new(400.0, 100.0));
        assert!(medium.reading() > 2.0);

        let mut far = light_sensor_at(100.0, 100.0);
        far.notify(Position::new(750.0, 750.0));
        assert!(far.reading() < 2.0);
    }

    #[test]
    fn reading_strictly_decreases_with_distance() {
        let mut previous = f32::INFINITY;
        for step in 1..40 {
            let mut sensor = light_sensor_at(0.0, 0.0);
            sensor.notify(Position::new(step as f32 * 25.0, 0.0));
            assert!(sensor.reading() < previous);
            previous = sensor.reading();
        }
    }

    #[test]
    fn readings_accumulate_until_cleared() {
        let mut sensor = light_sensor_at(0.0, 0.0);
        sensor.notify(Position::new(100.0, 0.0));
        let single = sensor.reading();
        sensor.notify(Position::new(0.0, 100.0));
        assert!((sensor.reading() - 2.0 * single).abs() < 1e-4);
        sensor.clear();
        assert_eq!(sensor.reading(), 0.0);
    }

    #[test]
    fn coincident_source_is_floored() {
        let mut sensor = light_sensor_at(100.0, 100.0);
        sensor.notify(Position::new(100.0, 100.0));
        assert!(sensor.reading().is_finite());
        assert!((sensor.reading() - 1_200.0).abs() < 1e-3);
    }

    #[test]
    fn closer_side_reads_higher() {
        let mut left = light_sensor_at(100.0, 100.0);
        let mut right = light_sensor_at(100.0, 110.0);
        let source = Position::new(110.0, 110.0);
        left.notify(source);
        right.notify(source);
        assert!(left.reading() < right.reading());

        let mut left = light_sensor_at(100.0, 100.0);
        let mut right = light_sensor_at(100.0, 110.0);
        let source = Position::new(100.0, 105.0);
        left.notify(source);
        right.notify(source);
        assert!((left.reading() - right.reading()).abs() < 1e-4);
    }

    #[test]
    fn mounting_follows_heading_and_offset() {
        let mut sensors = SensorArray::new(&SensorConfig::default());
        sensors.set_mount_radius(10.0);
        sensors.mount(&Pose::new(50.0, 50.0, 0.0));
        let left = sensors.left_light.position();
        let right = sensors.right_light.position();
        let expected_x = 50.0 + 10.0 * 40.0_f32.to_radians().cos();
        assert!((left.x - expected_x).abs() < 1e-4);
        assert!((right.x - expected_x).abs() < 1e-4);
        assert!(left.y < 50.0);
        assert!(right.y > 50.0);
    }

    #[test]
    fn sense_resets_before_accumulating() {
        let mut sensors = SensorArray::new(&SensorConfig::default());
        sensors.set_mount_radius(10.0);
        let pose = Pose::new(200.0, 200.0, 0.0);
        let lights = [Position::new(300.0, 200.0)];
        sensors.sense(&pose, &lights, &[]);
        let first = sensors.light_readings();
        sensors.sense(&pose, &lights, &[]);
        assert_eq!(first, sensors.light_readings());
        assert_eq!(sensors.food_readings(), (0.0, 0.0));
    }
}
