//! Static arena configuration.

use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};

use crate::ArenaError;
use crate::behavior::RobotKind;
use crate::motion::WheelVelocity;

/// How a robot reacts to hitting a wall or another robot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Drive a fixed reverse arc for a number of ticks, then turn away.
    #[default]
    Reversal,
    /// Lose a life and ignore further hits until the window expires.
    Invincibility,
}

/// Initial number of entities of each kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PopulationConfig {
    pub fear_robots: u32,
    pub explore_robots: u32,
    pub love_robots: u32,
    pub aggressive_robots: u32,
    pub lights: u32,
    pub food: u32,
}

impl PopulationConfig {
    #[must_use]
    pub const fn robots(&self, kind: RobotKind) -> u32 {
        match kind {
            RobotKind::Fear => self.fear_robots,
            RobotKind::Explore => self.explore_robots,
            RobotKind::Love => self.love_robots,
            RobotKind::Aggressive => self.aggressive_robots,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            fear_robots: 5,
            explore_robots: 5,
            love_robots: 0,
            aggressive_robots: 0,
            lights: 4,
            food: 4,
        }
    }
}

/// Upper bounds enforced on reconfiguration requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PopulationLimits {
    pub max_robots_per_kind: u32,
    pub max_lights: u32,
    pub max_food: u32,
    /// Lowest accepted light sensor numerator.
    pub min_sensitivity: f32,
    /// Highest accepted light sensor numerator.
    pub max_sensitivity: f32,
}

impl Default for PopulationLimits {
    fn default() -> Self {
        Self {
            max_robots_per_kind: 5,
            max_lights: 10,
            max_food: 10,
            min_sensitivity: 1.0,
            max_sensitivity: 2_000.0,
        }
    }
}

/// Grid used when dropping entities at random: `edge_offset + k * spacing` on each axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    pub edge_offset: f32,
    pub spacing: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            edge_offset: 30.0,
            spacing: 50.0,
        }
    }
}

/// Robot body, drive and collision parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RobotConfig {
    pub min_radius: f32,
    pub max_radius: f32,
    /// Lower wheel speed bound in px/tick.
    pub min_speed: f32,
    /// Upper wheel speed bound in px/tick.
    pub max_speed: f32,
    /// Step applied by the speed up/down commands.
    pub speed_delta: f32,
    /// Step applied by the turn commands.
    pub angle_delta: f32,
    pub collision_policy: CollisionPolicy,
    /// Unclamped wheel velocity driven while reversing away from an obstacle.
    pub reversal_velocity: WheelVelocity,
    /// Length of the reversal window in ticks.
    pub reversal_ticks: u32,
    /// Degrees added to the heading once a reversal completes.
    pub reversal_heading_offset: f32,
    /// Invincibility window in seconds of simulation time.
    pub invincibility_duration: f32,
    /// Collisions a robot survives under the invincibility policy; the game
    /// is lost when any robot runs out.
    pub lives: u32,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            min_radius: 8.0,
            max_radius: 14.0,
            min_speed: 0.0,
            max_speed: 10.0,
            speed_delta: 1.0,
            angle_delta: 1.0,
            collision_policy: CollisionPolicy::Reversal,
            reversal_velocity: WheelVelocity::new(-10.0, -9.0),
            reversal_ticks: 10,
            reversal_heading_offset: 90.0,
            invincibility_duration: 2.0,
            lives: 9,
        }
    }
}

/// Hunger thresholds, all measured in ticks since the last meal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HungerConfig {
    pub hungry_after: u32,
    pub starving_after: u32,
    pub starved_after: u32,
    /// Extra distance beyond touching at which a robot can feed.
    pub feeding_margin: f32,
}

impl Default for HungerConfig {
    fn default() -> Self {
        Self {
            hungry_after: 480,
            starving_after: 1_920,
            starved_after: 2_400,
            feeding_margin: 5.0,
        }
    }
}

/// Sensor mounting and falloff parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    /// Angular offset of each sensor from the heading, in degrees.
    pub angle_offset: f32,
    /// Initial numerator for light sensors; adjustable at runtime.
    pub light_sensitivity: f32,
    /// Fixed numerator for food sensors.
    pub food_sensitivity: f32,
    /// Falloff exponent applied to the distance.
    pub exponent: f32,
    /// Distances below this floor are treated as the floor.
    pub min_distance: f32,
    /// Highest reading the negative wirings invert against.
    pub max_reading: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            angle_offset: 40.0,
            light_sensitivity: 1_200.0,
            food_sensitivity: 1_200.0,
            exponent: 1.08,
            min_distance: 1.0,
            max_reading: 60.0,
        }
    }
}

/// Light source body and arc parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    pub min_radius: f32,
    pub max_radius: f32,
    pub cruise_velocity: WheelVelocity,
    pub reverse_velocity: WheelVelocity,
    /// Reverse-arc window in seconds of simulation time.
    pub reverse_duration: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            min_radius: 10.0,
            max_radius: 50.0,
            cruise_velocity: WheelVelocity::new(2.0, 2.0),
            reverse_velocity: WheelVelocity::new(-6.0, -3.5),
            reverse_duration: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FoodConfig {
    pub radius: f32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self { radius: 20.0 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollisionConfig {
    /// Clearance added when pushing an entity out of an overlap.
    pub margin: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { margin: 5.0 }
    }
}

/// Static configuration for an arena. Immutable during a run except through
/// [`crate::Reconfiguration`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    /// Arena width in pixels.
    pub width: f32,
    /// Arena height in pixels.
    pub height: f32,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
    pub population: PopulationConfig,
    pub limits: PopulationLimits,
    pub placement: PlacementConfig,
    pub robot: RobotConfig,
    pub hunger: HungerConfig,
    pub sensor: SensorConfig,
    pub light: LightConfig,
    pub food: FoodConfig,
    pub collision: CollisionConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1_024.0,
            height: 768.0,
            rng_seed: None,
            population: PopulationConfig::default(),
            limits: PopulationLimits::default(),
            placement: PlacementConfig::default(),
            robot: RobotConfig::default(),
            hunger: HungerConfig::default(),
            sensor: SensorConfig::default(),
            light: LightConfig::default(),
            food: FoodConfig::default(),
            collision: CollisionConfig::default(),
        }
    }
}

impl ArenaConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ArenaError::InvalidConfig(
                "arena dimensions must be positive",
            ));
        }
        if self.placement.spacing <= 0.0 || self.placement.edge_offset < 0.0 {
            return Err(ArenaError::InvalidConfig(
                "placement spacing must be positive and edge offset non-negative",
            ));
        }
        if self.placement.edge_offset * 2.0 > self.width
            || self.placement.edge_offset * 2.0 > self.height
        {
            return Err(ArenaError::InvalidConfig(
                "placement edge offset does not fit inside the arena",
            ));
        }
        if self.robot.min_radius <= 0.0 || self.robot.min_radius > self.robot.max_radius {
            return Err(ArenaError::InvalidConfig(
                "robot radius range must be positive and ordered",
            ));
        }
        if self.light.min_radius <= 0.0 || self.light.min_radius > self.light.max_radius {
            return Err(ArenaError::InvalidConfig(
                "light radius range must be positive and ordered",
            ));
        }
        if self.food.radius <= 0.0 {
            return Err(ArenaError::InvalidConfig("food radius must be positive"));
        }
        if self.robot.min_speed < 0.0 || self.robot.max_speed <= self.robot.min_speed {
            return Err(ArenaError::InvalidConfig(
                "robot speeds must satisfy 0 <= min_speed < max_speed",
            ));
        }
        if self.robot.collision_policy == CollisionPolicy::Invincibility && self.robot.lives == 0 {
            return Err(ArenaError::InvalidConfig(
                "invincibility policy needs at least one life",
            ));
        }
        if self.robot.invincibility_duration < 0.0 || self.light.reverse_duration < 0.0 {
            return Err(ArenaError::InvalidConfig(
                "timer durations must be non-negative",
            ));
        }
        let hunger = &self.hunger;
        if !(hunger.hungry_after < hunger.starving_after
            && hunger.starving_after < hunger.starved_after)
        {
            return Err(ArenaError::InvalidConfig(
                "hunger thresholds must be strictly ascending",
            ));
        }
        if hunger.feeding_margin < 0.0 || self.collision.margin < 0.0 {
            return Err(ArenaError::InvalidConfig(
                "feeding and collision margins must be non-negative",
            ));
        }
        let sensor = &self.sensor;
        if sensor.exponent <= 0.0 || sensor.min_distance <= 0.0 {
            return Err(ArenaError::InvalidConfig(
                "sensor exponent and minimum distance must be positive",
            ));
        }
        if sensor.food_sensitivity <= 0.0 || sensor.max_reading <= 0.0 {
            return Err(ArenaError::InvalidConfig(
                "food sensitivity and max reading must be positive",
            ));
        }
        let limits = &self.limits;
        if limits.min_sensitivity <= 0.0 || limits.min_sensitivity > limits.max_sensitivity {
            return Err(ArenaError::InvalidConfig(
                "sensitivity limits must be positive and ordered",
            ));
        }
        if !(limits.min_sensitivity..=limits.max_sensitivity).contains(&sensor.light_sensitivity) {
            return Err(ArenaError::InvalidConfig(
                "light sensitivity must lie within the sensitivity limits",
            ));
        }
        let population = &self.population;
        let robots_in_range = RobotKind::ALL
            .iter()
            .all(|kind| population.robots(*kind) <= limits.max_robots_per_kind);
        if !robots_in_range
            || population.lights > limits.max_lights
            || population.food > limits.max_food
        {
            return Err(ArenaError::InvalidConfig(
                "initial population exceeds the configured limits",
            ));
        }
        Ok(())
    }

    /// Returns the configured RNG, seeding from entropy if no seed is set.
    pub(crate) fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}
