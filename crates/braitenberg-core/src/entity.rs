//! Robots, lights and food, plus the walls they can bump into.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tracing::debug;

use crate::behavior::{Behavior, BehaviorKind, RobotKind};
use crate::config::{ArenaConfig, CollisionPolicy, HungerConfig};
use crate::geometry::Pose;
use crate::motion::{MotionHandler, WheelVelocity, integrate_pose};
use crate::sensor::SensorArray;

new_key_type! {
    /// Stable handle for entities backed by a generational slot map.
    pub struct EntityId;
}

/// 8-bit RGB color consumed by renderers.
pub type Rgb = [u8; 3];

const FED_COLOR: Rgb = [0, 200, 0];
const HUNGRY_COLOR: Rgb = [230, 210, 0];
const STARVING_COLOR: Rgb = [220, 0, 0];
const STARVED_COLOR: Rgb = [128, 0, 128];
const LIGHT_COLOR: Rgb = [255, 255, 255];
const FOOD_COLOR: Rgb = [255, 0, 0];
const FOOD_CAPTURED_COLOR: Rgb = [0, 255, 0];

/// Arena boundary that an entity has run into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Wall {
    Right,
    Left,
    Top,
    Bottom,
}

/// Tag describing what an entity (or collision partner) is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Robot,
    Light,
    Food,
    Wall(Wall),
}

/// Geometry shared by every entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Body {
    pub pose: Pose,
    pub radius: f32,
    pub color: Rgb,
}

/// Fresh pose and size handed out by the factory on creation or reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pose: Pose,
    pub radius: f32,
}

/// A single post-collision window. At most one window is active at a time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CollisionTimer {
    active: bool,
    start: f32,
    duration: f32,
}

impl CollisionTimer {
    #[must_use]
    pub const fn new(duration: f32) -> Self {
        Self {
            active: false,
            start: 0.0,
            duration,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn start_time(&self) -> f32 {
        self.start
    }

    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    /// Open (or reopen) the window at `now`.
    pub fn start(&mut self, now: f32) {
        self.active = true;
        self.start = now;
    }

    #[must_use]
    pub fn expired(&self, now: f32) -> bool {
        now >= self.start + self.duration
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.start = 0.0;
    }
}

/// Coarse hunger level derived from the robot's flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HungerState {
    Fed,
    Hungry,
    Starving,
    Starved,
}

/// Hunger flags driven by a single ticks-since-last-meal counter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hunger {
    time_since_meal: u32,
    hungry: bool,
    starving: bool,
    starved: bool,
    ignore: bool,
}

impl Hunger {
    #[must_use]
    pub const fn time_since_meal(&self) -> u32 {
        self.time_since_meal
    }

    #[must_use]
    pub const fn is_hungry(&self) -> bool {
        self.hungry
    }

    #[must_use]
    pub const fn is_starving(&self) -> bool {
        self.starving
    }

    #[must_use]
    pub const fn is_starved(&self) -> bool {
        self.starved
    }

    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        self.ignore
    }

    #[must_use]
    pub const fn state(&self) -> HungerState {
        if self.starved {
            HungerState::Starved
        } else if self.starving {
            HungerState::Starving
        } else if self.hungry {
            HungerState::Hungry
        } else {
            HungerState::Fed
        }
    }

    /// Count `dt` ticks without food, returning the new state on a transition.
    pub fn advance(&mut self, dt: u32, config: &HungerConfig) -> Option<HungerState> {
        if self.ignore {
            self.time_since_meal = 0;
            self.hungry = false;
            self.starving = false;
            return None;
        }
        let before = self.state();
        self.time_since_meal = self.time_since_meal.saturating_add(dt);
        if self.time_since_meal >= config.hungry_after {
            self.hungry = true;
        }
        if self.time_since_meal >= config.starving_after {
            self.starving = true;
        }
        if self.time_since_meal >= config.starved_after {
            self.starved = true;
        }
        let after = self.state();
        (after != before).then_some(after)
    }

    /// Reset the meal counter. Starvation is terminal and is not undone.
    pub fn eat(&mut self) {
        self.time_since_meal = 0;
        self.hungry = false;
        self.starving = false;
    }

    /// Freeze hunger when `ignore` is set; every flag is cleared.
    pub fn set_ignore(&mut self, ignore: bool) {
        if ignore {
            *self = Self {
                ignore,
                ..Self::default()
            };
        } else {
            self.ignore = false;
        }
    }

    /// Back to a fresh, fed state. The ignore flag is an arena-wide setting and survives.
    pub fn reset(&mut self) {
        let ignore = self.ignore;
        *self = Self::default();
        self.ignore = ignore;
    }
}

/// Capabilities every arena entity exposes to the orchestrator.
pub trait ArenaEntity {
    fn kind(&self) -> EntityKind;

    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    /// Display name used by renderers and logs.
    fn name(&self) -> String;

    fn color(&self) -> Rgb {
        self.body().color
    }

    /// Advance the entity by `dt` ticks.
    fn timestep_update(&mut self, dt: u32);

    /// React to touching an entity (or wall) of kind `other`.
    fn handle_collision(&mut self, other: EntityKind);

    /// Return to a freshly created state at `placement`, keeping identity.
    fn reset(&mut self, placement: Placement);
}

/// Autonomous two-wheeled vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Robot {
    serial: u32,
    robot_kind: RobotKind,
    body: Body,
    motion: MotionHandler,
    sensors: SensorArray,
    behavior: Behavior,
    food_behavior: Behavior,
    hunger: Hunger,
    hunger_config: HungerConfig,
    policy: CollisionPolicy,
    reversal: CollisionTimer,
    reversal_velocity: WheelVelocity,
    reversal_heading_offset: f32,
    invincibility: CollisionTimer,
    lives: u32,
    max_lives: u32,
    age: u64,
    clock: f32,
}

impl Robot {
    #[must_use]
    pub fn new(serial: u32, robot_kind: RobotKind, placement: Placement, config: &ArenaConfig) -> Self {
        let robot = &config.robot;
        let max_reading = config.sensor.max_reading;
        let mut sensors = SensorArray::new(&config.sensor);
        sensors.set_mount_radius(placement.radius);
        sensors.mount(&placement.pose);
        Self {
            serial,
            robot_kind,
            body: Body {
                pose: placement.pose,
                radius: placement.radius,
                color: FED_COLOR,
            },
            motion: MotionHandler::new(
                robot.min_speed,
                robot.max_speed,
                robot.speed_delta,
                robot.angle_delta,
            ),
            sensors,
            behavior: Behavior::new(robot_kind.behavior(), max_reading),
            food_behavior: Behavior::new(BehaviorKind::Aggressive, max_reading),
            hunger: Hunger::default(),
            hunger_config: config.hunger,
            policy: robot.collision_policy,
            reversal: CollisionTimer::new(robot.reversal_ticks as f32),
            reversal_velocity: robot.reversal_velocity,
            reversal_heading_offset: robot.reversal_heading_offset,
            invincibility: CollisionTimer::new(robot.invincibility_duration),
            lives: robot.lives,
            max_lives: robot.lives,
            age: 0,
            clock: 0.0,
        }
    }

    #[must_use]
    pub const fn serial(&self) -> u32 {
        self.serial
    }

    #[must_use]
    pub const fn robot_kind(&self) -> RobotKind {
        self.robot_kind
    }

    #[must_use]
    pub const fn behavior(&self) -> Behavior {
        self.behavior
    }

    #[must_use]
    pub const fn sensors(&self) -> &SensorArray {
        &self.sensors
    }

    pub fn sensors_mut(&mut self) -> &mut SensorArray {
        &mut self.sensors
    }

    /// Move the sensors onto the rim at the current pose.
    pub fn mount_sensors(&mut self) {
        self.sensors.mount(&self.body.pose);
    }

    #[must_use]
    pub const fn motion(&self) -> &MotionHandler {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut MotionHandler {
        &mut self.motion
    }

    #[must_use]
    pub const fn velocity(&self) -> WheelVelocity {
        self.motion.velocity()
    }

    #[must_use]
    pub const fn hunger(&self) -> &Hunger {
        &self.hunger
    }

    pub fn set_ignore_hunger(&mut self, ignore: bool) {
        self.hunger.set_ignore(ignore);
    }

    #[must_use]
    pub const fn is_starved(&self) -> bool {
        self.hunger.is_starved()
    }

    #[must_use]
    pub const fn is_reversing(&self) -> bool {
        self.reversal.is_active()
    }

    #[must_use]
    pub const fn is_invincible(&self) -> bool {
        self.invincibility.is_active()
    }

    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// True once an invincibility-policy robot has used up its lives.
    #[must_use]
    pub const fn is_out_of_lives(&self) -> bool {
        matches!(self.policy, CollisionPolicy::Invincibility) && self.lives == 0
    }

    /// Ticks processed since creation or the last reset.
    #[must_use]
    pub const fn age(&self) -> u64 {
        self.age
    }

    /// Advance the robot's view of elapsed simulation time, in seconds.
    pub fn advance_clock(&mut self, seconds: f32) {
        self.clock += seconds;
    }

    /// Feed from a food source.
    pub fn eat(&mut self) {
        if self.hunger.is_hungry() || self.hunger.is_starving() {
            debug!(robot = self.serial, "robot fed");
        }
        self.hunger.eat();
    }

    /// Wheel command from the sensors: light wiring unless starving, food
    /// wiring (always aggressive) once hungry.
    fn steer(&self) -> WheelVelocity {
        let mut velocity = WheelVelocity::zero();
        if !self.hunger.is_starving() {
            let (left, right) = self.sensors.light_readings();
            velocity = self.behavior.process_reading(left, right);
        }
        if self.hunger.is_hungry() || self.hunger.is_starving() {
            let (left, right) = self.sensors.food_readings();
            velocity = self.food_behavior.process_reading(left, right);
        }
        velocity
    }
}

impl ArenaEntity for Robot {
    fn kind(&self) -> EntityKind {
        EntityKind::Robot
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn name(&self) -> String {
        self.robot_kind.name().to_string()
    }

    fn color(&self) -> Rgb {
        match self.hunger.state() {
            HungerState::Fed => FED_COLOR,
            HungerState::Hungry => HUNGRY_COLOR,
            HungerState::Starving => STARVING_COLOR,
            HungerState::Starved => STARVED_COLOR,
        }
    }

    fn timestep_update(&mut self, dt: u32) {
        self.age += u64::from(dt);
        if let Some(state) = self.hunger.advance(dt, &self.hunger_config) {
            debug!(robot = self.serial, ?state, "hunger state changed");
        }
        self.body.color = self.color();

        if self.reversal.is_active() {
            let velocity = self.reversal_velocity;
            if self.reversal.expired(self.age as f32) {
                self.reversal.clear();
                self.body.pose.rotate(self.reversal_heading_offset);
            }
            self.motion.update_velocity_override(velocity);
        } else {
            let velocity = self.steer();
            self.motion.update_velocity(velocity);
        }

        if self.invincibility.is_active() && self.invincibility.expired(self.clock) {
            self.invincibility.clear();
        }

        integrate_pose(
            &mut self.body.pose,
            self.body.radius,
            self.motion.velocity(),
            dt as f32,
        );
        self.mount_sensors();
    }

    fn handle_collision(&mut self, other: EntityKind) {
        match other {
            EntityKind::Robot | EntityKind::Wall(_) => {
                self.motion.stop();
                match self.policy {
                    CollisionPolicy::Reversal => {
                        if !self.reversal.is_active() {
                            self.reversal.start(self.age as f32);
                        }
                    }
                    CollisionPolicy::Invincibility => {
                        if !self.invincibility.is_active() && self.lives > 0 {
                            self.lives -= 1;
                            self.invincibility.start(self.clock);
                        }
                    }
                }
            }
            EntityKind::Food => self.eat(),
            EntityKind::Light => {}
        }
    }

    fn reset(&mut self, placement: Placement) {
        self.body.pose = placement.pose;
        self.body.radius = placement.radius;
        self.motion.stop();
        self.hunger.reset();
        self.body.color = self.color();
        self.reversal.clear();
        self.invincibility.clear();
        self.lives = self.max_lives;
        self.age = 0;
        self.clock = 0.0;
        self.sensors.set_mount_radius(placement.radius);
        self.sensors.mount(&placement.pose);
        self.sensors.clear();
    }
}

/// Mobile light source cruising in a straight line and backing off in an arc
/// after bumping into walls or other lights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    serial: u32,
    body: Body,
    velocity: WheelVelocity,
    cruise_velocity: WheelVelocity,
    reverse_velocity: WheelVelocity,
    reverse: CollisionTimer,
    clock: f32,
}

impl Light {
    #[must_use]
    pub fn new(serial: u32, placement: Placement, config: &ArenaConfig) -> Self {
        let light = &config.light;
        Self {
            serial,
            body: Body {
                pose: placement.pose,
                radius: placement.radius,
                color: LIGHT_COLOR,
            },
            velocity: light.cruise_velocity,
            cruise_velocity: light.cruise_velocity,
            reverse_velocity: light.reverse_velocity,
            reverse: CollisionTimer::new(light.reverse_duration),
            clock: 0.0,
        }
    }

    #[must_use]
    pub const fn serial(&self) -> u32 {
        self.serial
    }

    #[must_use]
    pub const fn velocity(&self) -> WheelVelocity {
        self.velocity
    }

    #[must_use]
    pub const fn is_reversing(&self) -> bool {
        self.reverse.is_active()
    }

    /// Internal clock in seconds of simulation time.
    #[must_use]
    pub const fn clock(&self) -> f32 {
        self.clock
    }

    pub fn advance_clock(&mut self, seconds: f32) {
        self.clock += seconds;
    }
}

impl ArenaEntity for Light {
    fn kind(&self) -> EntityKind {
        EntityKind::Light
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn name(&self) -> String {
        format!("Light{}", self.serial)
    }

    fn timestep_update(&mut self, dt: u32) {
        if self.reverse.is_active() && self.reverse.expired(self.clock) {
            self.reverse.clear();
            self.velocity = self.cruise_velocity;
        }
        integrate_pose(&mut self.body.pose, self.body.radius, self.velocity, dt as f32);
    }

    fn handle_collision(&mut self, other: EntityKind) {
        if matches!(other, EntityKind::Light | EntityKind::Wall(_)) {
            self.reverse.start(self.clock);
            self.velocity = self.reverse_velocity;
        }
    }

    fn reset(&mut self, placement: Placement) {
        self.body.pose = placement.pose;
        self.body.radius = placement.radius;
        self.velocity = self.cruise_velocity;
        self.reverse.clear();
        self.clock = 0.0;
    }
}

/// Static food source; robots feed by getting close to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    serial: u32,
    body: Body,
    captured: bool,
}

impl Food {
    #[must_use]
    pub fn new(serial: u32, placement: Placement) -> Self {
        Self {
            serial,
            body: Body {
                pose: placement.pose,
                radius: placement.radius,
                color: FOOD_COLOR,
            },
            captured: false,
        }
    }

    #[must_use]
    pub const fn serial(&self) -> u32 {
        self.serial
    }

    #[must_use]
    pub const fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
        self.body.color = if captured {
            FOOD_CAPTURED_COLOR
        } else {
            FOOD_COLOR
        };
    }
}

impl ArenaEntity for Food {
    fn kind(&self) -> EntityKind {
        EntityKind::Food
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn name(&self) -> String {
        "Food".to_string()
    }

    fn timestep_update(&mut self, _dt: u32) {}

    fn handle_collision(&mut self, other: EntityKind) {
        if other == EntityKind::Robot {
            self.set_captured(true);
        }
    }

    fn reset(&mut self, placement: Placement) {
        self.body.pose = placement.pose;
        self.body.radius = placement.radius;
        self.set_captured(false);
    }
}

/// Closed set of entities stored in the arena registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entity {
    Robot(Robot),
    Light(Light),
    Food(Food),
}

impl Entity {
    /// Robots and lights move; food does not.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        matches!(self, Self::Robot(_) | Self::Light(_))
    }

    #[must_use]
    pub const fn as_robot(&self) -> Option<&Robot> {
        match self {
            Self::Robot(robot) => Some(robot),
            _ => None,
        }
    }

    pub fn as_robot_mut(&mut self) -> Option<&mut Robot> {
        match self {
            Self::Robot(robot) => Some(robot),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_light(&self) -> Option<&Light> {
        match self {
            Self::Light(light) => Some(light),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_food(&self) -> Option<&Food> {
        match self {
            Self::Food(food) => Some(food),
            _ => None,
        }
    }

    pub fn as_food_mut(&mut self) -> Option<&mut Food> {
        match self {
            Self::Food(food) => Some(food),
            _ => None,
        }
    }

    /// Forward elapsed simulation seconds to entities that keep their own clock.
    pub fn advance_clock(&mut self, seconds: f32) {
        match self {
            Self::Robot(robot) => robot.advance_clock(seconds),
            Self::Light(light) => light.advance_clock(seconds),
            Self::Food(_) => {}
        }
    }

    fn inner(&self) -> &dyn ArenaEntity {
        match self {
            Self::Robot(robot) => robot,
            Self::Light(light) => light,
            Self::Food(food) => food,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ArenaEntity {
        match self {
            Self::Robot(robot) => robot,
            Self::Light(light) => light,
            Self::Food(food) => food,
        }
    }
}

impl ArenaEntity for Entity {
    fn kind(&self) -> EntityKind {
        self.inner().kind()
    }

    fn body(&self) -> &Body {
        self.inner().body()
    }

    fn body_mut(&mut self) -> &mut Body {
        self.inner_mut().body_mut()
    }

    fn name(&self) -> String {
        self.inner().name()
    }

    fn color(&self) -> Rgb {
        self.inner().color()
    }

    fn timestep_update(&mut self, dt: u32) {
        self.inner_mut().timestep_update(dt);
    }

    fn handle_collision(&mut self, other: EntityKind) {
        self.inner_mut().handle_collision(other);
    }

    fn reset(&mut self, placement: Placement) {
        self.inner_mut().reset(placement);
    }
}
