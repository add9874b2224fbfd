//! Entity registry and the per-timestep simulation pipeline.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, info, trace, warn};

use crate::behavior::RobotKind;
use crate::collision::{
    adjust_entity_overlap, adjust_wall_overlap, is_colliding, resolves_overlap, wall_contact,
    within_feeding_range,
};
use crate::command::{ArenaCommand, Reconfiguration};
use crate::config::{ArenaConfig, PopulationLimits};
use crate::entity::{ArenaEntity, Body, Entity, EntityId, EntityKind, HungerState, Rgb, Robot};
use crate::factory::EntityFactory;
use crate::geometry::{Pose, Position};
use crate::sensor::{SENSOR_DRAW_RADIUS, Sensor, SensorArray, SensorKind};
use crate::{ArenaError, GameStatus, Tick};

/// Generational storage for every entity, plus registration-order and
/// per-kind views. Removing an entity drops it from all views at once.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    slots: SlotMap<EntityId, Entity>,
    handles: Vec<EntityId>,
    robots: Vec<EntityId>,
    lights: Vec<EntityId>,
    foods: Vec<EntityId>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns true if `id` refers to a live entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id)
    }

    /// Insert an entity and return its handle.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let kind = entity.kind();
        let id = self.slots.insert(entity);
        self.handles.push(id);
        match kind {
            EntityKind::Robot => self.robots.push(id),
            EntityKind::Light => self.lights.push(id),
            EntityKind::Food => self.foods.push(id),
            EntityKind::Wall(_) => {}
        }
        id
    }

    /// Remove `id`, returning the entity if it was present.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.slots.remove(id)?;
        for view in [
            &mut self.handles,
            &mut self.robots,
            &mut self.lights,
            &mut self.foods,
        ] {
            view.retain(|handle| *handle != id);
        }
        Some(entity)
    }

    /// Iterate over handles in registration order.
    pub fn iter_handles(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.handles.iter().copied()
    }

    /// Iterate over entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.handles
            .iter()
            .filter_map(|id| self.slots.get(*id).map(|entity| (*id, entity)))
    }

    /// Visit every entity mutably in registration order.
    pub fn for_each_mut(&mut self, mut visit: impl FnMut(EntityId, &mut Entity)) {
        for &id in &self.handles {
            if let Some(entity) = self.slots.get_mut(id) {
                visit(id, entity);
            }
        }
    }

    #[must_use]
    pub fn robot_ids(&self) -> &[EntityId] {
        &self.robots
    }

    #[must_use]
    pub fn light_ids(&self) -> &[EntityId] {
        &self.lights
    }

    #[must_use]
    pub fn food_ids(&self) -> &[EntityId] {
        &self.foods
    }

    /// Robots of one personality, oldest first.
    pub fn robot_ids_of(&self, kind: RobotKind) -> impl Iterator<Item = EntityId> + '_ {
        self.robots.iter().copied().filter(move |id| {
            self.slots
                .get(*id)
                .and_then(Entity::as_robot)
                .is_some_and(|robot| robot.robot_kind() == kind)
        })
    }

    fn positions(&self, ids: &[EntityId]) -> Vec<Position> {
        ids.iter()
            .filter_map(|id| self.slots.get(*id))
            .map(|entity| entity.body().pose.position)
            .collect()
    }

    fn bodies(&self, ids: &[EntityId]) -> Vec<(EntityId, Body)> {
        ids.iter()
            .filter_map(|id| self.slots.get(*id).map(|entity| (*id, *entity.body())))
            .collect()
    }
}

/// Events emitted after processing an arena tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TickEvents {
    pub tick: Tick,
    /// False when the call was a no-op (bad `dt` or game over).
    pub advanced: bool,
    pub wall_collisions: u32,
    pub entity_collisions: u32,
    pub meals: u32,
    /// Set on the tick the game was lost, by starvation or lost lives.
    pub lost: bool,
}

/// Live entity counts by kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Population {
    pub fear_robots: u32,
    pub explore_robots: u32,
    pub love_robots: u32,
    pub aggressive_robots: u32,
    pub lights: u32,
    pub food: u32,
}

impl Population {
    #[must_use]
    pub const fn robots(&self) -> u32 {
        self.fear_robots + self.explore_robots + self.love_robots + self.aggressive_robots
    }
}

/// Render-facing snapshot of one entity.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    pub pose: Pose,
    pub radius: f32,
    pub color: Rgb,
}

/// Render-facing snapshot of one sensor.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SensorView {
    pub kind: SensorKind,
    pub position: Position,
    pub radius: f32,
    pub color: Rgb,
    pub reading: f32,
}

impl From<&Sensor> for SensorView {
    fn from(sensor: &Sensor) -> Self {
        Self {
            kind: sensor.kind(),
            position: sensor.position(),
            radius: SENSOR_DRAW_RADIUS,
            color: sensor.kind().color(),
            reading: sensor.reading(),
        }
    }
}

/// Render-facing snapshot of a robot and its four sensors.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RobotView {
    pub id: EntityId,
    pub robot_kind: RobotKind,
    pub pose: Pose,
    pub radius: f32,
    pub color: Rgb,
    pub hunger: HungerState,
    pub lives: u32,
    pub sensors: [SensorView; 4],
}

impl RobotView {
    fn new(id: EntityId, robot: &Robot) -> Self {
        let sensors = robot.sensors();
        Self {
            id,
            robot_kind: robot.robot_kind(),
            pose: robot.body().pose,
            radius: robot.body().radius,
            color: robot.color(),
            hunger: robot.hunger().state(),
            lives: robot.lives(),
            sensors: [
                SensorView::from(&sensors.left_light),
                SensorView::from(&sensors.right_light),
                SensorView::from(&sensors.left_food),
                SensorView::from(&sensors.right_food),
            ],
        }
    }
}

/// Owns every entity and drives sense, act, clock, starvation and collision
/// stages once per call to [`Arena::advance_time`].
#[derive(Debug)]
pub struct Arena {
    config: ArenaConfig,
    factory: EntityFactory,
    registry: EntityRegistry,
    status: GameStatus,
    paused: bool,
    tick: Tick,
    elapsed: f32,
    sensitivity: f32,
    ignore_hunger: bool,
}

impl Arena {
    /// Validate `config` and populate the arena with its initial entities.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let factory = EntityFactory::new(&config);
        let mut arena = Self {
            sensitivity: config.sensor.light_sensitivity,
            ignore_hunger: config.population.food == 0,
            factory,
            config,
            registry: EntityRegistry::new(),
            status: GameStatus::Playing,
            paused: false,
            tick: Tick::zero(),
            elapsed: 0.0,
        };
        arena.populate();
        let population = arena.population();
        info!(
            robots = population.robots(),
            lights = population.lights,
            food = population.food,
            width = arena.config.width,
            height = arena.config.height,
            "arena initialised"
        );
        Ok(arena)
    }

    fn populate(&mut self) {
        let population = self.config.population;
        for kind in RobotKind::ALL {
            for _ in 0..population.robots(kind) {
                self.spawn_robot(kind);
            }
        }
        for _ in 0..population.food {
            self.spawn_food();
        }
        for _ in 0..population.lights {
            self.spawn_light();
        }
    }

    /// Advance the simulation by one tick covering `dt` seconds.
    ///
    /// Non-positive or non-finite `dt` is a no-op, as is any call once the
    /// game is no longer playing.
    pub fn advance_time(&mut self, dt: f32) -> TickEvents {
        let mut events = TickEvents {
            tick: self.tick,
            ..TickEvents::default()
        };
        if !(dt > 0.0 && dt.is_finite()) || self.status != GameStatus::Playing {
            return events;
        }

        self.stage_sense();
        self.stage_update(dt);
        events.lost = self.stage_starvation();
        self.stage_collisions(&mut events);
        events.lost |= self.stage_lives();
        self.stage_feeding(&mut events);

        self.tick = self.tick.next();
        self.elapsed += dt;
        events.tick = self.tick;
        events.advanced = true;
        events
    }

    fn stage_sense(&mut self) {
        let registry = &self.registry;
        if registry.robot_ids().is_empty() {
            return;
        }
        let lights = registry.positions(registry.light_ids());
        let foods = registry.positions(registry.food_ids());
        let jobs: Vec<(EntityId, Pose, SensorArray)> = registry
            .robot_ids()
            .iter()
            .filter_map(|id| {
                let robot = registry.get(*id)?.as_robot()?;
                Some((*id, robot.body().pose, *robot.sensors()))
            })
            .collect();

        let sensed: Vec<(EntityId, SensorArray)> = jobs
            .into_par_iter()
            .map(|(id, pose, mut sensors)| {
                sensors.sense(&pose, &lights, &foods);
                (id, sensors)
            })
            .collect();

        for (id, sensors) in sensed {
            if let Some(robot) = self.registry.get_mut(id).and_then(Entity::as_robot_mut) {
                *robot.sensors_mut() = sensors;
            }
        }
    }

    fn stage_update(&mut self, dt: f32) {
        self.registry.for_each_mut(|_, entity| {
            entity.timestep_update(1);
            entity.advance_clock(dt);
        });
    }

    fn stage_starvation(&mut self) -> bool {
        let starved = self
            .registry
            .robot_ids()
            .iter()
            .filter_map(|id| self.registry.get(*id)?.as_robot())
            .find(|robot| robot.is_starved())
            .map(Robot::serial);
        let Some(robot) = starved else {
            return false;
        };
        self.status = GameStatus::Lost;
        info!(tick = self.tick.next().0, robot, "robot starved, game lost");
        true
    }

    fn stage_lives(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        let exhausted = self
            .registry
            .robot_ids()
            .iter()
            .filter_map(|id| self.registry.get(*id)?.as_robot())
            .find(|robot| robot.is_out_of_lives())
            .map(Robot::serial);
        let Some(robot) = exhausted else {
            return false;
        };
        self.status = GameStatus::Lost;
        info!(tick = self.tick.next().0, robot, "robot out of lives, game lost");
        true
    }

    fn stage_collisions(&mut self, events: &mut TickEvents) {
        let (width, height) = self.dimensions();
        let margin = self.config.collision.margin;
        let handles: Vec<EntityId> = self.registry.iter_handles().collect();

        for &id in &handles {
            let Some(mover) = self.registry.get_mut(id) else {
                continue;
            };
            if !mover.is_mobile() {
                continue;
            }
            let mover_kind = mover.kind();
            if let Some(wall) = wall_contact(mover.body(), width, height) {
                adjust_wall_overlap(mover.body_mut(), wall, width, height, margin);
                mover.handle_collision(EntityKind::Wall(wall));
                events.wall_collisions += 1;
                trace!(?id, ?wall, "wall collision");
            }

            for &other_id in &handles {
                if other_id == id {
                    continue;
                }
                let Some(other) = self.registry.get(other_id) else {
                    continue;
                };
                let other_kind = other.kind();
                if !resolves_overlap(mover_kind, other_kind) {
                    continue;
                }
                let other_body = *other.body();
                let Some(mover) = self.registry.get_mut(id) else {
                    continue;
                };
                if !is_colliding(mover.body(), &other_body) {
                    continue;
                }
                adjust_entity_overlap(mover.body_mut(), &other_body, margin);
                mover.handle_collision(other_kind);
                events.entity_collisions += 1;
                trace!(?id, ?other_id, ?other_kind, "entity collision");
            }
        }
        // Corrections move bodies without touching their sensors.
        self.for_each_robot(Robot::mount_sensors);
    }

    /// Robots close enough to a food source eat from it; nothing is moved.
    fn stage_feeding(&mut self, events: &mut TickEvents) {
        let foods = self.registry.bodies(self.registry.food_ids());
        if foods.is_empty() {
            return;
        }
        let margin = self.config.hunger.feeding_margin;
        let mut captured = Vec::new();
        self.registry.for_each_mut(|_, entity| {
            let Some(robot) = entity.as_robot_mut() else {
                return;
            };
            let body = *robot.body();
            if let Some((food_id, _)) = foods
                .iter()
                .find(|(_, food)| within_feeding_range(&body, food, margin))
            {
                robot.handle_collision(EntityKind::Food);
                captured.push(*food_id);
                events.meals += 1;
            }
        });
        for food_id in captured {
            if let Some(food) = self.registry.get_mut(food_id) {
                food.handle_collision(EntityKind::Robot);
            }
        }
    }

    /// Apply a host directive.
    pub fn accept_command(&mut self, command: ArenaCommand) {
        match command {
            ArenaCommand::IncreaseSpeed => {
                self.for_each_robot(|robot| robot.motion_mut().increase_speed());
            }
            ArenaCommand::DecreaseSpeed => {
                self.for_each_robot(|robot| robot.motion_mut().decrease_speed());
            }
            ArenaCommand::TurnLeft => self.for_each_robot(|robot| robot.motion_mut().turn_left()),
            ArenaCommand::TurnRight => self.for_each_robot(|robot| robot.motion_mut().turn_right()),
            ArenaCommand::Play => self.paused = false,
            ArenaCommand::Pause => self.paused = true,
            ArenaCommand::Reset => self.reset(),
            ArenaCommand::NewGame => {
                self.reset();
                self.paused = false;
            }
            ArenaCommand::None => return,
        }
        debug!(?command, paused = self.paused, "command accepted");
    }

    /// Bring the population and light sensitivity to the requested values.
    /// Out-of-range requests are clamped to the configured limits.
    pub fn apply_reconfiguration(&mut self, request: &Reconfiguration) {
        let limits = self.config.limits;
        let sensitivity = clamp_sensitivity(request.sensitivity, &limits);
        self.sensitivity = sensitivity;
        self.for_each_robot(|robot| robot.sensors_mut().set_light_sensitivity(sensitivity));

        let food = clamp_count("food", request.food, limits.max_food);
        self.ignore_hunger = food == 0 && self.status != GameStatus::Lost;
        let ignore = self.ignore_hunger;
        self.for_each_robot(|robot| robot.set_ignore_hunger(ignore));

        let lights = clamp_count("lights", request.lights, limits.max_lights);
        while (self.registry.light_ids().len() as u32) < lights {
            self.spawn_light();
        }
        while self.registry.light_ids().len() as u32 > lights {
            let Some(&oldest) = self.registry.light_ids().first() else {
                break;
            };
            self.remove_entity(oldest);
        }

        while (self.registry.food_ids().len() as u32) < food {
            self.spawn_food();
        }
        while self.registry.food_ids().len() as u32 > food {
            let Some(&newest) = self.registry.food_ids().last() else {
                break;
            };
            self.remove_entity(newest);
        }

        for kind in RobotKind::ALL {
            let target = clamp_count(kind.name(), request.robots(kind), limits.max_robots_per_kind);
            while (self.registry.robot_ids_of(kind).count() as u32) < target {
                self.spawn_robot(kind);
            }
            while self.registry.robot_ids_of(kind).count() as u32 > target {
                let Some(newest) = self.registry.robot_ids_of(kind).last() else {
                    break;
                };
                self.remove_entity(newest);
            }
        }

        info!(
            population = ?self.population(),
            sensitivity,
            ignore_hunger = ignore,
            "reconfiguration applied"
        );
    }

    /// Re-place every entity and restore its fresh state without changing
    /// identities, then resume play from tick zero.
    pub fn reset(&mut self) {
        let factory = &mut self.factory;
        self.registry.for_each_mut(|_, entity| {
            let Ok(placement) = factory.placement_for(entity.kind()) else {
                return;
            };
            entity.reset(placement);
        });
        self.status = GameStatus::Playing;
        self.tick = Tick::zero();
        self.elapsed = 0.0;
        info!(entities = self.registry.len(), "arena reset");
    }

    /// Register an entity, applying the current sensitivity and hunger mode to robots.
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        if let Some(robot) = entity.as_robot_mut() {
            robot.sensors_mut().set_light_sensitivity(self.sensitivity);
            robot.set_ignore_hunger(self.ignore_hunger);
        }
        let kind = entity.kind();
        let name = entity.name();
        let id = self.registry.insert(entity);
        debug!(?id, ?kind, name = %name, "entity added");
        id
    }

    /// Unregister an entity from every view and hand it back.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.registry.remove(id)?;
        debug!(?id, kind = ?entity.kind(), "entity removed");
        Some(entity)
    }

    /// Build and register a fresh entity of `kind`. Walls are rejected.
    pub fn spawn(&mut self, kind: EntityKind) -> Result<EntityId, ArenaError> {
        let entity = self.factory.create(kind)?;
        Ok(self.add_entity(entity))
    }

    pub fn spawn_robot(&mut self, kind: RobotKind) -> EntityId {
        let robot = self.factory.create_robot(kind);
        self.add_entity(Entity::Robot(robot))
    }

    fn spawn_light(&mut self) -> EntityId {
        let light = self.factory.create_light();
        self.add_entity(Entity::Light(light))
    }

    fn spawn_food(&mut self) -> EntityId {
        let food = self.factory.create_food();
        self.add_entity(Entity::Food(food))
    }

    fn for_each_robot(&mut self, mut visit: impl FnMut(&mut Robot)) {
        self.registry.for_each_mut(|_, entity| {
            if let Some(robot) = entity.as_robot_mut() {
                visit(robot);
            }
        });
    }

    /// Snapshot of every entity in registration order.
    pub fn entities(&self) -> impl Iterator<Item = EntityView> + '_ {
        self.registry.iter().map(|(id, entity)| EntityView {
            id,
            kind: entity.kind(),
            name: entity.name(),
            pose: entity.body().pose,
            radius: entity.body().radius,
            color: entity.color(),
        })
    }

    /// Snapshot of every robot with its sensors.
    pub fn robots(&self) -> impl Iterator<Item = RobotView> + '_ {
        self.registry.robot_ids().iter().filter_map(|id| {
            let robot = self.registry.get(*id)?.as_robot()?;
            Some(RobotView::new(*id, robot))
        })
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.registry.get_mut(id)
    }

    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn population(&self) -> Population {
        let mut population = Population {
            lights: self.registry.light_ids().len() as u32,
            food: self.registry.food_ids().len() as u32,
            ..Population::default()
        };
        for robot in self
            .registry
            .robot_ids()
            .iter()
            .filter_map(|id| self.registry.get(*id)?.as_robot())
        {
            match robot.robot_kind() {
                RobotKind::Fear => population.fear_robots += 1,
                RobotKind::Explore => population.explore_robots += 1,
                RobotKind::Love => population.love_robots += 1,
                RobotKind::Aggressive => population.aggressive_robots += 1,
            }
        }
        population
    }

    /// Arena width and height in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> (f32, f32) {
        (self.config.width, self.config.height)
    }

    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Ticks advanced since construction or the last reset.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Simulation seconds advanced since construction or the last reset.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Current light sensor numerator.
    #[must_use]
    pub const fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// True while hunger is frozen because the arena has no food.
    #[must_use]
    pub const fn ignores_hunger(&self) -> bool {
        self.ignore_hunger
    }
}

fn clamp_count(field: &str, requested: u32, max: u32) -> u32 {
    if requested > max {
        warn!(field, requested, max, "population request clamped");
        max
    } else {
        requested
    }
}

fn clamp_sensitivity(requested: f32, limits: &PopulationLimits) -> f32 {
    let clamped = if requested.is_nan() {
        limits.min_sensitivity
    } else {
        requested.clamp(limits.min_sensitivity, limits.max_sensitivity)
    };
    if clamped != requested {
        warn!(requested, clamped, "sensitivity request clamped");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PopulationConfig;

    fn empty_config() -> ArenaConfig {
        ArenaConfig {
            rng_seed: Some(11),
            population: PopulationConfig {
                fear_robots: 0,
                explore_robots: 0,
                love_robots: 0,
                aggressive_robots: 0,
                lights: 0,
                food: 0,
            },
            ..ArenaConfig::default()
        }
    }

    fn request(lights: u32, food: u32) -> Reconfiguration {
        Reconfiguration {
            fear_robots: 1,
            explore_robots: 1,
            love_robots: 0,
            aggressive_robots: 0,
            lights,
            food,
            sensitivity: 1_200.0,
        }
    }

    #[test]
    fn registry_removal_purges_every_view() {
        let config = ArenaConfig::default();
        let mut factory = EntityFactory::new(&config);
        let mut registry = EntityRegistry::new();
        let robot = registry.insert(Entity::Robot(factory.create_robot(RobotKind::Fear)));
        let light = registry.insert(Entity::Light(factory.create_light()));
        let food = registry.insert(Entity::Food(factory.create_food()));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.iter_handles().collect::<Vec<_>>(), vec![robot, light, food]);

        let removed = registry.remove(light).expect("light present");
        assert_eq!(removed.kind(), EntityKind::Light);
        assert!(!registry.contains(light));
        assert!(registry.light_ids().is_empty());
        assert_eq!(registry.iter_handles().collect::<Vec<_>>(), vec![robot, food]);
        assert!(registry.remove(light).is_none());
        assert_eq!(registry.robot_ids_of(RobotKind::Fear).count(), 1);
        assert_eq!(registry.robot_ids_of(RobotKind::Love).count(), 0);
    }

    #[test]
    fn default_population_is_built() {
        let arena = Arena::new(ArenaConfig {
            rng_seed: Some(3),
            ..ArenaConfig::default()
        })
        .expect("arena");
        let population = arena.population();
        assert_eq!(population.fear_robots, 5);
        assert_eq!(population.explore_robots, 5);
        assert_eq!(population.lights, 4);
        assert_eq!(population.food, 4);
        assert_eq!(arena.entities().count(), 18);
        assert_eq!(arena.status(), GameStatus::Playing);
        assert!(!arena.ignores_hunger());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ArenaConfig {
            height: -1.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(Arena::new(config), Err(ArenaError::InvalidConfig(_))));
    }

    #[test]
    fn reconfiguration_clamps_and_is_idempotent() {
        let mut arena = Arena::new(empty_config()).expect("arena");
        let mut big = request(25, 40);
        big.fear_robots = 9;
        big.sensitivity = 9_000.0;
        arena.apply_reconfiguration(&big);
        let population = arena.population();
        assert_eq!(population.lights, 10);
        assert_eq!(population.food, 10);
        assert_eq!(population.fear_robots, 5);
        assert_eq!(population.explore_robots, 1);
        assert_eq!(arena.sensitivity(), 2_000.0);

        arena.apply_reconfiguration(&big);
        assert_eq!(arena.population(), population);
        let sensitivities: Vec<f32> = arena
            .registry()
            .robot_ids()
            .iter()
            .filter_map(|id| arena.entity(*id)?.as_robot())
            .map(|robot| robot.sensors().left_light.sensitivity())
            .collect();
        assert!(sensitivities.iter().all(|value| *value == 2_000.0));
    }

    #[test]
    fn lights_are_removed_oldest_first() {
        let mut arena = Arena::new(empty_config()).expect("arena");
        arena.apply_reconfiguration(&request(3, 1));
        let before: Vec<EntityId> = arena.registry().light_ids().to_vec();
        arena.apply_reconfiguration(&request(2, 1));
        assert_eq!(arena.registry().light_ids(), &before[1..]);
        assert!(arena.entity(before[0]).is_none());
    }

    #[test]
    fn zero_food_freezes_hunger_for_all_robots() {
        let mut arena = Arena::new(empty_config()).expect("arena");
        arena.apply_reconfiguration(&request(1, 0));
        assert!(arena.ignores_hunger());
        for _ in 0..3_000 {
            arena.advance_time(0.05);
        }
        assert_eq!(arena.status(), GameStatus::Playing);
        assert!(arena.robots().all(|robot| robot.hunger == HungerState::Fed));

        arena.apply_reconfiguration(&request(1, 2));
        assert!(!arena.ignores_hunger());
        let late = arena.spawn_robot(RobotKind::Love);
        let robot = arena.entity(late).and_then(Entity::as_robot).expect("robot");
        assert!(!robot.hunger().is_ignored());
    }

    #[test]
    fn pause_and_play_toggle_flag_only() {
        let mut arena = Arena::new(empty_config()).expect("arena");
        arena.accept_command(ArenaCommand::Pause);
        assert!(arena.is_paused());
        let events = arena.advance_time(0.05);
        assert!(events.advanced, "the driver honours pause, not the arena");
        arena.accept_command(ArenaCommand::None);
        assert!(arena.is_paused());
        arena.accept_command(ArenaCommand::Play);
        assert!(!arena.is_paused());
    }

    #[test]
    fn speed_commands_nudge_robot_wheels() {
        let mut arena = Arena::new(empty_config()).expect("arena");
        let id = arena.spawn_robot(RobotKind::Fear);
        arena.accept_command(ArenaCommand::IncreaseSpeed);
        arena.accept_command(ArenaCommand::IncreaseSpeed);
        arena.accept_command(ArenaCommand::TurnRight);
        let robot = arena.entity(id).and_then(Entity::as_robot).expect("robot");
        assert_eq!(robot.velocity().left, 3.0);
        assert_eq!(robot.velocity().right, 1.0);
    }

    #[test]
    fn spawning_walls_is_rejected() {
        let mut arena = Arena::new(empty_config()).expect("arena");
        let result = arena.spawn(EntityKind::Wall(crate::entity::Wall::Top));
        assert!(matches!(result, Err(ArenaError::UnsupportedEntityKind(_))));
        assert!(arena.registry().is_empty());
    }
}
