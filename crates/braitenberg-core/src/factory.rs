//! Entity construction with randomized grid placement and size.

use rand::{Rng, rngs::SmallRng};

use crate::ArenaError;
use crate::behavior::RobotKind;
use crate::config::ArenaConfig;
use crate::entity::{Entity, EntityKind, Food, Light, Placement, Robot};
use crate::geometry::Pose;

/// Builds robots, lights and food, handing out per-kind serial numbers.
#[derive(Debug, Clone)]
pub struct EntityFactory {
    config: ArenaConfig,
    rng: SmallRng,
    robots_created: u32,
    lights_created: u32,
    food_created: u32,
}

impl EntityFactory {
    /// Factory seeded from `config.rng_seed` (entropy when unset).
    #[must_use]
    pub fn new(config: &ArenaConfig) -> Self {
        Self::with_rng(config, config.seeded_rng())
    }

    #[must_use]
    pub fn with_rng(config: &ArenaConfig, rng: SmallRng) -> Self {
        Self {
            config: config.clone(),
            rng,
            robots_created: 0,
            lights_created: 0,
            food_created: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Number of entities of `kind` created so far; walls are never created.
    #[must_use]
    pub const fn created(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::Robot => self.robots_created,
            EntityKind::Light => self.lights_created,
            EntityKind::Food => self.food_created,
            EntityKind::Wall(_) => 0,
        }
    }

    /// Create an entity by kind tag. Robots built this way are explorers.
    pub fn create(&mut self, kind: EntityKind) -> Result<Entity, ArenaError> {
        match kind {
            EntityKind::Robot => Ok(Entity::Robot(self.create_robot(RobotKind::Explore))),
            EntityKind::Light => Ok(Entity::Light(self.create_light())),
            EntityKind::Food => Ok(Entity::Food(self.create_food())),
            EntityKind::Wall(_) => Err(ArenaError::UnsupportedEntityKind(kind)),
        }
    }

    pub fn create_robot(&mut self, robot_kind: RobotKind) -> Robot {
        self.robots_created += 1;
        let placement = self.robot_placement();
        Robot::new(self.robots_created, robot_kind, placement, &self.config)
    }

    pub fn create_light(&mut self) -> Light {
        self.lights_created += 1;
        let placement = self.light_placement();
        Light::new(self.lights_created, placement, &self.config)
    }

    pub fn create_food(&mut self) -> Food {
        self.food_created += 1;
        let placement = self.food_placement();
        Food::new(self.food_created, placement)
    }

    /// Fresh placement suited to an existing entity of `kind`, used on reset.
    pub fn placement_for(&mut self, kind: EntityKind) -> Result<Placement, ArenaError> {
        match kind {
            EntityKind::Robot => Ok(self.robot_placement()),
            EntityKind::Light => Ok(self.light_placement()),
            EntityKind::Food => Ok(self.food_placement()),
            EntityKind::Wall(_) => Err(ArenaError::UnsupportedEntityKind(kind)),
        }
    }

    /// Random grid pose: `edge_offset + k * spacing` on each axis, any heading.
    pub fn random_pose(&mut self) -> Pose {
        let placement = self.config.placement;
        let columns = grid_cells(self.config.width, placement.edge_offset, placement.spacing);
        let rows = grid_cells(self.config.height, placement.edge_offset, placement.spacing);
        let column = self.rng.random_range(0..columns);
        let row = self.rng.random_range(0..rows);
        let heading = self.rng.random_range(0.0..360.0);
        Pose::new(
            placement.edge_offset + column as f32 * placement.spacing,
            placement.edge_offset + row as f32 * placement.spacing,
            heading,
        )
    }

    /// Random grid pose with a radius drawn from `[min_radius, max_radius]`.
    pub fn random_placement(&mut self, min_radius: f32, max_radius: f32) -> Placement {
        let pose = self.random_pose();
        let radius = if max_radius > min_radius {
            self.rng.random_range(min_radius..=max_radius)
        } else {
            min_radius
        };
        Placement { pose, radius }
    }

    fn robot_placement(&mut self) -> Placement {
        let robot = self.config.robot;
        self.random_placement(robot.min_radius, robot.max_radius)
    }

    fn light_placement(&mut self) -> Placement {
        let light = self.config.light;
        self.random_placement(light.min_radius, light.max_radius)
    }

    fn food_placement(&mut self) -> Placement {
        let radius = self.config.food.radius;
        self.random_placement(radius, radius)
    }
}

/// Number of grid positions along an axis; at least one.
fn grid_cells(extent: f32, edge_offset: f32, spacing: f32) -> u32 {
    let cells = ((extent - 2.0 * edge_offset) / spacing).floor();
    if cells.is_finite() && cells >= 1.0 {
        cells as u32
    } else {
        1
    }
}
