//! Core simulation engine for the Braitenberg vehicle arena.
//!
//! Robots carry light and food sensors wired to their wheels, lights drift
//! around the arena and food sits still. [`Arena`] owns every entity and
//! advances them one fixed timestep at a time.

pub mod arena;
pub mod behavior;
pub mod collision;
pub mod command;
pub mod config;
pub mod entity;
pub mod factory;
pub mod geometry;
pub mod motion;
pub mod sensor;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use arena::{Arena, EntityRegistry, EntityView, Population, RobotView, SensorView, TickEvents};
pub use behavior::{Behavior, BehaviorKind, RobotKind};
pub use command::{ArenaCommand, Reconfiguration};
pub use config::{ArenaConfig, CollisionPolicy};
pub use entity::{ArenaEntity, Entity, EntityId, EntityKind, HungerState, Wall};
pub use factory::EntityFactory;
pub use geometry::{Pose, Position};
pub use motion::WheelVelocity;

/// Simulation clock (ticks processed since the last reset).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Overall outcome of the current game.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    Lost,
}

/// Errors raised while building an arena or its entities.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// The factory cannot build entities of this kind.
    #[error("unsupported entity kind: {0:?}")]
    UnsupportedEntityKind(EntityKind),
}
