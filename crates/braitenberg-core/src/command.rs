//! Directives and population requests the host sends to the arena.

use serde::{Deserialize, Serialize};

use crate::behavior::RobotKind;

/// Discrete control directives from the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArenaCommand {
    IncreaseSpeed,
    DecreaseSpeed,
    TurnLeft,
    TurnRight,
    Play,
    Pause,
    Reset,
    NewGame,
    #[default]
    None,
}

/// Target population and light sensitivity. Counts outside the configured
/// limits are clamped when applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Reconfiguration {
    pub fear_robots: u32,
    pub explore_robots: u32,
    #[serde(default)]
    pub love_robots: u32,
    #[serde(default)]
    pub aggressive_robots: u32,
    pub lights: u32,
    pub food: u32,
    pub sensitivity: f32,
}

impl Reconfiguration {
    /// Requested robot count for `kind`.
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
