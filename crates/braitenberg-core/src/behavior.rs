//! Braitenberg sensor-to-wheel wirings.

use serde::{Deserialize, Serialize};

use crate::motion::WheelVelocity;

/// Whether wheel speed rises (positive) or falls (negative) with proximity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Whether a sensor drives the wheel on its own side or the opposite one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Wiring {
    Direct,
    Crossed,
}

/// The four stateless steering policies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    Explore,
    Fear,
    Love,
    Aggressive,
}

impl BehaviorKind {
    #[must_use]
    pub const fn wiring(self) -> (Polarity, Wiring) {
        match self {
            Self::Explore => (Polarity::Negative, Wiring::Crossed),
            Self::Fear => (Polarity::Positive, Wiring::Direct),
            Self::Love => (Polarity::Negative, Wiring::Direct),
            Self::Aggressive => (Polarity::Positive, Wiring::Crossed),
        }
    }
}

/// A steering policy bound to the reading ceiling its negative wirings invert against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Behavior {
    kind: BehaviorKind,
    max_reading: f32,
}

impl Behavior {
    #[must_use]
    pub const fn new(kind: BehaviorKind, max_reading: f32) -> Self {
        Self { kind, max_reading }
    }

    #[must_use]
    pub const fn kind(&self) -> BehaviorKind {
        self.kind
    }

    #[must_use]
    pub const fn max_reading(&self) -> f32 {
        self.max_reading
    }

    /// Map a left/right reading pair to an unclamped wheel command.
    #[must_use]
    pub fn process_reading(&self, left: f32, right: f32) -> WheelVelocity {
        let (polarity, wiring) = self.kind.wiring();
        let (left, right) = match polarity {
            Polarity::Positive => (left, right),
            Polarity::Negative => (self.max_reading - left, self.max_reading - right),
        };
        match wiring {
            Wiring::Direct => WheelVelocity::new(left, right),
            Wiring::Crossed => WheelVelocity::new(right, left),
        }
    }
}

/// Robot personalities; each one selects the behavior used for light sensing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RobotKind {
    Fear,
    Explore,
    Love,
    Aggressive,
}

impl RobotKind {
    pub const ALL: [Self; 4] = [Self::Fear, Self::Explore, Self::Love, Self::Aggressive];

    #[must_use]
    pub const fn behavior(self) -> BehaviorKind {
        match self {
            Self::Fear => BehaviorKind::Fear,
            Self::Explore => BehaviorKind::Explore,
            Self::Love => BehaviorKind::Love,
            Self::Aggressive => BehaviorKind::Aggressive,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fear => "Fear",
            Self::Explore => "Explore",
            Self::Love => "Love",
            Self::Aggressive => "Aggressive",
        }
    }
}
