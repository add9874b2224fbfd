//! Headless host shell for the Braitenberg arena: configuration loading, a
//! fixed-timestep driver and a JSON run report.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use braitenberg_core::{
    Arena, ArenaConfig, GameStatus, HungerState, Reconfiguration, RobotKind, TickEvents,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Load an arena configuration from a JSON file, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ArenaConfig> {
    let Some(path) = path else {
        return Ok(ArenaConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: ArenaConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    info!(path = %path.display(), "loaded arena configuration");
    Ok(config)
}

/// Population and sensitivity values supplied on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationOverrides {
    pub fear_robots: Option<u32>,
    pub explore_robots: Option<u32>,
    pub lights: Option<u32>,
    pub food: Option<u32>,
    pub sensitivity: Option<f32>,
}

impl PopulationOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reconfiguration that applies the overrides on top of the arena's
    /// current population, or `None` when nothing was overridden.
    #[must_use]
    pub fn request_for(&self, arena: &Arena) -> Option<Reconfiguration> {
        if self.is_empty() {
            return None;
        }
        let current = arena.population();
        Some(Reconfiguration {
            fear_robots: self.fear_robots.unwrap_or(current.fear_robots),
            explore_robots: self.explore_robots.unwrap_or(current.explore_robots),
            love_robots: current.love_robots,
            aggressive_robots: current.aggressive_robots,
            lights: self.lights.unwrap_or(current.lights),
            food: self.food.unwrap_or(current.food),
            sensitivity: self.sensitivity.unwrap_or(arena.sensitivity()),
        })
    }
}

/// Summary written at the end of a headless run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    /// Simulation ticks actually advanced.
    pub ticks: u64,
    /// Host frames processed, including paused ones.
    pub frames: u64,
    pub skipped_frames: u64,
    pub elapsed_seconds: f32,
    pub status: GameStatus,
    pub robots: u32,
    pub robots_by_kind: Vec<(RobotKind, u32)>,
    pub lights: u32,
    pub food: u32,
    pub hungry: u32,
    pub starving: u32,
    pub starved: u32,
}

/// Stands in for a render loop: one `advance_time` per frame unless paused.
#[derive(Debug)]
pub struct HeadlessDriver {
    arena: Arena,
    dt: f32,
    frames: u64,
    skipped_frames: u64,
}

impl HeadlessDriver {
    pub fn new(arena: Arena, dt: f32) -> Result<Self> {
        if !(dt > 0.0 && dt.is_finite()) {
            bail!("frame time must be a positive number of seconds, got {dt}");
        }
        Ok(Self {
            arena,
            dt,
            frames: 0,
            skipped_frames: 0,
        })
    }

    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Process one host frame. Returns `None` when the frame was skipped.
    pub fn frame(&mut self) -> Option<TickEvents> {
        self.frames += 1;
        if self.arena.is_paused() {
            self.skipped_frames += 1;
            return None;
        }
        let events = self.arena.advance_time(self.dt);
        if events.lost {
            info!(tick = events.tick.0, "game lost");
        }
        Some(events)
    }

    /// Run up to `max_frames` frames, stopping early once the game is over.
    pub fn run(&mut self, max_frames: u64) -> RunReport {
        for _ in 0..max_frames {
            if self.arena.status() != GameStatus::Playing {
                debug!(status = ?self.arena.status(), "stopping early");
                break;
            }
            self.frame();
        }
        self.report()
    }

    #[must_use]
    pub fn report(&self) -> RunReport {
        let population = self.arena.population();
        let mut report = RunReport {
            ticks: self.arena.tick().0,
            frames: self.frames,
            skipped_frames: self.skipped_frames,
            elapsed_seconds: self.arena.elapsed(),
            status: self.arena.status(),
            robots: population.robots(),
            robots_by_kind: vec![
                (RobotKind::Fear, population.fear_robots),
                (RobotKind::Explore, population.explore_robots),
                (RobotKind::Love, population.love_robots),
                (RobotKind::Aggressive, population.aggressive_robots),
            ],
            lights: population.lights,
            food: population.food,
            hungry: 0,
            starving: 0,
            starved: 0,
        };
        for robot in self.arena.robots() {
            match robot.hunger {
                HungerState::Fed => {}
                HungerState::Hungry => report.hungry += 1,
                HungerState::Starving => report.starving += 1,
                HungerState::Starved => report.starved += 1,
            }
        }
        report
    }
}

/// Write `report` as pretty JSON to `path`, or to stdout when no path is given.
pub fn write_report(report: &RunReport, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialise run report")?;
    match path {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use braitenberg_core::ArenaCommand;

    fn arena(seed: u64) -> Arena {
        Arena::new(ArenaConfig {
            rng_seed: Some(seed),
            ..ArenaConfig::default()
        })
        .expect("arena")
    }

    #[test]
    fn driver_rejects_bad_frame_time() {
        assert!(HeadlessDriver::new(arena(1), 0.0).is_err());
        assert!(HeadlessDriver::new(arena(1), f32::NAN).is_err());
        assert!(HeadlessDriver::new(arena(1), 0.02).is_ok());
    }

    #[test]
    fn paused_frames_are_skipped() {
        let mut driver = HeadlessDriver::new(arena(2), 0.02).expect("driver");
        driver.arena_mut().accept_command(ArenaCommand::Pause);
        let report = driver.run(10);
        assert_eq!(report.frames, 10);
        assert_eq!(report.skipped_frames, 10);
        assert_eq!(report.ticks, 0);

        driver.arena_mut().accept_command(ArenaCommand::Play);
        let report = driver.run(5);
        assert_eq!(report.ticks, 5);
        assert_eq!(report.skipped_frames, 10);
    }

    #[test]
    fn run_stops_once_game_is_lost() {
        let mut config = ArenaConfig {
            rng_seed: Some(3),
            ..ArenaConfig::default()
        };
        config.hunger.hungry_after = 2;
        config.hunger.starving_after = 4;
        config.hunger.starved_after = 6;
        config.population.food = 1;
        let arena = Arena::new(config).expect("arena");
        let mut driver = HeadlessDriver::new(arena, 0.02).expect("driver");
        let report = driver.run(100);
        assert_eq!(report.status, GameStatus::Lost);
        assert_eq!(report.ticks, 6);
        assert!(report.starved >= 1);
        assert_eq!(report.robots, 10);
    }

    #[test]
    fn overrides_keep_unset_counts() {
        let arena = arena(4);
        assert!(PopulationOverrides::default().request_for(&arena).is_none());
        let overrides = PopulationOverrides {
            lights: Some(7),
            sensitivity: Some(300.0),
            ..PopulationOverrides::default()
        };
        let request = overrides.request_for(&arena).expect("request");
        assert_eq!(request.lights, 7);
        assert_eq!(request.fear_robots, 5);
        assert_eq!(request.food, 4);
        assert_eq!(request.sensitivity, 300.0);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = load_config(Some(Path::new("/definitely/not/here.json")))
            .expect_err("missing file");
        assert!(err.to_string().contains("failed to read config file"));
        assert_eq!(load_config(None).expect("defaults"), ArenaConfig::default());
    }
}
