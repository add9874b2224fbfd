use std::path::PathBuf;

use anyhow::{Context, Result};
use braitenberg_app::{HeadlessDriver, PopulationOverrides, load_config, write_report};
use braitenberg_core::Arena;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "braitenberg-app",
    version,
    about = "Run the Braitenberg vehicle arena headless and report the outcome"
)]
struct Cli {
    /// JSON arena configuration; omitted fields keep their defaults.
    #[arg(long, env = "BRAITENBERG_CONFIG")]
    config: Option<PathBuf>,

    /// Number of host frames to run.
    #[arg(long, env = "BRAITENBERG_TICKS", default_value_t = 600)]
    ticks: u64,

    /// Simulation seconds per frame.
    #[arg(long, env = "BRAITENBERG_DT", default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// RNG seed for reproducible placement.
    #[arg(long, env = "BRAITENBERG_SEED")]
    seed: Option<u64>,

    #[arg(long, env = "BRAITENBERG_FEAR")]
    fear: Option<u32>,

    #[arg(long, env = "BRAITENBERG_EXPLORE")]
    explore: Option<u32>,

    #[arg(long, env = "BRAITENBERG_LIGHTS")]
    lights: Option<u32>,

    /// Food sources; zero switches hunger off.
    #[arg(long, env = "BRAITENBERG_FOOD")]
    food: Option<u32>,

    /// Light sensor numerator.
    #[arg(long, env = "BRAITENBERG_SENSITIVITY")]
    sensitivity: Option<f32>,

    /// Write the JSON run report here instead of stdout.
    #[arg(long, env = "BRAITENBERG_REPORT")]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.rng_seed = Some(seed);
    }
    let mut arena = Arena::new(config).context("failed to build arena")?;

    let overrides = PopulationOverrides {
        fear_robots: cli.fear,
        explore_robots: cli.explore,
        lights: cli.lights,
        food: cli.food,
        sensitivity: cli.sensitivity,
    };
    if let Some(request) = overrides.request_for(&arena) {
        arena.apply_reconfiguration(&request);
    }

    let mut driver = HeadlessDriver::new(arena, cli.dt)?;
    info!(frames = cli.ticks, dt = cli.dt, "starting headless run");
    let report = driver.run(cli.ticks);
    info!(
        ticks = report.ticks,
        status = ?report.status,
        hungry = report.hungry,
        starving = report.starving,
        starved = report.starved,
        "headless run finished"
    );
    write_report(&report, cli.report.as_deref())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
