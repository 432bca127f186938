//! Strider locomotion CLI.
//!
//! Provides two modes of operation:
//! - `headless`: Walk the robot around a square and print gait statistics
//! - `info`: Print workspace crate versions and configuration

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use nalgebra::Vector3;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strider_core::prelude::*;
use strider_gait::ControllerConfig;
use strider_sim::Simulation;
use strider_teleop::Command;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Procedural legged locomotion controller.
#[derive(Parser)]
#[command(name = "strider", version, about)]
struct Cli {
    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a square path without rendering and print gait statistics.
    Headless {
        /// Number of fixed ticks to run (the last frame may run a few more).
        #[arg(short = 'n', long, default_value_t = 2400)]
        ticks: u64,

        /// Tick length in seconds.
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,

        /// Controller configuration (TOML). Overrides `--legs`.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Built-in robot: 4 (quadruped) or 6 (hexapod).
        #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(4..=6))]
        legs: u8,

        /// Side length of the square path.
        #[arg(long, default_value_t = 4.0)]
        side: f64,

        /// Seconds between shots; 0 disables firing.
        #[arg(long, default_value_t = 0.5)]
        fire_every: f64,
    },

    /// Print crate information.
    Info,
}

struct HeadlessOptions {
    ticks: u64,
    dt: f64,
    config: Option<PathBuf>,
    legs: u8,
    side: f64,
    fire_every: f64,
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn controller_config(path: Option<&PathBuf>, legs: u8) -> Result<ControllerConfig, StriderError> {
    match (path, legs) {
        (Some(path), _) => Ok(ControllerConfig::from_file(path)?),
        (None, 4) => Ok(ControllerConfig::quadruped()),
        (None, 6) => Ok(ControllerConfig::hexapod()),
        (None, other) => Err(ConfigError::invalid("legs", format!("no built-in robot with {other} legs")).into()),
    }
}

/// Corner `index` of an axis-aligned square that starts at the origin and
/// runs forward then left.
fn waypoint(side: f64, index: usize) -> Vector3<f64> {
    match index % 4 {
        0 => Vector3::new(side, 0.0, 0.0),
        1 => Vector3::new(side, 0.0, -side),
        2 => Vector3::new(0.0, 0.0, -side),
        _ => Vector3::zeros(),
    }
}

/// Frame lengths that wobble around 60 Hz with an occasional long frame.
fn frame_delta(frame: u64) -> Duration {
    match frame % 10 {
        9 => Duration::from_millis(50),
        n if n % 2 == 0 => Duration::from_millis(15),
        _ => Duration::from_millis(18),
    }
}

const ARRIVAL_RADIUS: f64 = 0.25;

fn run_headless(options: &HeadlessOptions) -> Result<(), StriderError> {
    let sim_config = SimConfig {
        tick_dt: options.dt,
        ..SimConfig::default()
    };
    sim_config.validate()?;
    if !(options.side > 0.0 && options.side.is_finite()) {
        return Err(ConfigError::invalid("side", "must be a positive length").into());
    }

    let config = controller_config(options.config.as_ref(), options.legs)?;
    let mut sim = Simulation::new(config)?;
    let mut clock = TickClock::new(sim_config.tick_dt)
        .with_max_ticks_per_frame(sim_config.max_ticks_per_frame);

    let mut corner = 0;
    sim.apply(Command::SetTarget(waypoint(options.side, corner)));
    sim.apply(Command::SetCursor(waypoint(options.side, corner)));
    let mut next_shot = options.fire_every;

    info!(ticks = options.ticks, dt = sim_config.tick_dt, "headless run started");

    let mut frame = 0;
    while clock.time().ticks() < options.ticks {
        sim.run_frame(&mut clock, frame_delta(frame));
        frame += 1;

        let body = sim.controller().body_position();
        if (body - sim.input().target).norm() < ARRIVAL_RADIUS {
            corner += 1;
            let next = waypoint(options.side, corner);
            info!(corner = corner % 4, x = next.x, z = next.z, "heading to next corner");
            sim.apply(Command::SetTarget(next));
            sim.apply(Command::SetCursor(next));
        }

        if options.fire_every > 0.0 && clock.time().secs_f64() >= next_shot {
            sim.apply(Command::Fire);
            next_shot += options.fire_every;
        }
    }

    let stats = sim.stats();
    let body = sim.controller().body_position();
    println!("time: {}", clock.time());
    println!(
        "steps: lift-offs={}, touchdowns={}, max swinging={}",
        stats.lift_offs, stats.touchdowns, stats.max_swinging
    );
    if let Some(rate) = stats.step_rate(sim_config.tick_dt) {
        println!("step rate: {rate:.2} lift-offs/s");
    }
    println!("corners reached: {corner}");
    println!(
        "body: ({:.3}, {:.3}, {:.3}), yaw {:.3} rad",
        body.x,
        body.y,
        body.z,
        sim.controller().yaw()
    );
    println!(
        "projectiles: live={}, expired={}",
        sim.projectiles().len(),
        sim.projectiles().expired()
    );
    Ok(())
}

fn run_info() {
    println!("strider v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  strider-core   {}", env!("CARGO_PKG_VERSION"));
    println!("  strider-ik     {}", env!("CARGO_PKG_VERSION"));
    println!("  strider-gait   {}", env!("CARGO_PKG_VERSION"));
    println!("  strider-teleop {}", env!("CARGO_PKG_VERSION"));
    println!("  strider-sim    {}", env!("CARGO_PKG_VERSION"));
    println!();
    let config = SimConfig::default();
    println!("default tick: {:.4} s ({:.0} Hz)", config.tick_dt, config.tick_hz());
    println!("edition: 2024");
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("strider={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Headless {
            ticks,
            dt,
            config,
            legs,
            side,
            fire_every,
        }) => run_headless(&HeadlessOptions {
            ticks,
            dt,
            config,
            legs,
            side,
            fire_every,
        }),
        Some(Commands::Info) => {
            run_info();
            Ok(())
        }
        None => run_headless(&HeadlessOptions {
            ticks: 2400,
            dt: 1.0 / 60.0,
            config: None,
            legs: 4,
            side: 4.0,
            fire_every: 0.5,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
