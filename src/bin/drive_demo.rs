//! Drive a simple kinematic vehicle around a waypoint track.
//!
//! # Usage
//!
//! ```bash
//! # Default track
//! RUST_LOG=debug drive_demo
//!
//! # Custom track, 20 simulated seconds
//! drive_demo --config my_track.toml --steps 1000
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use nalgebra::{Rotation3, Vector3};

use waypoint_core::common::circular::forward_delta;
use waypoint_core::config::{DriverConfig, LookAheadConfig, TrackConfig};
use waypoint_core::{
    Agent, Config, DriveCommand, DriveMode, Pose, Track, Vec3, VehicleBody, VehicleState, Waypoint,
};

const DEFAULT_CONFIG: &str = "config/square_track.toml";
const DELTA_TIME: f64 = 0.02;

/// Point-mass car with a yaw rate proportional to steering
struct KinematicBody {
    position: Vec3,
    forward: Vec3,
    speed: f64,
    acceleration: f64,
    braking: f64,
    max_speed: f64,
    /// Yaw rate at full lock, degrees per second
    max_yaw_rate: f64,
    pending: DriveCommand,
}

impl KinematicBody {
    fn new(position: Vec3) -> Self {
        KinematicBody {
            position,
            forward: Vec3::x(),
            speed: 0.0,
            acceleration: 40.0,
            braking: 80.0,
            max_speed: 120.0,
            max_yaw_rate: 120.0,
            pending: DriveCommand::default(),
        }
    }

    /// Integrate the last applied command over `dt`
    fn integrate(&mut self, dt: f64) {
        let command = self.pending;

        self.speed += (command.throttle * self.acceleration - command.brake * self.braking) * dt;
        self.speed = self.speed.clamp(0.0, self.max_speed);

        let yaw = (command.steering * self.max_yaw_rate * dt).to_radians();
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), yaw);
        self.forward = (rotation * self.forward).normalize();

        self.position += self.forward * self.speed * dt;
    }
}

impl VehicleBody for KinematicBody {
    fn current_speed(&self) -> f64 {
        self.speed
    }

    fn state(&self) -> VehicleState {
        VehicleState {
            position: self.position,
            forward: self.forward,
            speed: self.speed,
        }
    }

    fn apply(&mut self, command: &DriveCommand) {
        self.pending = *command;
    }

    fn teleport(&mut self, pose: &Pose) {
        self.position = pose.position;
        self.forward = pose.forward;
        self.speed = 0.0;
        self.pending = DriveCommand::default();
    }
}

/// Drive a kinematic car around a waypoint track
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Track configuration file (default: config/square_track.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of 20 ms control steps to simulate
    #[arg(short = 'n', long, default_value = "3000")]
    steps: usize,
}

/// Fallback track when no config file is available
fn builtin_config() -> Config {
    Config {
        track: TrackConfig {
            waypoints: vec![
                Waypoint::new(0.0, 0.0, 0.0),
                Waypoint::new(300.0, 0.0, 0.0),
                Waypoint::new(300.0, 0.0, 300.0),
                Waypoint::new(0.0, 0.0, 300.0),
            ],
        },
        look_ahead: LookAheadConfig::default(),
        driver: DriverConfig::default(),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if default.exists() {
                Config::load(&default)
                    .with_context(|| format!("Failed to load config from {}", default.display()))
            } else {
                warn!("{} not found, using built-in track", DEFAULT_CONFIG);
                Ok(builtin_config())
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(args.config)?;

    let track = Track::from_config(&config)?;
    let start = config.track.waypoints[0].point() + Vec3::new(0.0, 0.0, 3.0);
    let mut agent = Agent::new(track, config.driver.clone(), KinematicBody::new(start))?;

    let lap_length = agent.track().length();
    let mut travelled = 0.0;
    let mut last_distance = 0.0;
    let mut worst_offset: f64 = 0.0;

    info!("Driving {} steps on a {:.1} long track", args.steps, lap_length);

    for step in 0..args.steps {
        // Exercise pause for a second midway
        if step == args.steps / 2 || step == args.steps / 2 + 50 {
            let mode = agent.toggle_pause();
            info!("Step {}: driver {:?}", step, mode);
        }

        let command = agent.tick(DELTA_TIME);
        if command.is_none() && agent.controller().mode() == DriveMode::Paused {
            agent.body_mut().apply(&DriveCommand {
                brake: 1.0,
                ..DriveCommand::default()
            });
        }
        agent.body_mut().integrate(DELTA_TIME);

        if let Some(current) = agent.controller().current_point() {
            let delta = forward_delta(lap_length, last_distance, current.path_distance);
            // Sliding back a little would otherwise count as nearly a lap
            if delta < lap_length / 2.0 {
                travelled += delta;
            }
            last_distance = current.path_distance;
            worst_offset = worst_offset.max(current.signed_offset.abs());
        }

        if step % 250 == 0 {
            let telemetry = agent.controller().telemetry();
            info!(
                "Step {:5}: speed {:6.1} look-ahead {:5.1} steer {:+.2} offset {:+.2}",
                step,
                agent.body().current_speed(),
                telemetry.look_ahead,
                telemetry.command.steering,
                telemetry.current.map(|c| c.signed_offset).unwrap_or(0.0)
            );
        }
    }

    info!(
        "Done: {:.2} laps, worst path offset {:.2}",
        travelled / lap_length,
        worst_offset
    );

    agent.reset();
    info!("Agent reset to {:?}", agent.body().state().position);

    Ok(())
}
