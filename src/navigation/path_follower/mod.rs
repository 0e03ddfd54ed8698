//! Path following: look-ahead profile and the driving control law

pub mod driver;
pub mod look_ahead;

use crate::common::types::Vec3;

pub use driver::{DriveController, DriveTelemetry};
pub use look_ahead::LookAheadProfile;

/// What the vehicle body reports each step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Vec3,
    pub forward: Vec3,
    pub speed: f64,
}

/// Normalized command for the vehicle body
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveCommand {
    /// Steering in [-1, 1], fraction of the steering angle limit
    pub steering: f64,
    /// Throttle in [0, 1]
    pub throttle: f64,
    /// Brake intensity in [0, 1]
    pub brake: f64,
}

impl DriveCommand {
    /// Brake as a negative value, for bodies that take a signed
    /// footbrake input
    pub fn legacy_brake(&self) -> f64 {
        -self.brake
    }
}

/// Whether the driver is sending commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveMode {
    #[default]
    Running,
    Paused,
}
