//! Waypoint driver: steering and throttle from two path queries
//!
//! Every step the driver locates itself on the path, looks up how far ahead
//! it can see along the path from the precomputed profile, and steers toward
//! the path point that far ahead. Speed control is bang-bang against a
//! recommended speed derived from the look-ahead distance.

use std::collections::HashMap;

use log::{info, trace, warn};

use super::look_ahead::LookAheadProfile;
use super::{DriveCommand, DriveMode, VehicleState};
use crate::common::types::{world_up, Pose, Vec3};
use crate::common::{lerp, signed_angle};
use crate::config::DriverConfig;
use crate::error::Result;
use crate::navigation::path::{PathPoint, PathQuery};

/// Read-only snapshot for debug visualization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveTelemetry {
    pub mode: DriveMode,
    pub current: Option<PathPoint>,
    pub far: Option<PathPoint>,
    pub look_ahead: f64,
    /// Smoothed steering angle in degrees
    pub steering_angle: f64,
    pub command: DriveCommand,
}

/// Per-agent path follower. Not shared between agents.
#[derive(Debug, Clone)]
pub struct DriveController {
    config: DriverConfig,
    mode: DriveMode,
    steering_angle: f64,
    previous_steering_angle: f64,
    throttle: f64,
    brake: f64,
    look_ahead: f64,
    current: Option<PathPoint>,
    far: Option<PathPoint>,
    initial_pose: Option<Pose>,
}

impl DriveController {
    /// Create a new controller
    pub fn new(config: DriverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: DriverConfig) -> Self {
        DriveController {
            config,
            mode: DriveMode::Running,
            steering_angle: 0.0,
            previous_steering_angle: 0.0,
            throttle: 0.0,
            brake: 0.0,
            look_ahead: 0.0,
            current: None,
            far: None,
            initial_pose: None,
        }
    }

    /// Snap the agent onto the path and record that pose for `reset`.
    ///
    /// Returns the pose the host should place the agent at: the nearest path
    /// point, facing along the path.
    pub fn start<Q: PathQuery + ?Sized>(&mut self, path: &Q, position: &Vec3) -> Pose {
        let current = path.nearest_point(position);
        let pose = Pose {
            position: current.position,
            forward: current.direction,
            up: current.normal,
        };

        info!(
            "Driver starting on segment {} at path distance {:.2}",
            current.segment_index, current.path_distance
        );

        self.current = Some(current);
        self.initial_pose = Some(pose);
        pose
    }

    /// Run one control step.
    ///
    /// Path points and look-ahead are refreshed in every mode. Returns the
    /// command to apply, or `None` while paused or when the path has no
    /// segments.
    pub fn step<Q: PathQuery + ?Sized>(
        &mut self,
        path: &Q,
        profile: &LookAheadProfile,
        state: &VehicleState,
        delta_time: f64,
    ) -> Option<DriveCommand> {
        let current = path.nearest_point(&state.position);
        let look_ahead = profile.get(current.path_distance, profile.max_ahead_distance());
        let far = path.point_at_distance(current.path_distance + look_ahead);

        self.current = Some(current);
        self.far = far;
        self.look_ahead = look_ahead;

        if self.mode == DriveMode::Paused {
            return None;
        }
        let far = far?;

        let target = self.target_steering_angle(state, &current, &far);
        let t = self.config.smooth_steering_speed * delta_time;
        self.steering_angle = lerp(self.previous_steering_angle, target, t);
        self.previous_steering_angle = self.steering_angle;

        self.update_speed(&current, state.speed, look_ahead);

        let command = self.command();
        trace!(
            "seg={} dist={:.2} offset={:.2} ahead={:.1} steer={:.2} gas={} brake={}",
            current.segment_index,
            current.path_distance,
            current.signed_offset,
            look_ahead,
            command.steering,
            command.throttle,
            command.brake
        );
        Some(command)
    }

    /// Steering angle in degrees before smoothing
    fn target_steering_angle(&self, state: &VehicleState, current: &PathPoint, far: &PathPoint) -> f64 {
        let limit = self.config.steering_angle_limit;

        let desired = (far.position - state.position)
            .try_normalize(1e-9)
            .unwrap_or(state.forward);
        let mut angle = signed_angle(&state.forward, &desired, &world_up());

        if self.config.use_out_of_path_steering_fix {
            let offset = current.signed_offset;
            let fix = self.config.path_offset_steering_fix.evaluate(offset.abs());
            angle += if offset < 0.0 { -fix } else { fix };
        }

        let angle = angle.clamp(-limit, limit);

        // Less authority for small demands, full authority only at the limit
        let hard_steer_factor = (angle.abs() / limit).clamp(0.0, 1.0);
        angle * hard_steer_factor
    }

    /// Bang-bang throttle/brake against the recommended speed
    fn update_speed(&mut self, current: &PathPoint, speed: f64, look_ahead: f64) {
        let mut recommended = self.config.speed_by_look_ahead.evaluate(look_ahead);
        if self.config.respect_speed_limits {
            if let Some(limit) = current.speed_limit {
                recommended = recommended.min(limit);
            }
        }

        if recommended > speed {
            self.throttle = 1.0;
            self.brake = 0.0;
        } else {
            self.throttle = 0.0;
            self.brake = 1.0;
        }
    }

    /// The latest command, frozen while paused
    pub fn command(&self) -> DriveCommand {
        DriveCommand {
            steering: self.steering_angle / self.config.steering_angle_limit,
            throttle: self.throttle,
            brake: self.brake,
        }
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DriveMode) {
        if self.mode != mode {
            info!("Driver {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn pause(&mut self) {
        self.set_mode(DriveMode::Paused);
    }

    pub fn resume(&mut self) {
        self.set_mode(DriveMode::Running);
    }

    pub fn toggle_pause(&mut self) -> DriveMode {
        let next = match self.mode {
            DriveMode::Running => DriveMode::Paused,
            DriveMode::Paused => DriveMode::Running,
        };
        self.set_mode(next);
        next
    }

    /// Pose recorded by `start`, for the host to teleport the agent back to.
    ///
    /// Steering smoothing is kept and the vehicle body's momentum is the
    /// body's business.
    pub fn reset(&self) -> Option<Pose> {
        if self.initial_pose.is_some() {
            info!("Driver reset to initial pose");
        }
        self.initial_pose
    }

    pub fn initial_pose(&self) -> Option<Pose> {
        self.initial_pose
    }

    pub fn current_point(&self) -> Option<&PathPoint> {
        self.current.as_ref()
    }

    pub fn far_point(&self) -> Option<&PathPoint> {
        self.far.as_ref()
    }

    /// Look-ahead distance used by the last step
    pub fn look_ahead(&self) -> f64 {
        self.look_ahead
    }

    /// Smoothed steering angle in degrees
    pub fn steering_angle(&self) -> f64 {
        self.steering_angle
    }

    pub fn telemetry(&self) -> DriveTelemetry {
        DriveTelemetry {
            mode: self.mode,
            current: self.current,
            far: self.far,
            look_ahead: self.look_ahead,
            steering_angle: self.steering_angle,
            command: self.command(),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Retune scalar parameters by name. Nothing is applied if any value is
    /// invalid.
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        let mut config = self.config.clone();

        for (name, &value) in params {
            match name.as_str() {
                "steering_angle_limit" => config.steering_angle_limit = value,
                "smooth_steering_speed" => config.smooth_steering_speed = value,
                "use_out_of_path_steering_fix" => config.use_out_of_path_steering_fix = value != 0.0,
                "respect_speed_limits" => config.respect_speed_limits = value != 0.0,
                other => {
                    warn!("Ignoring unknown driver parameter '{}'", other);
                }
            }
        }

        if let Err(e) = config.validate() {
            warn!("Rejected driver parameters: {}", e);
            return Err(e);
        }

        // Keep the normalized command in range when the limit shrinks
        let limit = config.steering_angle_limit;
        self.steering_angle = self.steering_angle.clamp(-limit, limit);
        self.previous_steering_angle = self.steering_angle;
        self.config = config;
        Ok(())
    }
}

impl Default for DriveController {
    fn default() -> Self {
        Self::with_valid_config(DriverConfig::default())
    }
}
