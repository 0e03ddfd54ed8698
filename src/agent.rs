//! Binding between a driver, a track and a vehicle body

use log::{debug, info};

use crate::common::types::Pose;
use crate::config::DriverConfig;
use crate::error::Result;
use crate::navigation::path_follower::{DriveCommand, DriveController, DriveMode, VehicleState};
use crate::navigation::Track;

/// The vehicle being driven. Physics live on the other side of this trait.
pub trait VehicleBody {
    /// Current speed in world units per second
    fn current_speed(&self) -> f64;

    fn state(&self) -> VehicleState;

    fn apply(&mut self, command: &DriveCommand);

    /// Place the body at `pose`, dropping any momentum
    fn teleport(&mut self, pose: &Pose);
}

/// One vehicle following one track
pub struct Agent<B: VehicleBody> {
    track: Track,
    controller: DriveController,
    body: B,
}

impl<B: VehicleBody> Agent<B> {
    /// Snap `body` onto the track and prepare to drive it
    pub fn new(track: Track, config: DriverConfig, mut body: B) -> Result<Self> {
        let mut controller = DriveController::new(config)?;
        let pose = controller.start(track.path(), &body.state().position);
        body.teleport(&pose);

        Ok(Agent {
            track,
            controller,
            body,
        })
    }

    /// One control step. Returns the command applied to the body, if any.
    pub fn tick(&mut self, delta_time: f64) -> Option<DriveCommand> {
        let mut state = self.body.state();
        state.speed = self.body.current_speed();

        let command = self.controller.step(
            self.track.path(),
            self.track.profile(),
            &state,
            delta_time,
        )?;
        self.body.apply(&command);
        Some(command)
    }

    pub fn toggle_pause(&mut self) -> DriveMode {
        self.controller.toggle_pause()
    }

    /// Put the body back where the agent started
    pub fn reset(&mut self) {
        if let Some(pose) = self.controller.reset() {
            self.body.teleport(&pose);
        }
    }

    /// Switch to a rebuilt track
    pub fn set_track(&mut self, track: Track) {
        if !self.track.same_build(&track) {
            debug!("Agent switching to track of length {:.2}", track.length());
        }
        self.track = track;
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn controller(&self) -> &DriveController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut DriveController {
        &mut self.controller
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    /// Hand the body back, e.g. when the agent is despawned
    pub fn into_body(self) -> B {
        info!("Agent released its vehicle body");
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Vec3;
    use crate::config::LookAheadConfig;
    use crate::navigation::path::Waypoint;
    use approx::assert_relative_eq;

    struct RecordingBody {
        position: Vec3,
        forward: Vec3,
        speed: f64,
        applied: Vec<DriveCommand>,
        teleports: Vec<Pose>,
    }

    impl VehicleBody for RecordingBody {
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
            self.applied.push(*command);
        }

        fn teleport(&mut self, pose: &Pose) {
            self.position = pose.position;
            self.forward = pose.forward;
            self.speed = 0.0;
            self.teleports.push(*pose);
        }
    }

    fn track() -> Track {
        Track::new(
            &[
                Waypoint::new(0.0, 0.0, 0.0),
                Waypoint::new(10.0, 0.0, 0.0),
                Waypoint::new(10.0, 0.0, 10.0),
                Waypoint::new(0.0, 0.0, 10.0),
            ],
            LookAheadConfig::default(),
        )
        .unwrap()
    }

    fn body_at(x: f64, z: f64) -> RecordingBody {
        RecordingBody {
            position: Vec3::new(x, 0.0, z),
            forward: Vec3::z(),
            speed: 0.0,
            applied: Vec::new(),
            teleports: Vec::new(),
        }
    }

    #[test]
    fn test_new_snaps_body_onto_path() {
        let agent = Agent::new(track(), DriverConfig::default(), body_at(5.0, 1.0)).unwrap();

        let body = agent.body();
        assert_eq!(body.teleports.len(), 1);
        assert_relative_eq!(body.position, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(body.forward, Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_tick_applies_command() {
        let mut agent = Agent::new(track(), DriverConfig::default(), body_at(5.0, 1.0)).unwrap();

        let command = agent.tick(0.02).unwrap();
        assert_eq!(agent.body().applied, vec![command]);
        assert_eq!(command.throttle, 1.0);
    }

    #[test]
    fn test_paused_agent_applies_nothing() {
        let mut agent = Agent::new(track(), DriverConfig::default(), body_at(5.0, 1.0)).unwrap();

        assert_eq!(agent.toggle_pause(), DriveMode::Paused);
        assert!(agent.tick(0.02).is_none());
        assert!(agent.body().applied.is_empty());
        assert!(agent.controller().current_point().is_some());

        assert_eq!(agent.toggle_pause(), DriveMode::Running);
        assert!(agent.tick(0.02).is_some());
    }

    #[test]
    fn test_reset_teleports_to_start() {
        let mut agent = Agent::new(track(), DriverConfig::default(), body_at(5.0, 1.0)).unwrap();

        agent.body_mut().position = Vec3::new(10.0, 0.0, 7.0);
        agent.body_mut().speed = 12.0;
        agent.reset();

        let body = agent.body();
        assert_eq!(body.teleports.len(), 2);
        assert_eq!(body.teleports[0], body.teleports[1]);
        assert_relative_eq!(body.position, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(body.speed, 0.0);
    }

    #[test]
    fn test_controller_retuned_through_agent() {
        let mut agent = Agent::new(track(), DriverConfig::default(), body_at(5.0, 1.0)).unwrap();

        let mut params = std::collections::HashMap::new();
        params.insert("steering_angle_limit".to_string(), 30.0);
        agent.controller_mut().configure(&params).unwrap();
        assert_relative_eq!(agent.controller().config().steering_angle_limit, 30.0);

        agent.tick(0.02);
        let body = agent.into_body();
        assert_eq!(body.applied.len(), 1);
        assert_eq!(body.teleports.len(), 1);
    }

    #[test]
    fn test_set_track() {
        let mut agent = Agent::new(track(), DriverConfig::default(), body_at(5.0, 1.0)).unwrap();

        let mut rebuilt = agent.track().clone();
        rebuilt
            .rebuild(&[
                Waypoint::new(0.0, 0.0, 0.0),
                Waypoint::new(30.0, 0.0, 0.0),
                Waypoint::new(30.0, 0.0, 10.0),
                Waypoint::new(0.0, 0.0, 10.0),
            ])
            .unwrap();
        agent.set_track(rebuilt);

        assert_relative_eq!(agent.track().length(), 80.0);
        agent.tick(0.02);
        assert_relative_eq!(
            agent.controller().current_point().unwrap().path_distance,
            5.0,
            epsilon = 1e-9
        );
    }
}
