//! Configuration loading for the waypoint driver

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::curve::Curve;
use crate::error::{Result, WaypointError};
use crate::navigation::path::Waypoint;

/// Main configuration structure
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub track: TrackConfig,
    #[serde(default)]
    pub look_ahead: LookAheadConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

/// Waypoints of the closed loop, in driving order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackConfig {
    pub waypoints: Vec<Waypoint>,
}

/// Look-ahead profile parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LookAheadConfig {
    /// Longest look-ahead, used on straights (default: 100)
    #[serde(default = "default_max_ahead_distance")]
    pub max_ahead_distance: f64,

    /// Shortest look-ahead, used before sharp corners (default: 15)
    #[serde(default = "default_min_ahead_distance")]
    pub min_ahead_distance: f64,

    /// Lateral deviation from the current heading line that ends the
    /// forward scan (default: 5)
    #[serde(default = "default_max_ahead_path_offset")]
    pub max_ahead_path_offset: f64,

    /// Distance between profile samples and scan steps (default: 1)
    #[serde(default = "default_scan_step")]
    pub scan_step: f64,
}

/// Steering and speed tunables
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Steering saturation in degrees (default: 45)
    #[serde(default = "default_steering_angle_limit")]
    pub steering_angle_limit: f64,

    /// Steering smoothing rate, per second (default: 15)
    #[serde(default = "default_smooth_steering_speed")]
    pub smooth_steering_speed: f64,

    /// Add a steering correction proportional to the path offset
    #[serde(default)]
    pub use_out_of_path_steering_fix: bool,

    /// Offset magnitude -> correction in degrees
    #[serde(default = "default_path_offset_steering_fix")]
    pub path_offset_steering_fix: Curve,

    /// Look-ahead distance -> recommended speed
    #[serde(default = "default_speed_by_look_ahead")]
    pub speed_by_look_ahead: Curve,

    /// Cap the recommended speed with waypoint speed limits
    #[serde(default)]
    pub respect_speed_limits: bool,
}

impl Default for LookAheadConfig {
    fn default() -> Self {
        Self {
            max_ahead_distance: default_max_ahead_distance(),
            min_ahead_distance: default_min_ahead_distance(),
            max_ahead_path_offset: default_max_ahead_path_offset(),
            scan_step: default_scan_step(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            steering_angle_limit: default_steering_angle_limit(),
            smooth_steering_speed: default_smooth_steering_speed(),
            use_out_of_path_steering_fix: false,
            path_offset_steering_fix: default_path_offset_steering_fix(),
            speed_by_look_ahead: default_speed_by_look_ahead(),
            respect_speed_limits: false,
        }
    }
}

// Default value functions
fn default_max_ahead_distance() -> f64 {
    100.0
}
fn default_min_ahead_distance() -> f64 {
    15.0
}
fn default_max_ahead_path_offset() -> f64 {
    5.0
}
fn default_scan_step() -> f64 {
    1.0
}
fn default_steering_angle_limit() -> f64 {
    45.0
}
fn default_smooth_steering_speed() -> f64 {
    15.0
}
fn default_path_offset_steering_fix() -> Curve {
    Curve::from_known_keys(&[(0.0, 0.0), (10.0, 10.0)])
}
fn default_speed_by_look_ahead() -> Curve {
    Curve::from_known_keys(&[(0.0, 20.0), (20.0, 200.0)])
}

impl LookAheadConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.scan_step > 0.0) {
            return Err(WaypointError::InvalidParameter(
                "scan_step must be positive".to_string(),
            ));
        }
        if !(self.max_ahead_distance > 0.0) {
            return Err(WaypointError::InvalidParameter(
                "max_ahead_distance must be positive".to_string(),
            ));
        }
        if !(self.min_ahead_distance >= 0.0) || self.min_ahead_distance > self.max_ahead_distance {
            return Err(WaypointError::InvalidParameter(format!(
                "min_ahead_distance must be in [0, {}], got {}",
                self.max_ahead_distance, self.min_ahead_distance
            )));
        }
        if !(self.max_ahead_path_offset >= 0.0) {
            return Err(WaypointError::InvalidParameter(
                "max_ahead_path_offset must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.steering_angle_limit > 0.0) {
            return Err(WaypointError::InvalidParameter(
                "steering_angle_limit must be positive".to_string(),
            ));
        }
        if !(self.smooth_steering_speed >= 0.0) {
            return Err(WaypointError::InvalidParameter(
                "smooth_steering_speed must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.track.waypoints.len() < 3 {
            return Err(WaypointError::Config(format!(
                "track needs at least 3 waypoints, got {}",
                self.track.waypoints.len()
            )));
        }
        self.look_ahead.validate()?;
        self.driver.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SQUARE: &str = r#"
        [track]
        waypoints = [
            { position = [0.0, 0.0, 0.0] },
            { position = [10.0, 0.0, 0.0], speed_limit = 8.0 },
            { position = [10.0, 0.0, 10.0] },
            { position = [0.0, 0.0, 10.0] },
        ]
    "#;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = Config::from_toml(SQUARE).unwrap();

        assert_eq!(config.track.waypoints.len(), 4);
        assert_eq!(config.track.waypoints[1].speed_limit, Some(8.0));
        assert_relative_eq!(config.look_ahead.max_ahead_distance, 100.0);
        assert_relative_eq!(config.look_ahead.min_ahead_distance, 15.0);
        assert_relative_eq!(config.look_ahead.max_ahead_path_offset, 5.0);
        assert_relative_eq!(config.look_ahead.scan_step, 1.0);
        assert_relative_eq!(config.driver.steering_angle_limit, 45.0);
        assert_relative_eq!(config.driver.smooth_steering_speed, 15.0);
        assert!(!config.driver.use_out_of_path_steering_fix);
        assert_relative_eq!(config.driver.speed_by_look_ahead.evaluate(20.0), 200.0);
        assert_relative_eq!(config.driver.path_offset_steering_fix.evaluate(5.0), 5.0);
    }

    #[test]
    fn test_overrides() {
        let text = format!(
            "{}\n{}",
            SQUARE,
            r#"
            [look_ahead]
            max_ahead_distance = 30.0
            min_ahead_distance = 4.0

            [driver]
            steering_angle_limit = 30.0
            use_out_of_path_steering_fix = true
            speed_by_look_ahead = [[0.0, 5.0], [30.0, 50.0]]
            "#
        );
        let config = Config::from_toml(&text).unwrap();

        assert_relative_eq!(config.look_ahead.max_ahead_distance, 30.0);
        assert_relative_eq!(config.look_ahead.min_ahead_distance, 4.0);
        assert_relative_eq!(config.driver.steering_angle_limit, 30.0);
        assert!(config.driver.use_out_of_path_steering_fix);
        assert_relative_eq!(config.driver.speed_by_look_ahead.evaluate(15.0), 27.5);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let text = format!("{}\n[look_ahead]\nscan_step = 0.0\n", SQUARE);
        assert!(matches!(
            Config::from_toml(&text),
            Err(WaypointError::InvalidParameter(_))
        ));

        let text = format!(
            "{}\n[look_ahead]\nmax_ahead_distance = 10.0\nmin_ahead_distance = 20.0\n",
            SQUARE
        );
        assert!(Config::from_toml(&text).is_err());

        let text = format!("{}\n[driver]\nsteering_angle_limit = -1.0\n", SQUARE);
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn test_rejects_short_track() {
        let text = r#"
            [track]
            waypoints = [{ position = [0.0, 0.0, 0.0] }, { position = [1.0, 0.0, 0.0] }]
        "#;
        assert!(matches!(Config::from_toml(text), Err(WaypointError::Config(_))));
    }

    #[test]
    fn test_parse_error_is_config_error() {
        assert!(matches!(
            Config::from_toml("[track\nwaypoints = 3"),
            Err(WaypointError::Config(_))
        ));
    }
}
