//! Navigation: the closed path and the driver that follows it
pub mod path;
pub mod path_follower;

use std::sync::Arc;

use log::info;

use self::path::{PathModel, Waypoint};
use self::path_follower::LookAheadProfile;
use crate::config::{Config, LookAheadConfig};
use crate::error::Result;

/// A built track: the path and its look-ahead profile.
///
/// Both are immutable once built and shared by every agent on the track.
/// Rebuilding swaps in fresh copies; agents holding the old ones keep them
/// until they pick up the new track.
#[derive(Debug, Clone)]
pub struct Track {
    path: Arc<PathModel>,
    profile: Arc<LookAheadProfile>,
    look_ahead_config: LookAheadConfig,
}

impl Track {
    /// Build a track through `waypoints`
    pub fn new(waypoints: &[Waypoint], look_ahead_config: LookAheadConfig) -> Result<Self> {
        look_ahead_config.validate()?;

        let path = PathModel::build(waypoints)?;
        let profile = LookAheadProfile::build(&path, &look_ahead_config);

        info!(
            "Track ready: {} segments, length {:.2}, {} look-ahead samples",
            path.segments().len(),
            path.length(),
            profile.samples().len()
        );

        Ok(Track {
            path: Arc::new(path),
            profile: Arc::new(profile),
            look_ahead_config,
        })
    }

    /// Build the track described by a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.track.waypoints, config.look_ahead.clone())
    }

    /// Rebuild after the waypoints changed. On error the track is unchanged.
    pub fn rebuild(&mut self, waypoints: &[Waypoint]) -> Result<()> {
        let rebuilt = Self::new(waypoints, self.look_ahead_config.clone())?;
        *self = rebuilt;
        Ok(())
    }

    pub fn path(&self) -> &PathModel {
        &self.path
    }

    pub fn profile(&self) -> &LookAheadProfile {
        &self.profile
    }

    pub fn length(&self) -> f64 {
        self.path.length()
    }

    pub fn look_ahead_config(&self) -> &LookAheadConfig {
        &self.look_ahead_config
    }

    /// Whether `other` shares this track's built data
    pub fn same_build(&self, other: &Track) -> bool {
        Arc::ptr_eq(&self.path, &other.path)
    }
}
