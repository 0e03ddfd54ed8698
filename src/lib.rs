//! Closed-loop waypoint path following.
//!
//! A [`Track`] turns an ordered loop of waypoints into a queryable path plus
//! a curvature-aware look-ahead profile. A [`DriveController`] steers a
//! vehicle toward the path point one look-ahead ahead of it and picks
//! throttle or brake from how far ahead it can see. [`Agent`] ties both to a
//! [`VehicleBody`] supplied by the host.
pub mod agent;
pub mod common;
pub mod config;
pub mod error;
pub mod navigation;

pub use crate::agent::{Agent, VehicleBody};
pub use crate::common::types::{Pose, Vec3};
pub use crate::config::Config;
pub use crate::error::{Result, WaypointError};
pub use crate::navigation::path::{PathModel, PathPoint, PathQuery, Waypoint};
pub use crate::navigation::path_follower::{
    DriveCommand, DriveController, DriveMode, LookAheadProfile, VehicleState,
};
pub use crate::navigation::Track;
