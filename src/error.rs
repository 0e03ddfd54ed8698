//! Error types for waypoint path following

use thiserror::Error;

/// Errors raised while building paths, curves and configuration.
///
/// Everything here is a setup-time failure. Caller contract violations
/// (negative query distances and the like) panic instead.
#[derive(Error, Debug)]
pub enum WaypointError {
    #[error("A closed path needs at least 3 waypoints, got {0}")]
    TooFewWaypoints(usize),

    #[error("A closed path needs at least 3 distinct waypoints, got {0}")]
    TooFewDistinctWaypoints(usize),

    #[error("Waypoints {from} and {to} coincide, segment would have zero length")]
    ZeroLengthSegment { from: usize, to: usize },

    #[error("Waypoint {0} has a non-finite coordinate")]
    NonFiniteWaypoint(usize),

    #[error("Path total length must be positive, got {0}")]
    NonPositiveLength(f64),

    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for WaypointError {
    fn from(e: toml::de::Error) -> Self {
        WaypointError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WaypointError>;
