//! Closed piecewise-linear paths built from waypoints

pub mod query;

use log::info;
use serde::{Deserialize, Serialize};

use crate::common::types::{world_up, Vec3};
use crate::error::{Result, WaypointError};

pub use self::query::{PathPoint, PathQuery};

/// Slack added to the squared segment length when deciding whether a
/// position still projects onto a segment
pub const DEFAULT_PROJECTION_SLACK: f64 = 1.0;

/// A waypoint on the loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: [f64; 3],
    /// Speed limit at the end of the segment leading into this waypoint
    #[serde(default)]
    pub speed_limit: Option<f64>,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Waypoint {
            position: [x, y, z],
            speed_limit: None,
        }
    }

    pub fn with_speed_limit(mut self, speed_limit: f64) -> Self {
        self.speed_limit = Some(speed_limit);
        self
    }

    pub fn point(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }
}

impl From<Vec3> for Waypoint {
    fn from(position: Vec3) -> Self {
        Waypoint::new(position.x, position.y, position.z)
    }
}

/// One directed edge of the loop
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: Vec3,
    pub to: Vec3,
    /// Path-distance at `from`
    pub start_distance: f64,
    pub length: f64,
    pub direction: Vec3,
    pub right: Vec3,
    pub normal: Vec3,
    pub end_speed_limit: Option<f64>,
}

impl Segment {
    fn new(from: Vec3, to: Vec3, start_distance: f64, end_speed_limit: Option<f64>) -> Self {
        let edge = to - from;
        let length = edge.norm();
        let direction = edge / length;

        // Vertical edges have no horizontal right vector
        let right = world_up()
            .cross(&direction)
            .try_normalize(1e-9)
            .unwrap_or_else(Vec3::x);
        let normal = direction.cross(&right).normalize();

        Segment {
            from,
            to,
            start_distance,
            length,
            direction,
            right,
            normal,
            end_speed_limit,
        }
    }

    /// Path-distance at `to`
    pub fn end_distance(&self) -> f64 {
        self.start_distance + self.length
    }
}

fn coincide(a: &Vec3, b: &Vec3) -> bool {
    (b - a).norm_squared() <= f64::EPSILON
}

/// Number of waypoints at positions no earlier waypoint occupies
fn count_distinct(waypoints: &[Waypoint]) -> usize {
    let mut distinct: Vec<Vec3> = Vec::with_capacity(waypoints.len());
    for waypoint in waypoints {
        let point = waypoint.point();
        if !distinct.iter().any(|seen| coincide(seen, &point)) {
            distinct.push(point);
        }
    }
    distinct.len()
}

/// A closed loop of segments
#[derive(Debug, Clone)]
pub struct PathModel {
    segments: Vec<Segment>,
    length: f64,
    projection_slack: f64,
}

impl PathModel {
    /// Build a closed loop through `waypoints`.
    ///
    /// Segment `i` runs from waypoint `i` to waypoint `i + 1`; the last
    /// segment closes the loop back to waypoint 0, where path-distance starts.
    pub fn build(waypoints: &[Waypoint]) -> Result<Self> {
        if waypoints.len() < 3 {
            return Err(WaypointError::TooFewWaypoints(waypoints.len()));
        }

        if let Some(index) = waypoints
            .iter()
            .position(|w| w.position.iter().any(|c| !c.is_finite()))
        {
            return Err(WaypointError::NonFiniteWaypoint(index));
        }

        let distinct = count_distinct(waypoints);
        if distinct < 3 {
            return Err(WaypointError::TooFewDistinctWaypoints(distinct));
        }

        let mut segments = Vec::with_capacity(waypoints.len());
        let mut length = 0.0;

        for i in 0..waypoints.len() {
            let j = (i + 1) % waypoints.len();
            let from = waypoints[i].point();
            let to = waypoints[j].point();

            if coincide(&from, &to) {
                return Err(WaypointError::ZeroLengthSegment { from: i, to: j });
            }

            let segment = Segment::new(from, to, length, waypoints[j].speed_limit);
            length += segment.length;
            segments.push(segment);
        }

        if !(length > 0.0) {
            return Err(WaypointError::NonPositiveLength(length));
        }

        info!(
            "Built closed path with {} segments, length {:.2}",
            segments.len(),
            length
        );

        Ok(PathModel {
            segments,
            length,
            projection_slack: DEFAULT_PROJECTION_SLACK,
        })
    }

    /// Build from bare positions without speed limits
    pub fn from_points(points: &[Vec3]) -> Result<Self> {
        let waypoints: Vec<Waypoint> = points.iter().copied().map(Waypoint::from).collect();
        Self::build(&waypoints)
    }

    /// Override the slack used by nearest-point projection
    pub fn with_projection_slack(mut self, slack: f64) -> Self {
        self.projection_slack = slack.max(0.0);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Total loop length
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn projection_slack(&self) -> f64 {
        self.projection_slack
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
