//! Inverse queries against a closed path

use log::debug;

use super::{PathModel, Segment};
use crate::common::circular;
use crate::common::types::Vec3;

/// A resolved location on the path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub segment_index: usize,
    pub position: Vec3,
    /// Distance along the loop, in `[0, length)`
    pub path_distance: f64,
    /// Lateral distance from the centerline. Negative when the queried
    /// position lies on the side the segment's `right` vector points to.
    pub signed_offset: f64,
    pub direction: Vec3,
    pub normal: Vec3,
    pub right: Vec3,
    pub speed_limit: Option<f64>,
    pub distance_to_segment_end: f64,
}

impl PathPoint {
    fn on_segment(
        index: usize,
        segment: &Segment,
        position: Vec3,
        path_distance: f64,
        signed_offset: f64,
        distance_to_segment_end: f64,
    ) -> Self {
        PathPoint {
            segment_index: index,
            position,
            path_distance,
            signed_offset,
            direction: segment.direction,
            normal: segment.normal,
            right: segment.right,
            speed_limit: segment.end_speed_limit,
            distance_to_segment_end,
        }
    }
}

/// Queries a driver needs against a closed path
pub trait PathQuery: Send + Sync {
    /// Closest point on the path to `position`
    fn nearest_point(&self, position: &Vec3) -> PathPoint;

    /// Point at `distance` along the loop, wrapping past the end.
    ///
    /// Returns `None` only for a path without segments.
    ///
    /// # Panics
    ///
    /// Panics if `distance` is negative or not finite.
    fn point_at_distance(&self, distance: f64) -> Option<PathPoint>;

    /// Total loop length
    fn length(&self) -> f64;
}

/// Offset sign: negative when `cross(offset, direction)` points down
fn sign_offset(offset: &Vec3, direction: &Vec3, magnitude: f64) -> f64 {
    if offset.cross(direction).y < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

impl PathModel {
    /// Best segment whose line `position` projects onto, with the squared
    /// lateral distance and the projected point
    fn best_projection(&self, position: &Vec3) -> Option<(usize, Vec3, f64)> {
        let mut best: Option<(usize, Vec3, f64)> = None;

        for (i, segment) in self.segments.iter().enumerate() {
            let from_to_position = position - segment.from;
            let along = segment.direction.dot(&from_to_position);
            if along < 0.0 {
                continue;
            }

            let max_sqr = segment.length * segment.length + self.projection_slack;
            if along * along >= max_sqr {
                continue;
            }

            let projected = segment.from + segment.direction * along;
            let sqr_distance = (position - projected).norm_squared();

            if best.map_or(true, |(_, _, min)| sqr_distance < min) {
                best = Some((i, projected, sqr_distance));
            }
        }

        best
    }

    /// Fallback when no segment takes the position: snap to the nearest
    /// segment start
    fn nearest_segment_start(&self, position: &Vec3) -> Option<PathPoint> {
        let (index, segment) = self.segments.iter().enumerate().min_by(|(_, a), (_, b)| {
            let da = (position - a.from).norm_squared();
            let db = (position - b.from).norm_squared();
            da.total_cmp(&db)
        })?;

        let offset = position - segment.from;
        let signed_offset = sign_offset(&offset, &segment.direction, offset.norm());

        debug!(
            "No segment projects {:?}, snapping to start of segment {}",
            position, index
        );

        Some(PathPoint::on_segment(
            index,
            segment,
            segment.from,
            segment.start_distance,
            signed_offset,
            segment.length,
        ))
    }
}

impl PathQuery for PathModel {
    fn nearest_point(&self, position: &Vec3) -> PathPoint {
        if let Some((index, projected, sqr_distance)) = self.best_projection(position) {
            let segment = &self.segments[index];

            let mut point = projected;
            let mut segment_distance = (projected - segment.from).norm();
            if segment_distance > segment.length {
                segment_distance = segment.length;
                point = segment.to;
            }

            let signed_offset = sign_offset(
                &(position - projected),
                &segment.direction,
                sqr_distance.sqrt(),
            );

            return PathPoint::on_segment(
                index,
                segment,
                point,
                circular::wrap(self.length, segment.start_distance + segment_distance),
                signed_offset,
                segment.length - segment_distance,
            );
        }

        // A built model always has segments, so the fallback always resolves
        match self.nearest_segment_start(position) {
            Some(point) => point,
            None => unreachable!("PathModel is built with at least 3 segments"),
        }
    }

    fn point_at_distance(&self, distance: f64) -> Option<PathPoint> {
        assert!(
            distance.is_finite() && distance >= 0.0,
            "Path distance must be finite and non-negative, got {}",
            distance
        );

        if self.segments.is_empty() {
            return None;
        }

        let wrapped = circular::wrap(self.length, distance);

        let index = self
            .segments
            .iter()
            .position(|s| wrapped >= s.start_distance && wrapped < s.end_distance())
            // Accumulated rounding can leave the very end of the loop uncovered
            .unwrap_or(self.segments.len() - 1);

        let segment = &self.segments[index];
        let segment_distance = (wrapped - segment.start_distance).clamp(0.0, segment.length);
        let position = segment.from + segment.direction * segment_distance;

        Some(PathPoint::on_segment(
            index,
            segment,
            position,
            wrapped,
            0.0,
            segment.length - segment_distance,
        ))
    }

    fn length(&self) -> f64 {
        self.length
    }
}
