//! Curvature-aware look-ahead distances
//!
//! Each sample records how far ahead the path stays close to the straight
//! line the driver is currently on. Straights give long look-ahead, the
//! approach to a sharp corner gives short look-ahead, so the driver aims
//! inside the turn instead of cutting it.

use log::debug;

use crate::common::circular;
use crate::config::LookAheadConfig;
use crate::navigation::path::{PathPoint, PathQuery};

/// Precomputed `(path_distance, look_ahead)` samples over one lap
#[derive(Debug, Clone)]
pub struct LookAheadProfile {
    samples: Vec<(f64, f64)>,
    length: f64,
    max_ahead_distance: f64,
}

impl LookAheadProfile {
    /// Sample `path` every `scan_step` from 0 to its length
    pub fn build<Q: PathQuery + ?Sized>(path: &Q, config: &LookAheadConfig) -> Self {
        let length = path.length();
        let step = config.scan_step;

        let mut samples = Vec::new();
        if length > 0.0 && step > 0.0 {
            let count = (length / step).ceil() as usize;
            samples.reserve(count);

            for k in 0..count {
                let distance = k as f64 * step;
                if distance >= length {
                    break;
                }
                let Some(from) = path.point_at_distance(distance) else {
                    break;
                };

                let ahead = scan_ahead(path, &from, config);
                samples.push((distance, ahead.max(config.min_ahead_distance)));
            }
        }

        if !samples.is_empty() {
            let shortest = samples.iter().map(|s| s.1).fold(f64::INFINITY, f64::min);
            let longest = samples.iter().map(|s| s.1).fold(0.0, f64::max);
            debug!(
                "Look-ahead profile: {} samples, range {:.1}..{:.1}",
                samples.len(),
                shortest,
                longest
            );
        }

        LookAheadProfile {
            samples,
            length,
            max_ahead_distance: config.max_ahead_distance,
        }
    }

    /// Look-ahead at `path_distance`, or `default` when there are no samples.
    ///
    /// Uses the nearest sample at or before the wrapped distance.
    pub fn get(&self, path_distance: f64, default: f64) -> f64 {
        if self.samples.is_empty() || !(self.length > 0.0) {
            return default;
        }

        let wrapped = circular::wrap(self.length, path_distance);
        let after = self.samples.partition_point(|&(d, _)| d <= wrapped);

        // Before the first sample means the tail end of the previous lap
        let index = if after == 0 {
            self.samples.len() - 1
        } else {
            after - 1
        };
        self.samples[index].1
    }

    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }

    /// The look-ahead ceiling this profile was built with
    pub fn max_ahead_distance(&self) -> f64 {
        self.max_ahead_distance
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for LookAheadProfile {
    /// An empty profile; lookups return the caller's default
    fn default() -> Self {
        LookAheadProfile {
            samples: Vec::new(),
            length: 0.0,
            max_ahead_distance: LookAheadConfig::default().max_ahead_distance,
        }
    }
}

/// Scan forward from `from` until the path leaves its heading line or the
/// look-ahead ceiling is reached
fn scan_ahead<Q: PathQuery + ?Sized>(path: &Q, from: &PathPoint, config: &LookAheadConfig) -> f64 {
    let length = path.length();
    let step = config.scan_step;
    let max = config.max_ahead_distance;

    let mut j: u64 = 1;
    loop {
        // Multiplying from the counter keeps rounding from drifting past `max`
        let ahead = j as f64 * step;
        if ahead > max {
            return max;
        }

        let distance = from.path_distance + ahead;
        let delta = circular::forward_delta(length, from.path_distance, distance);
        if delta >= max {
            return max;
        }

        if let Some(target) = path.point_at_distance(distance) {
            if leaves_heading_line(from, &target, config.max_ahead_path_offset) {
                return delta.min(max);
            }
        }

        j += 1;
    }
}

/// Whether `target` is further than `threshold` from the heading line of
/// `from`'s segment
fn leaves_heading_line(from: &PathPoint, target: &PathPoint, threshold: f64) -> bool {
    // `from` has zero offset, so it lies on the segment's line
    let offset = target.position - from.position;
    let projected = from.position + from.direction * from.direction.dot(&offset);
    (target.position - projected).norm() > threshold
}
