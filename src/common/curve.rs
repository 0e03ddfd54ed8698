//! Piecewise-linear mapping tables
//!
//! Used wherever the driver maps one scalar onto another through a tunable
//! shape: recommended speed from look-ahead, steering correction from path
//! offset.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WaypointError};

/// A piecewise-linear curve through `(input, output)` keys.
///
/// Inputs are strictly increasing. Evaluation outside the key range holds
/// the first or last output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct Curve {
    keys: Vec<(f64, f64)>,
}

impl Curve {
    /// Create a curve from explicit keys
    pub fn new(keys: Vec<(f64, f64)>) -> Result<Self> {
        if keys.is_empty() {
            return Err(WaypointError::InvalidCurve(
                "Curve needs at least one key".to_string(),
            ));
        }

        if let Some((input, output)) = keys
            .iter()
            .find(|(input, output)| !input.is_finite() || !output.is_finite())
        {
            return Err(WaypointError::InvalidCurve(format!(
                "Non-finite key ({}, {})",
                input, output
            )));
        }

        if let Some(pair) = keys.windows(2).find(|pair| pair[1].0 <= pair[0].0) {
            return Err(WaypointError::InvalidCurve(format!(
                "Key inputs must be strictly increasing: {} then {}",
                pair[0].0, pair[1].0
            )));
        }

        Ok(Curve { keys })
    }

    /// Curve from keys known to be valid at compile time
    pub(crate) fn from_known_keys(keys: &[(f64, f64)]) -> Self {
        debug_assert!(!keys.is_empty());
        debug_assert!(keys.windows(2).all(|pair| pair[0].0 < pair[1].0));
        Curve {
            keys: keys.to_vec(),
        }
    }

    /// A straight line through two keys
    pub fn linear(from: (f64, f64), to: (f64, f64)) -> Result<Self> {
        Self::new(vec![from, to])
    }

    /// Evaluate the curve at `input`. NaN holds the first output.
    pub fn evaluate(&self, input: f64) -> f64 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];

        if !(input > first.0) {
            return first.1;
        }
        if input >= last.0 {
            return last.1;
        }

        // First key strictly above the input; the clamps above keep it in 1..len
        let upper = self.keys.partition_point(|&(x, _)| x <= input);
        let (x0, y0) = self.keys[upper - 1];
        let (x1, y1) = self.keys[upper];

        let t = (input - x0) / (x1 - x0);
        y0 + (y1 - y0) * t
    }

    /// The keys this curve was built from
    pub fn keys(&self) -> &[(f64, f64)] {
        &self.keys
    }
}

impl TryFrom<Vec<(f64, f64)>> for Curve {
    type Error = WaypointError;

    fn try_from(keys: Vec<(f64, f64)>) -> Result<Self> {
        Curve::new(keys)
    }
}

impl From<Curve> for Vec<(f64, f64)> {
    fn from(curve: Curve) -> Self {
        curve.keys
    }
}
