//! Distance arithmetic on a closed loop

/// Wrap `distance` into `[0, total)`.
///
/// # Panics
///
/// Panics if `total` is not strictly positive.
pub fn wrap(total: f64, distance: f64) -> f64 {
    assert!(total > 0.0, "Loop length must be positive, got {}", total);

    let wrapped = distance - total * (distance / total).floor();
    // Rounding can land exactly on `total` for tiny negative inputs
    if wrapped >= total || wrapped < 0.0 {
        0.0
    } else {
        wrapped
    }
}

/// Distance travelled forward (increasing path-distance) from `from` to `to`.
///
/// Equal positions are 0 apart, never a full lap.
pub fn forward_delta(total: f64, from: f64, to: f64) -> f64 {
    let from = wrap(total, from);
    let to = wrap(total, to);

    if to >= from {
        to - from
    } else {
        to + total - from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap_stays_in_range() {
        let total = 40.0;
        for d in [-123.5, -40.0, -0.25, 0.0, 3.0, 39.999, 40.0, 81.5, 1e6] {
            let w = wrap(total, d);
            assert!((0.0..total).contains(&w), "wrap({}) = {}", d, w);
        }
    }

    #[test]
    fn test_wrap_is_periodic() {
        let total = 12.5;
        for d in [-7.0, 0.0, 1.0, 6.25, 11.0, 30.0] {
            assert_relative_eq!(wrap(total, d + total), wrap(total, d), epsilon = 1e-9);
        }
        assert_relative_eq!(wrap(10.0, -1.0), 9.0);
        assert_relative_eq!(wrap(10.0, 23.0), 3.0);
    }

    #[test]
    fn test_wrap_tiny_negative_folds_to_zero() {
        assert_eq!(wrap(40.0, -1e-18), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_wrap_rejects_empty_loop() {
        wrap(0.0, 1.0);
    }

    #[test]
    fn test_forward_delta() {
        assert_relative_eq!(forward_delta(40.0, 5.0, 15.0), 10.0);
        assert_relative_eq!(forward_delta(40.0, 35.0, 5.0), 10.0);
        assert_relative_eq!(forward_delta(40.0, 35.0, 45.0), 10.0);
        assert_relative_eq!(forward_delta(40.0, 15.0, 5.0), 30.0);
    }

    #[test]
    fn test_forward_delta_non_negative_and_zero_on_self() {
        let total = 17.0;
        for from in [-3.0, 0.0, 4.5, 16.9, 40.0] {
            assert_eq!(forward_delta(total, from, from), 0.0);
            for to in [-20.0, 0.0, 2.0, 16.0, 33.3] {
                assert!(forward_delta(total, from, to) >= 0.0);
            }
        }
    }
}
