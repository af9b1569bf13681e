//! Angle helpers shared by the solver, the signal processor and mouse drag.
//!
//! Every angle the kernel stores lives in (-pi, pi].

use std::f32::consts::{PI, TAU};

/// Wraps `angle` into (-pi, pi]. Values already in range are returned
/// untouched, so the function is idempotent bit for bit. Non-finite input
/// yields `0.0` instead of poisoning later trigonometry.
pub fn normalize(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    if angle > -PI && angle <= PI {
        return angle;
    }

    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI || wrapped > PI {
        PI
    } else {
        wrapped
    }
}

/// Signed difference `to - from` along the shorter arc.
pub fn shortest_delta(from: f32, to: f32) -> f32 {
    normalize(to - from)
}

/// Moves `from` toward `to` by fraction `t` of the shortest arc.
pub fn lerp_angle_shortest(from: f32, to: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return normalize(from);
    }
    if t >= 1.0 {
        return normalize(to);
    }
    normalize(from + shortest_delta(from, to) * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_wraps_both_directions() {
        assert_abs_diff_eq!(normalize(PI + 0.5), -PI + 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(normalize(-PI - 0.5), PI - 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(normalize(7.0 * TAU + 1.0), 1.0, epsilon = 1e-4);
        assert_eq!(normalize(PI), PI);
        assert_eq!(normalize(-PI), PI);
    }

    #[test]
    fn test_normalize_non_finite_is_zero() {
        assert_eq!(normalize(f32::NAN), 0.0);
        assert_eq!(normalize(f32::INFINITY), 0.0);
        assert_eq!(normalize(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_shortest_delta_crosses_wrap() {
        let delta = shortest_delta(3.0, -3.0);
        assert_abs_diff_eq!(delta, TAU - 6.0, epsilon = 1e-5);
        assert!(delta > 0.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp_angle_shortest(1.0, 2.0, 0.0), 1.0);
        assert_eq!(lerp_angle_shortest(1.0, 2.0, 1.0), 2.0);
        assert_abs_diff_eq!(
            lerp_angle_shortest(1.0, 2.0 + TAU, 1.0),
            2.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_lerp_takes_short_way_through_pi() {
        // 3.0 -> -3.0 is 0.28 rad through +-pi, not 6 rad through zero.
        for step in 1..10 {
            let t = step as f32 / 10.0;
            let mid = lerp_angle_shortest(3.0, -3.0, t);
            assert!(mid.abs() > 2.9, "t={t} gave {mid}");
        }
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent_and_in_range(a in -1.0e4f32..1.0e4f32) {
            let once = normalize(a);
            prop_assert!(once > -PI && once <= PI);
            prop_assert_eq!(normalize(once), once);
        }

        #[test]
        fn lerp_stays_in_range(a in -10.0f32..10.0, b in -10.0f32..10.0, t in 0.0f32..1.0) {
            let v = lerp_angle_shortest(a, b, t);
            prop_assert!(v > -PI && v <= PI);
        }
    }
}
