//! Modular arithmetic on bearings measured in degrees.
//!
//! Bearings live on [0, 360). Sweeps are measured counter-clockwise
//! (increasing angle) and are always non-negative.

pub const FULL_TURN: f64 = 360.0;

/// Wrap any finite angle into [0, 360)
#[inline]
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(FULL_TURN);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= FULL_TURN {
        0.0
    } else {
        wrapped
    }
}

/// Counter-clockwise sweep from `from` to `to`, in [0, 360)
#[inline]
pub fn sweep(from: f64, to: f64) -> f64 {
    wrap_degrees(to - from)
}

/// Shortest circular distance between two bearings, in [0, 180]
#[inline]
pub fn angular_gap(a: f64, b: f64) -> f64 {
    let forward = sweep(a, b);
    forward.min(FULL_TURN - forward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_wrap_basic() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(-720.0), 0.0);
    }

    #[test]
    fn test_wrap_tiny_negative_stays_in_range() {
        let wrapped = wrap_degrees(-1e-15);
        assert!((0.0..FULL_TURN).contains(&wrapped));
    }

    #[test]
    fn test_wrap_is_periodic() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let a: f64 = rng.gen_range(-5_000.0..5_000.0);
            let lhs = wrap_degrees(a + FULL_TURN);
            let rhs = wrap_degrees(a);
            assert!(angular_gap(lhs, rhs) < 1e-9, "{} vs {}", lhs, rhs);
        }
    }

    #[test]
    fn test_sweep_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10_000 {
            let a: f64 = rng.gen_range(-1_000.0..1_000.0);
            let b: f64 = rng.gen_range(-1_000.0..1_000.0);
            let s = sweep(a, b);
            assert!((0.0..FULL_TURN).contains(&s));
            let g = angular_gap(a, b);
            assert!((0.0..=180.0).contains(&g));
        }
    }

    #[test]
    fn test_sweep_across_zero() {
        assert_eq!(sweep(350.0, 10.0), 20.0);
        assert_eq!(sweep(10.0, 350.0), 340.0);
        assert_eq!(angular_gap(350.0, 10.0), 20.0);
    }
}
