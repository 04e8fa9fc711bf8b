//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Clamp a value into the symmetric band `[-limit, +limit]`.
///
/// `limit` is expected to be non-negative.
pub fn clamp_sym<T>(value: T, limit: T) -> T
where
    T: Float,
{
    if value > limit {
        limit
    } else if value < -limit {
        -limit
    } else {
        value
    }
}

/// Push a nonzero value whose magnitude is below `threshold` out to `±threshold`.
///
/// Zero is left untouched.
pub fn snap_from_zero<T>(value: T, threshold: T) -> T
where
    T: Float,
{
    if value != T::zero() && value.abs() < threshold {
        threshold * value.signum()
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0, 10.0), (0.0, 1.0), 5.0), 0.5);
        assert_eq!(lin_map((15.0, 255.0), (1.65, 0.65), 15.0), 1.65);
        assert!((lin_map((15.0, 255.0), (1.65, 0.65), 255.0) - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_sym() {
        assert_eq!(clamp_sym(60.0, 50.0), 50.0);
        assert_eq!(clamp_sym(-60.0, 50.0), -50.0);
        assert_eq!(clamp_sym(4.307, 50.0), 4.307);
    }

    #[test]
    fn test_snap_from_zero() {
        assert_eq!(snap_from_zero(0.0, 27.0), 0.0);
        assert_eq!(snap_from_zero(3.0, 27.0), 27.0);
        assert_eq!(snap_from_zero(-0.2, 1.0), -1.0);
        assert_eq!(snap_from_zero(4.307, 1.0), 4.307);
    }
}
