//! Scalar interpolation helpers.

/// Hermite smoothstep.
///
/// Returns 0 for `x <= edge0`, 1 for `x >= edge1`, and `t * t * (3 - 2 * t)`
/// with `t = (x - edge0) / (edge1 - edge0)` in between. The lower edge is
/// tested first, so degenerate edges (`edge1 <= edge0`) give a hard step and
/// never divide by zero.
///
/// ```rust
/// use llf_ops::interp::smoothstep;
///
/// assert_eq!(smoothstep(0.0, 0.0, 1.0), 0.0);
/// assert_eq!(smoothstep(1.0, 0.0, 1.0), 1.0);
/// assert_eq!(smoothstep(0.5, 0.0, 1.0), 0.5);
/// assert_eq!(smoothstep(0.0, 0.0, 0.0), 0.0);
/// assert_eq!(smoothstep(1.0, 0.0, -1.0), 1.0);
/// ```
#[inline]
pub fn smoothstep(x: f32, edge0: f32, edge1: f32) -> f32 {
    if x <= edge0 {
        0.0
    } else if x >= edge1 {
        1.0
    } else {
        let t = (x - edge0) / (edge1 - edge0);
        t * t * (3.0 - 2.0 * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_smoothstep_monotonic() {
        let mut prev = 0.0;
        for i in 0..=20 {
            let v = smoothstep(i as f32 * 0.25, 1.0, 4.0);
            assert!(v >= prev);
            prev = v;
        }
        assert_relative_eq!(prev, 1.0);
    }

    #[test]
    fn test_smoothstep_quarter() {
        // t = 0.25 -> 0.0625 * 2.5
        assert_relative_eq!(smoothstep(1.5, 1.0, 3.0), 0.15625);
    }
}
