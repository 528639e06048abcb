use glam::{DVec2, DVec3};

/// 2D value vector used for footprint positions, axes and projections.
pub type Vector2 = DVec2;
/// 3D value vector; `z` is the synthetic height axis used by layered collision.
pub type Vector3 = DVec3;

/// Zero-fallback for degenerate arithmetic.
///
/// Every NaN component is replaced by `0.0`. The simulator runs this on the
/// results of vector math that can divide by zero (normalizing, projecting
/// onto a degenerate axis) so a bad shape degrades to "no push" instead of
/// poisoning positions.
pub trait CheckNan: Sized {
    fn check_nan(self) -> Self;
}

#[inline]
fn zero_if_nan(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}

impl CheckNan for DVec2 {
    #[inline]
    fn check_nan(self) -> Self {
        DVec2::new(zero_if_nan(self.x), zero_if_nan(self.y))
    }
}

impl CheckNan for DVec3 {
    #[inline]
    fn check_nan(self) -> Self {
        DVec3::new(zero_if_nan(self.x), zero_if_nan(self.y), zero_if_nan(self.z))
    }
}

impl CheckNan for f64 {
    #[inline]
    fn check_nan(self) -> Self {
        zero_if_nan(self)
    }
}

/// Unit vector in the direction of `v`, or zero for zero-length/non-finite input.
#[inline]
pub fn normalized(v: Vector2) -> Vector2 {
    v.normalize_or_zero().check_nan()
}

/// Rotate `p` about `origin` by `radians` (counter-clockwise in y-up space).
#[inline]
pub fn rotate_about(p: Vector2, origin: Vector2, radians: f64) -> Vector2 {
    if radians == 0.0 {
        return p;
    }
    (origin + Vector2::from_angle(radians).rotate(p - origin)).check_nan()
}

/// The footprint (x, y) part of a layered vector.
#[inline]
pub fn planar(v: Vector3) -> Vector2 {
    v.truncate()
}

/// Replace the footprint part of `v`, keeping its height.
#[inline]
pub fn with_planar(v: Vector3, p: Vector2) -> Vector3 {
    p.extend(v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_nan_zeroes_components() {
        let v = Vector3::new(f64::NAN, 2.0, f64::NAN).check_nan();
        assert_eq!(v, Vector3::new(0.0, 2.0, 0.0));
        assert_eq!(f64::NAN.check_nan(), 0.0);
    }

    #[test]
    fn test_normalize_zero_length_is_zero() {
        let n = normalized(Vector2::ZERO);
        assert_eq!(n, Vector2::ZERO);
        assert!(!n.x.is_nan() && !n.y.is_nan());
        let n = normalized(Vector2::new(f64::NAN, 1.0));
        assert!(!n.x.is_nan() && !n.y.is_nan());
    }

    #[test]
    fn test_normalize_unit_length() {
        let n = normalized(Vector2::new(3.0, 4.0));
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!((n.x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_about_quarter_turn() {
        let p = rotate_about(Vector2::new(2.0, 1.0), Vector2::new(1.0, 1.0), std::f64::consts::FRAC_PI_2);
        assert!((p.x - 1.0).abs() < 1e-9);
        assert!((p.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_planar_helpers() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(planar(v), Vector2::new(1.0, 2.0));
        assert_eq!(with_planar(v, Vector2::new(5.0, 6.0)), Vector3::new(5.0, 6.0, 3.0));
    }
}
