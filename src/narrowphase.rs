use crate::api::NarrowphaseApi;
use crate::math::{CheckNan, Vector2};
use crate::shape::Shape;

/// Height-band overlaps thinner than this count as touching. Covers the
/// rounding left behind by snapping one body onto another.
pub const LAYER_TOLERANCE: f64 = 1e-9;

/// Separating-axis tests over rectangle footprints and height bands.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn overlap(p1: Vector2, p2: Vector2) -> f64 {
        // (x, y) = (min, max)
        if p1.y < p2.x || p2.y < p1.x {
            return -1.0;
        }
        (p1.y.min(p2.y) - p1.x.max(p2.x)).check_nan()
    }

    fn band_overlap(a: &Shape, b: &Shape) -> Option<(f64, f64)> {
        let bottom = a.bottom_height().max(b.bottom_height());
        let top = a.top_height().min(b.top_height());
        // Resting on top of each other is not a shared layer.
        if top - bottom > LAYER_TOLERANCE { Some((bottom, top)) } else { None }
    }

    fn sat(a: &Shape, b: &Shape) -> Option<Vector2> {
        let [a0, a1] = a.axes();
        let [b0, b1] = b.axes();

        let mut best: Option<(Vector2, f64)> = None;
        for axis in [a0, a1, b0, b1] {
            if axis == Vector2::ZERO {
                continue;
            }
            let o = Self::overlap(a.project(axis), b.project(axis));
            if o <= 0.0 {
                // Separating axis found
                return None;
            }
            match best {
                Some((_, min)) if o >= min => {}
                _ => best = Some((axis, o)),
            }
        }
        best.map(|(axis, o)| (axis * o).check_nan())
    }

    fn layered_sat(a: &Shape, b: &Shape) -> Option<Vector2> {
        let (bottom, top) = Self::band_overlap(a, b)?;
        let low = Self::sat(&a.layered_shape(bottom), &b.layered_shape(bottom));
        let high = Self::sat(&a.layered_shape(top), &b.layered_shape(top));
        match (low, high) {
            (Some(l), Some(h)) => {
                if h.length_squared() < l.length_squared() { Some(h) } else { Some(l) }
            }
            (l, h) => l.or(h),
        }
    }
}
