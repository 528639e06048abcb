use serde::{Deserialize, Serialize};

use crate::math::{CheckNan, Vector2, Vector3, normalized, planar, rotate_about};

/// Rectangular volume: a (optionally rotated) footprint rectangle plus a
/// vertical extent on the synthetic height axis.
///
/// `width` spans x, `height` spans on-screen y and `depth` spans z, the
/// height axis used to decide whether two bodies share a layer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Centroid.
    pub position: Vector3,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// Radians, applied to the footprint about its centre.
    pub rotation: f64,
}

impl Default for Shape {
    fn default() -> Self {
        Self { position: Vector3::ZERO, width: 0.0, height: 0.0, depth: 0.0, rotation: 0.0 }
    }
}

impl Shape {
    /// Negative dimensions are clamped to zero.
    pub fn new(position: Vector3, width: f64, height: f64, depth: f64) -> Self {
        Self {
            position,
            width: width.max(0.0),
            height: height.max(0.0),
            depth: depth.max(0.0),
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, radians: f64) -> Self {
        self.rotation = radians;
        self
    }

    /// Resize in place (content loaders size shapes from sprite dimensions).
    pub fn set_size(&mut self, width: f64, height: f64, depth: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.depth = depth.max(0.0);
    }

    /// Rotation pivot; the footprint centre.
    #[inline]
    pub fn origin(&self) -> Vector2 {
        planar(self.position)
    }

    /// Corners in clockwise order (y-down): top-left, top-right, bottom-right,
    /// bottom-left, each rotated about [`Shape::origin`].
    pub fn vertices(&self) -> [Vector2; 4] {
        let o = self.origin();
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        [
            Vector2::new(o.x - hw, o.y - hh),
            Vector2::new(o.x + hw, o.y - hh),
            Vector2::new(o.x + hw, o.y + hh),
            Vector2::new(o.x - hw, o.y + hh),
        ]
        .map(|v| rotate_about(v, o, self.rotation))
    }

    /// The two unique edge normals, normalized. The remaining two edges are
    /// anti-parallel to these and add nothing to SAT.
    ///
    /// A zero-width or zero-height footprint yields zero axes.
    pub fn axes(&self) -> [Vector2; 2] {
        let v = self.vertices();
        [normalized((v[1] - v[0]).perp()), normalized((v[2] - v[1]).perp())]
    }

    /// `(min, max)` of the vertices projected onto `axis`, packed as a
    /// [`Vector2`]. `axis` must already be normalized.
    pub fn project(&self, axis: Vector2) -> Vector2 {
        let v = self.vertices();
        let mut min = v[0].dot(axis);
        let mut max = min;
        for p in &v[1..] {
            let d = p.dot(axis);
            if d < min {
                min = d;
            }
            if d > max {
                max = d;
            }
        }
        Vector2::new(min, max).check_nan()
    }

    /// Cross-section of this shape at height `z`.
    ///
    /// Footprints do not vary with height, so every slice is the full
    /// rectangle.
    pub fn layered_shape(&self, _z: f64) -> Shape {
        *self
    }

    #[inline]
    pub fn top_height(&self) -> f64 {
        self.position.z + self.depth * 0.5
    }

    #[inline]
    pub fn bottom_height(&self) -> f64 {
        self.position.z - self.depth * 0.5
    }

    /// Larger footprint side; the broad-phase radius.
    #[inline]
    pub fn extent(&self) -> f64 {
        self.width.max(self.height)
    }
}
