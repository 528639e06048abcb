use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::math::{CheckNan, Vector2, Vector3, normalized};
use crate::shape::Shape;
use crate::types::BodyId;

/// A simulated volume: a [`Shape`] plus mass, velocity and material flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub shape: Shape,
    pub friction_coefficient: f64,
    pub mass: f64,
    /// Magnitude of the movement impulse built by [`Body::acceleration_vector`].
    pub acceleration: f64,
    /// Cap on planar speed; `0.0` disables the cap.
    pub max_velocity: f64,
    pub velocity: Vector3,
    /// Never displaced, never given velocity.
    pub is_static: bool,
    /// Detected and reported, but never blocks or is blocked.
    pub is_immaterial: bool,
    /// Bodies touched during the last tick.
    #[serde(skip)]
    collisions: BTreeSet<BodyId>,
}

impl Default for Body {
    fn default() -> Self {
        Self::new(Shape::default())
    }
}

impl Body {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            friction_coefficient: 0.0,
            mass: 1.0,
            acceleration: 0.0,
            max_velocity: 0.0,
            velocity: Vector3::ZERO,
            is_static: false,
            is_immaterial: false,
            collisions: BTreeSet::new(),
        }
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_friction(mut self, coefficient: f64) -> Self {
        self.friction_coefficient = coefficient;
        self
    }

    pub fn with_acceleration(mut self, acceleration: f64) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self.velocity = Vector3::ZERO;
        self
    }

    pub fn into_immaterial(mut self) -> Self {
        self.is_immaterial = true;
        self
    }

    #[inline]
    pub fn position(&self) -> Vector3 {
        self.shape.position
    }

    #[inline]
    pub fn set_position(&mut self, position: Vector3) {
        self.shape.position = position.check_nan();
    }

    /// Integrate one step. Static bodies only shed any velocity they were given.
    pub fn update(&mut self, dt: f64) {
        if self.is_static {
            self.velocity = Vector3::ZERO;
            return;
        }
        self.shape.position = (self.shape.position + self.velocity * dt).check_nan();
    }

    /// Planar movement impulse toward `direction` with this body's
    /// acceleration. A zero direction gives a zero vector.
    pub fn acceleration_vector(&self, direction: Vector2) -> Vector3 {
        (normalized(direction) * self.acceleration).extend(0.0).check_nan()
    }

    pub fn collisions(&self) -> &BTreeSet<BodyId> {
        &self.collisions
    }

    pub fn add_collision(&mut self, other: BodyId) {
        self.collisions.insert(other);
    }

    pub fn remove_collision(&mut self, other: BodyId) {
        self.collisions.remove(&other);
    }

    pub fn clear_collisions(&mut self) {
        self.collisions.clear();
    }

    pub fn is_colliding_with(&self, other: BodyId) -> bool {
        self.collisions.contains(&other)
    }
}
