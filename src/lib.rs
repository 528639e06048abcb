//! layerphys: layered 2D physics core (SAT + height bands, MTV resolution, friction)

pub mod math;
pub mod types;
pub mod shape;
pub mod body;
pub mod api;
pub mod narrowphase;
pub mod simulator;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::body::Body;
pub use crate::math::{CheckNan, Vector2, Vector3};
pub use crate::shape::Shape;
pub use crate::narrowphase::Narrowphase;
pub use crate::simulator::PhysicsSimulator;
