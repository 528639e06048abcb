use serde::{Deserialize, Serialize};

use crate::math::Vector3;

/// Handle to a body stored in a [`crate::PhysicsSimulator`].
///
/// Handles are never reused: a despawned body's id stays dead.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// How a queued force is folded into velocity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ForceKind {
    /// Added verbatim: `velocity += vector`.
    #[default]
    Impulse,
    /// Decelerates only. Each planar component is clamped so it can reach
    /// zero but never cross it.
    Friction,
}

/// A velocity delta queued for one body, consumed by the next tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Force {
    pub target: BodyId,
    pub vector: Vector3,
    pub kind: ForceKind,
}

impl Force {
    /// Plain impulse.
    pub fn new(target: BodyId, vector: Vector3) -> Self {
        Self { target, vector, kind: ForceKind::Impulse }
    }

    pub fn friction(target: BodyId, vector: Vector3) -> Self {
        Self { target, vector, kind: ForceKind::Friction }
    }
}

/// Simulator-level tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Scales friction (`coefficient * mass * gravity`).
    pub gravity: f64,
    /// Damping factor for impact response. Exposed for tuning overlays;
    /// the tick does not read it.
    pub energy_decrease: f64,
    /// Step used by `update()`. Forces are velocity deltas per tick; friction
    /// and position integration scale with the step.
    pub dt: f64,
    /// Maximum gap between a body's bottom and another's top that still
    /// counts as landing on it.
    pub ground_epsilon: f64,
    /// Enable internal timing instrumentation.
    pub enable_timing: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            gravity: 1.0,
            energy_decrease: 0.5,
            dt: 1.0,
            ground_epsilon: 2.0,
            enable_timing: false,
        }
    }
}

impl SimulatorConfig {
    /// Parse a config from JSON. Missing fields fall back to [`Default`].
    pub fn from_json_str(s: &str) -> Result<Self, PhysicsError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Counters for the last completed tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulatorStats {
    pub bodies: usize,
    /// Unordered pairs considered (n*(n-1)/2).
    pub pairs: usize,
    /// Pairs surviving the distance filter.
    pub broad_phase_hits: usize,
    /// Pairs whose height bands intersect.
    pub band_overlaps: usize,
    /// Lateral SAT hits (including immaterial pairs, which are not pushed).
    pub lateral_collisions: usize,
    pub ground_contacts: usize,
    pub forces_applied: usize,
    /// Forces whose target was static, dead or deregistered.
    pub forces_dropped: usize,
}

/// Timing breakdown for the last tick (only filled when `enable_timing`).
#[derive(Copy, Clone, Debug, Default)]
pub struct TickTiming {
    pub update_ms: f64,
    pub pairs_ms: f64,
    pub forces_ms: f64,
}

/// Errors surfaced by the simulator's fallible operations.
#[derive(Debug)]
pub enum PhysicsError {
    /// The handle does not name a live body.
    UnknownBody(BodyId),
    /// The body exists but is not registered with the simulator.
    BodyNotAttached(BodyId),
    /// Step length must be finite and positive.
    InvalidTimestep(f64),
    IndexOutOfRange { index: usize, len: usize },
    /// Config deserialization failed.
    Config(serde_json::Error),
}

impl std::fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhysicsError::UnknownBody(id) => write!(f, "unknown body {}", id.0),
            PhysicsError::BodyNotAttached(id) => {
                write!(f, "body {} is not attached to the simulator", id.0)
            }
            PhysicsError::InvalidTimestep(dt) => write!(f, "invalid timestep: {dt}"),
            PhysicsError::IndexOutOfRange { index, len } => {
                write!(f, "body index {index} out of range (len {len})")
            }
            PhysicsError::Config(e) => write!(f, "config error: {e}"),
        }
    }
}

impl std::error::Error for PhysicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PhysicsError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PhysicsError {
    fn from(e: serde_json::Error) -> Self {
        PhysicsError::Config(e)
    }
}
