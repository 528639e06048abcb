use crate::body::Body;
use crate::math::Vector2;
use crate::shape::Shape;
use crate::types::*;

/// Public API contract for the layered physics simulator.
pub trait PhysicsSimulatorApi {
    /// Construct a new simulator with the given configuration.
    fn new(cfg: SimulatorConfig) -> Self
    where
        Self: Sized;

    // --- Body registry -----------------------------------------------------

    /// Store a body and return its handle. The body is not simulated until
    /// registered with [`PhysicsSimulatorApi::add_body`].
    fn insert_body(&mut self, body: Body) -> BodyId;

    /// Convenience: store and register in one call.
    fn spawn(&mut self, body: Body) -> BodyId;

    /// Drop a body entirely, deregistering it first. Its handle stays dead.
    fn despawn(&mut self, id: BodyId) -> Option<Body>;

    /// Register a stored body for simulation. Idempotent: returns `Ok(false)`
    /// if it was already registered.
    fn add_body(&mut self, id: BodyId) -> Result<bool, PhysicsError>;

    /// Deregister a body; it stays stored and can be re-added. Returns
    /// `Ok(false)` if it was not registered.
    fn remove_body(&mut self, id: BodyId) -> Result<bool, PhysicsError>;

    // --- Forces ------------------------------------------------------------

    /// Queue a force for the next tick.
    fn add_force(&mut self, force: Force) -> Result<(), PhysicsError>;

    /// Forces currently queued.
    fn force_count(&self) -> usize;

    // --- Stepping ----------------------------------------------------------

    /// Advance one tick with the configured step.
    fn update(&mut self) -> Result<(), PhysicsError>;

    /// Advance one tick of length `dt`.
    fn step(&mut self, dt: f64) -> Result<(), PhysicsError>;

    /// Run `Body::update(dt)` for every registered body.
    fn integrate(&mut self, dt: f64);

    // --- Tuning ------------------------------------------------------------

    fn gravity(&self) -> f64;
    fn set_gravity(&mut self, gravity: f64);
    fn energy_decrease(&self) -> f64;
    fn set_energy_decrease(&mut self, energy_decrease: f64);
}

/// Interval and separating-axis tests on [`Shape`]s.
pub trait NarrowphaseApi {
    /// Overlap length of two `(min, max)` intervals, `-1.0` if disjoint.
    fn overlap(p1: Vector2, p2: Vector2) -> f64;

    /// Intersection of the two shapes' height bands, if it has thickness.
    fn band_overlap(a: &Shape, b: &Shape) -> Option<(f64, f64)>;

    /// Footprint SAT; minimum translation vector along a candidate axis.
    fn sat(a: &Shape, b: &Shape) -> Option<Vector2>;

    /// SAT gated on height-band overlap, checked at the band's bottom and top.
    fn layered_sat(a: &Shape, b: &Shape) -> Option<Vector2>;
}
