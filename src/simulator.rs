use std::time::Instant;

use crate::api::{NarrowphaseApi, PhysicsSimulatorApi};
use crate::body::Body;
use crate::math::{CheckNan, Vector2, Vector3, normalized, planar, with_planar};
use crate::narrowphase::{LAYER_TOLERANCE, Narrowphase};
use crate::types::*;

/// Layered 2D simulator: owns the bodies, the force queue and the tuning
/// scalars, and advances everything one deterministic tick at a time.
pub struct PhysicsSimulator {
    pub cfg: SimulatorConfig,
    pub tick_counter: u64,

    // Body arena, indexed by `BodyId`; freed slots stay `None`
    entries: Vec<Option<Entry>>,
    // Registration order drives pair order
    active: Vec<BodyId>,

    // Forces for the next tick
    forces: Vec<Force>,

    last_stats: SimulatorStats,
    last_timing: Option<TickTiming>,
}

struct Entry {
    body: Body,
    registered: bool,
}

impl PhysicsSimulatorApi for PhysicsSimulator {
    fn new(cfg: SimulatorConfig) -> Self {
        Self {
            cfg,
            tick_counter: 0,
            entries: Vec::new(),
            active: Vec::new(),
            forces: Vec::new(),
            last_stats: SimulatorStats::default(),
            last_timing: None,
        }
    }

    fn insert_body(&mut self, body: Body) -> BodyId {
        let id = next_id(self.entries.len());
        self.entries.push(Some(Entry { body, registered: false }));
        id
    }

    fn spawn(&mut self, body: Body) -> BodyId {
        let id = self.insert_body(body);
        self.register(id);
        id
    }

    fn despawn(&mut self, id: BodyId) -> Option<Body> {
        let entry = self.entries.get_mut(id.0 as usize)?.take()?;
        if entry.registered {
            self.active.retain(|&a| a != id);
        }
        self.forget(id);
        log::debug!("despawned body {}", id.0);
        Some(entry.body)
    }

    fn add_body(&mut self, id: BodyId) -> Result<bool, PhysicsError> {
        let entry = self.entry(id).ok_or(PhysicsError::UnknownBody(id))?;
        if entry.registered {
            return Ok(false);
        }
        self.register(id);
        Ok(true)
    }

    fn remove_body(&mut self, id: BodyId) -> Result<bool, PhysicsError> {
        let entry = self.entry_mut(id).ok_or(PhysicsError::UnknownBody(id))?;
        if !entry.registered {
            return Ok(false);
        }
        entry.registered = false;
        entry.body.clear_collisions();
        self.active.retain(|&a| a != id);
        self.forget(id);
        log::debug!("removed body {} ({} registered)", id.0, self.active.len());
        Ok(true)
    }

    fn add_force(&mut self, force: Force) -> Result<(), PhysicsError> {
        let entry = self.entry(force.target).ok_or(PhysicsError::UnknownBody(force.target))?;
        if !entry.registered {
            log::warn!("force queued for detached body {}", force.target.0);
            return Err(PhysicsError::BodyNotAttached(force.target));
        }
        self.forces.push(Force { vector: force.vector.check_nan(), ..force });
        Ok(())
    }

    fn force_count(&self) -> usize {
        self.forces.len()
    }

    fn update(&mut self) -> Result<(), PhysicsError> {
        self.step(self.cfg.dt)
    }

    fn step(&mut self, dt: f64) -> Result<(), PhysicsError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::InvalidTimestep(dt));
        }
        let t_all = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
        let mut stats = SimulatorStats { bodies: self.active.len(), ..Default::default() };

        for &id in &self.active {
            if let Some(Some(e)) = self.entries.get_mut(id.0 as usize) {
                e.body.clear_collisions();
            }
        }

        // Pairs see positions already corrected by earlier pairs this tick.
        let ids = self.active.clone();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                stats.pairs += 1;
                self.resolve_pair(ids[i], ids[j], &mut stats);
            }
        }
        let pairs_ms = t_all.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0);

        let t_forces = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
        self.queue_friction(dt);
        self.apply_forces(&mut stats);
        self.forces.clear();

        for &id in &self.active {
            let Some(Some(e)) = self.entries.get_mut(id.0 as usize) else { continue };
            let body = &mut e.body;
            if body.is_static {
                body.velocity = Vector3::ZERO;
            } else if body.max_velocity > 0.0 {
                let p = planar(body.velocity).clamp_length_max(body.max_velocity);
                body.velocity = with_planar(body.velocity, p).check_nan();
            }
        }
        let forces_ms = t_forces.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0);

        self.tick_counter = self.tick_counter.wrapping_add(1);
        self.last_stats = stats;
        self.last_timing = t_all.map(|t| TickTiming {
            update_ms: t.elapsed().as_secs_f64() * 1000.0,
            pairs_ms,
            forces_ms,
        });
        log::trace!(
            "tick {}: {} bodies, {} broad hits, {} lateral, {} ground, {} forces",
            self.tick_counter,
            stats.bodies,
            stats.broad_phase_hits,
            stats.lateral_collisions,
            stats.ground_contacts,
            stats.forces_applied
        );
        Ok(())
    }

    fn integrate(&mut self, dt: f64) {
        for &id in &self.active {
            if let Some(Some(e)) = self.entries.get_mut(id.0 as usize) {
                e.body.update(dt);
            }
        }
    }

    fn gravity(&self) -> f64 {
        self.cfg.gravity
    }

    fn set_gravity(&mut self, gravity: f64) {
        self.cfg.gravity = gravity;
    }

    fn energy_decrease(&self) -> f64 {
        self.cfg.energy_decrease
    }

    fn set_energy_decrease(&mut self, energy_decrease: f64) {
        self.cfg.energy_decrease = energy_decrease;
    }
}

impl PhysicsSimulator {
    pub fn with_defaults() -> Self {
        Self::new(SimulatorConfig::default())
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.entry(id).map(|e| &e.body)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.entry_mut(id).map(|e| &mut e.body)
    }

    /// Registered body by registration index.
    pub fn body_at(&self, index: usize) -> Result<&Body, PhysicsError> {
        let len = self.active.len();
        let id = *self.active.get(index).ok_or(PhysicsError::IndexOutOfRange { index, len })?;
        self.body(id).ok_or(PhysicsError::UnknownBody(id))
    }

    pub fn is_registered(&self, id: BodyId) -> bool {
        self.entry(id).is_some_and(|e| e.registered)
    }

    /// Registered bodies in registration order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.active.iter().filter_map(|&id| self.body(id).map(|b| (id, b)))
    }

    pub fn body_count(&self) -> usize {
        self.active.len()
    }

    /// Counters for the last completed tick.
    pub fn stats(&self) -> SimulatorStats {
        self.last_stats
    }

    /// Timing breakdown for the last tick, when `enable_timing` is set.
    pub fn timing(&self) -> Option<TickTiming> {
        self.last_timing
    }

    fn entry(&self, id: BodyId) -> Option<&Entry> {
        self.entries.get(id.0 as usize)?.as_ref()
    }

    fn entry_mut(&mut self, id: BodyId) -> Option<&mut Entry> {
        self.entries.get_mut(id.0 as usize)?.as_mut()
    }

    fn register(&mut self, id: BodyId) {
        if let Some(e) = self.entry_mut(id) {
            e.registered = true;
            self.active.push(id);
            log::debug!("added body {} ({} registered)", id.0, self.active.len());
        }
    }

    /// Drop `id` from every other body's collision set.
    fn forget(&mut self, id: BodyId) {
        for e in self.entries.iter_mut().flatten() {
            e.body.remove_collision(id);
        }
    }

    fn link(&mut self, a: BodyId, b: BodyId) {
        if let Some(e) = self.entry_mut(a) {
            e.body.add_collision(b);
        }
        if let Some(e) = self.entry_mut(b) {
            e.body.add_collision(a);
        }
    }

    fn displace(&mut self, id: BodyId, offset: Vector2) {
        if let Some(e) = self.entry_mut(id) {
            let p = e.body.shape.position;
            e.body.shape.position = with_planar(p, planar(p) + offset).check_nan();
            e.body.velocity = Vector3::ZERO;
        }
    }

    fn resolve_pair(&mut self, a_id: BodyId, b_id: BodyId, stats: &mut SimulatorStats) {
        let (Some(a), Some(b)) = (self.body(a_id), self.body(b_id)) else { return };
        let (sa, sb) = (a.shape, b.shape);
        let (a_static, b_static) = (a.is_static, b.is_static);
        let immaterial = a.is_immaterial || b.is_immaterial;

        // Broad phase
        let dist = sa.origin().distance(sb.origin());
        if !(dist < sa.extent() + sb.extent()) {
            return;
        }
        stats.broad_phase_hits += 1;

        // Lateral push inside a shared height band
        if Narrowphase::band_overlap(&sa, &sb).is_some() {
            stats.band_overlaps += 1;
            if let Some(mtv) = Narrowphase::layered_sat(&sa, &sb) {
                stats.lateral_collisions += 1;
                self.link(a_id, b_id);
                if !immaterial {
                    // Point from b into a
                    let mtv = if mtv.dot(sa.origin() - sb.origin()) < 0.0 { -mtv } else { mtv };
                    if !a_static {
                        self.displace(a_id, mtv);
                    }
                    if !b_static {
                        self.displace(b_id, -mtv);
                    }
                }
            }
        }

        // Landing: one body resting within epsilon above the other
        let (Some(a), Some(b)) = (self.body(a_id), self.body(b_id)) else { return };
        let (sa, sb) = (a.shape, b.shape);
        for (upper, lower, su, sl, upper_static) in
            [(a_id, b_id, sa, sb, a_static), (b_id, a_id, sb, sa, b_static)]
        {
            let gap = su.bottom_height() - sl.top_height();
            if !(-LAYER_TOLERANCE..=self.cfg.ground_epsilon).contains(&gap) {
                continue;
            }
            if Narrowphase::sat(&su, &sl).is_none() {
                continue;
            }
            stats.ground_contacts += 1;
            self.link(upper, lower);
            if upper_static || immaterial {
                continue;
            }
            if let Some(e) = self.entry_mut(upper) {
                e.body.shape.position.z = sl.top_height() + su.depth * 0.5;
                if e.body.velocity.z < 0.0 {
                    e.body.velocity.z = 0.0;
                }
            }
        }
    }

    fn queue_friction(&mut self, dt: f64) {
        let gravity = self.cfg.gravity;
        for &id in &self.active {
            let Some(Some(e)) = self.entries.get(id.0 as usize) else { continue };
            let b = &e.body;
            if b.is_static || b.friction_coefficient == 0.0 {
                continue;
            }
            let dir = normalized(planar(b.velocity));
            if dir == Vector2::ZERO {
                continue;
            }
            let magnitude = b.friction_coefficient * b.mass * gravity * dt;
            let vector = (-dir * magnitude).extend(0.0).check_nan();
            self.forces.push(Force::friction(id, vector));
        }
    }

    fn apply_forces(&mut self, stats: &mut SimulatorStats) {
        let forces = std::mem::take(&mut self.forces);
        for f in &forces {
            let Some(Some(e)) = self.entries.get_mut(f.target.0 as usize) else {
                log::warn!("dropping force for dead body {}", f.target.0);
                stats.forces_dropped += 1;
                continue;
            };
            if !e.registered {
                log::warn!("dropping force for detached body {}", f.target.0);
                stats.forces_dropped += 1;
                continue;
            }
            let body = &mut e.body;
            if body.is_static {
                stats.forces_dropped += 1;
                continue;
            }
            let v = body.velocity;
            let next = v + f.vector;
            body.velocity = match f.kind {
                ForceKind::Impulse => next,
                ForceKind::Friction => {
                    Vector3::new(clamp_toward_zero(v.x, next.x), clamp_toward_zero(v.y, next.y), v.z)
                }
            }
            .check_nan();
            stats.forces_applied += 1;
        }
    }
}

/// Handle for the next arena slot.
///
/// # Panics
/// Once `u32::MAX` handles have been issued; ids are never reused.
fn next_id(len: usize) -> BodyId {
    match u32::try_from(len) {
        Ok(raw) => BodyId(raw),
        Err(_) => panic!("body arena exhausted after {len} handles"),
    }
}

/// Deceleration-only update: `after` may approach zero from `before`'s side
/// but never cross it or grow past `before`.
#[inline]
fn clamp_toward_zero(before: f64, after: f64) -> f64 {
    if before > 0.0 {
        after.clamp(0.0, before)
    } else if before < 0.0 {
        after.clamp(before, 0.0)
    } else {
        0.0
    }
}
