//! Tick-level behaviour of the simulator: gating, resolution, friction and
//! the force queue, driven only through the public API.

use layerphys::*;

fn crate_at(x: f64, y: f64, z: f64) -> Body {
    Body::new(Shape::new(Vector3::new(x, y, z), 10.0, 10.0, 10.0))
}

#[test]
fn height_bands_that_do_not_intersect_never_push() {
    let mut sim = PhysicsSimulator::with_defaults();
    let low = sim.spawn(crate_at(0.0, 0.0, 5.0)); // [0, 10]
    let high = sim.spawn(crate_at(5.0, 0.0, 25.0)); // [20, 30]
    for _ in 0..5 {
        sim.update().unwrap();
        sim.integrate(1.0);
    }
    assert_eq!(sim.body(low).unwrap().position(), Vector3::new(0.0, 0.0, 5.0));
    assert_eq!(sim.body(high).unwrap().position(), Vector3::new(5.0, 0.0, 25.0));
    assert!(sim.body(low).unwrap().collisions().is_empty());
    assert_eq!(sim.stats().band_overlaps, 0);
    assert_eq!(sim.stats().broad_phase_hits, 1);
}

#[test]
fn overlapping_bands_resolve_laterally() {
    let mut sim = PhysicsSimulator::with_defaults();
    let a = sim.spawn(crate_at(0.0, 0.0, 5.0));
    let b = sim.spawn(crate_at(0.0, 6.0, 9.0));
    sim.update().unwrap();
    let pa = sim.body(a).unwrap().position();
    let pb = sim.body(b).unwrap().position();
    // 4 units of overlap along y, full MTV to each body
    assert!((pa.y - -4.0).abs() < 1e-9);
    assert!((pb.y - 10.0).abs() < 1e-9);
    assert_eq!(pa.z, 5.0);
    assert_eq!(pb.z, 9.0);
}

#[test]
fn static_body_never_moves() {
    let mut sim = PhysicsSimulator::with_defaults();
    let wall = sim.spawn(crate_at(0.0, 0.0, 0.0).into_static());
    let pusher = sim.spawn(crate_at(-12.0, 0.0, 0.0).with_friction(0.1));
    for _ in 0..20 {
        sim.add_force(Force::new(wall, Vector3::new(3.0, -2.0, 1.0))).unwrap();
        sim.add_force(Force::new(pusher, Vector3::new(1.0, 0.0, 0.0))).unwrap();
        sim.update().unwrap();
        assert_eq!(sim.body(wall).unwrap().velocity, Vector3::ZERO);
        sim.integrate(1.0);
        assert_eq!(sim.body(wall).unwrap().position(), Vector3::ZERO);
    }
    // The pusher is held on its side of the wall.
    assert!(sim.body(pusher).unwrap().position().x <= -10.0 + 1.0 + 1e-9);
}

#[test]
fn friction_decays_monotonically_without_reversing() {
    let mut sim = PhysicsSimulator::with_defaults();
    let id = sim.spawn(
        crate_at(0.0, 0.0, 0.0)
            .with_friction(0.1)
            .with_velocity(Vector3::new(5.0, -2.0, 0.0)),
    );
    let mut last_speed = 5.0f64.hypot(2.0);
    for _ in 0..100 {
        sim.update().unwrap();
        let v = sim.body(id).unwrap().velocity;
        let speed = v.truncate().length();
        assert!(speed <= last_speed + 1e-12);
        assert!(v.x >= 0.0);
        assert!(v.y <= 0.0);
        last_speed = speed;
        sim.integrate(1.0);
    }
    assert_eq!(sim.body(id).unwrap().velocity, Vector3::ZERO);
}

#[test]
fn friction_scales_with_mass_and_gravity() {
    let mut sim = PhysicsSimulator::new(SimulatorConfig { gravity: 2.0, ..Default::default() });
    let id = sim.spawn(
        crate_at(0.0, 0.0, 0.0)
            .with_friction(0.25)
            .with_mass(2.0)
            .with_velocity(Vector3::new(10.0, 0.0, 0.0)),
    );
    sim.update().unwrap();
    // 0.25 * 2 * 2 = 1 per tick
    assert!((sim.body(id).unwrap().velocity.x - 9.0).abs() < 1e-9);
    sim.step(0.5).unwrap();
    assert!((sim.body(id).unwrap().velocity.x - 8.5).abs() < 1e-9);
}

#[test]
fn force_queue_drains_and_free_body_coasts() {
    let mut sim = PhysicsSimulator::with_defaults();
    let id = sim.spawn(crate_at(0.0, 0.0, 0.0));
    sim.add_force(Force::new(id, Vector3::new(2.0, 1.0, 0.0))).unwrap();
    assert_eq!(sim.force_count(), 1);
    sim.update().unwrap();
    assert_eq!(sim.force_count(), 0);
    assert_eq!(sim.stats().forces_applied, 1);

    let v = sim.body(id).unwrap().velocity;
    sim.integrate(1.0);
    sim.update().unwrap();
    assert_eq!(sim.force_count(), 0);
    assert_eq!(sim.body(id).unwrap().velocity, v);
    sim.integrate(1.0);
    assert_eq!(sim.body(id).unwrap().position(), Vector3::new(4.0, 2.0, 0.0));
}

#[test]
fn removed_body_drops_queued_force() {
    let mut sim = PhysicsSimulator::with_defaults();
    let id = sim.spawn(crate_at(0.0, 0.0, 0.0));
    sim.add_force(Force::new(id, Vector3::X)).unwrap();
    sim.remove_body(id).unwrap();
    sim.update().unwrap();
    assert_eq!(sim.body(id).unwrap().velocity, Vector3::ZERO);
    assert_eq!(sim.stats().forces_dropped, 1);
    assert!(matches!(
        sim.add_force(Force::new(id, Vector3::X)),
        Err(PhysicsError::BodyNotAttached(_))
    ));
}

#[test]
fn degenerate_geometry_never_produces_nan() {
    let mut sim = PhysicsSimulator::with_defaults();
    let flat = sim.spawn(Body::new(Shape::new(Vector3::ZERO, 0.0, 0.0, 0.0)).with_friction(0.5));
    let other = sim.spawn(crate_at(0.0, 0.0, 0.0));
    sim.add_force(Force::new(flat, Vector3::new(f64::NAN, 1.0, 0.0))).unwrap();
    for _ in 0..3 {
        sim.update().unwrap();
        sim.integrate(1.0);
    }
    for id in [flat, other] {
        let b = sim.body(id).unwrap();
        assert!(!b.position().is_nan());
        assert!(!b.velocity.is_nan());
    }
}

#[test]
fn crate_lands_on_floor_and_stays_put() {
    let mut sim = PhysicsSimulator::with_defaults();
    let floor = sim.spawn(
        Body::new(Shape::new(Vector3::new(0.0, 0.0, -5.0), 100.0, 100.0, 10.0)).into_static(),
    );
    let c = sim.spawn(crate_at(3.0, 3.0, 6.0).with_velocity(Vector3::new(0.0, 0.0, -1.0)));
    for _ in 0..4 {
        sim.update().unwrap();
        sim.integrate(1.0);
    }
    let body = sim.body(c).unwrap();
    assert_eq!(body.position().z, 5.0);
    assert_eq!(body.velocity.z, 0.0);
    assert!(body.is_colliding_with(floor));
    assert_eq!(body.position().x, 3.0);
}

#[test]
fn movement_forces_from_acceleration() {
    let mut sim = PhysicsSimulator::with_defaults();
    let id = sim.spawn(crate_at(0.0, 0.0, 0.0).with_acceleration(1.5).with_max_velocity(3.0));
    for _ in 0..4 {
        let push = sim.body(id).unwrap().acceleration_vector(Vector2::new(1.0, 0.0));
        sim.add_force(Force::new(id, push)).unwrap();
        sim.update().unwrap();
    }
    assert!((sim.body(id).unwrap().velocity.x - 3.0).abs() < 1e-9);
}

#[test]
fn gravity_and_damping_are_tunable() {
    let mut sim = PhysicsSimulator::with_defaults();
    sim.set_gravity(9.81);
    sim.set_energy_decrease(0.2);
    assert_eq!(sim.gravity(), 9.81);
    assert_eq!(sim.energy_decrease(), 0.2);
    assert_eq!(sim.cfg.gravity, 9.81);
}
