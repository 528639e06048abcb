use layerphys::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut sim = PhysicsSimulator::new(SimulatorConfig {
        gravity: 1.0,
        dt: 1.0,
        enable_timing: true,
        ..Default::default()
    });

    // Floor tile, a wall on the same layer, a crate dropping onto the floor
    // and a player walking into the wall.
    let floor = sim.spawn(
        Body::new(Shape::new(Vector3::new(0.0, 0.0, -8.0), 160.0, 160.0, 16.0)).into_static(),
    );
    let wall = sim.spawn(
        Body::new(Shape::new(Vector3::new(40.0, 0.0, 8.0), 16.0, 64.0, 16.0)).into_static(),
    );
    let falling = sim.spawn(
        Body::new(Shape::new(Vector3::new(-20.0, 10.0, 9.5), 16.0, 16.0, 16.0))
            .with_velocity(Vector3::new(0.0, 0.0, -1.0)),
    );
    let player = sim.spawn(
        Body::new(Shape::new(Vector3::new(0.0, 0.0, 8.0), 12.0, 12.0, 16.0))
            .with_friction(0.2)
            .with_acceleration(1.0)
            .with_max_velocity(4.0),
    );
    log::info!("floor={:?} wall={:?} crate={:?} player={:?}", floor, wall, falling, player);

    for tick in 0..30 {
        if let Some(p) = sim.body(player) {
            let push = p.acceleration_vector(Vector2::new(1.0, 0.0));
            if let Err(e) = sim.add_force(Force::new(player, push)) {
                log::error!("player input dropped: {e}");
            }
        }
        if let Err(e) = sim.update() {
            log::error!("tick {tick} failed: {e}");
            break;
        }
        sim.integrate(sim.cfg.dt);

        for (id, body) in sim.bodies() {
            if body.is_static || body.collisions().is_empty() {
                continue;
            }
            let p = body.position();
            println!(
                "tick {tick:2}: body {} at ({:.2},{:.2},{:.2}) touching {:?}",
                id.0,
                p.x,
                p.y,
                p.z,
                body.collisions()
            );
        }
    }

    let s = sim.stats();
    println!(
        "last tick: pairs={} broad={} bands={} lateral={} ground={} forces={}",
        s.pairs, s.broad_phase_hits, s.band_overlaps, s.lateral_collisions, s.ground_contacts, s.forces_applied
    );
    if let Some(t) = sim.timing() {
        println!("timing: update={:.3}ms pairs={:.3}ms forces={:.3}ms", t.update_ms, t.pairs_ms, t.forces_ms);
    }
}
