use fibroblasts::{
    simulation::spawn_cells, Bounds, CellParams, Fibroblast, Lls, Phase, Simulation,
    SimulationSettings, TargetField, VertexIndex, VertexIndexKind,
};
use rand::{rngs::SmallRng, SeedableRng};

fn cell_params() -> CellParams {
    CellParams {
        radius: 6.0,
        speed: 1.0,
        move_ms: 300,
        rest_ms: 500,
        leg_len: 12.0,
        leg_wiggle: 4.0,
        leg_speed: 1.0,
    }
}

fn square_lls_at_100() -> TargetField {
    let mut rng = SmallRng::seed_from_u64(0);
    TargetField::from_targets(vec![Lls::new([100.0, 100.0], 10, 0, 4, &mut rng)])
}

#[test]
fn single_square_lls_scenario() {
    let cells = vec![Fibroblast::new([0.0, 100.0], cell_params(), 0)];
    let mut sim = Simulation::from_parts(square_lls_at_100(), cells, VertexIndexKind::Scan, false);
    assert_eq!(sim.cells()[0].phase(), Phase::Moving);

    for now in 1..=90 {
        sim.tick(now);
    }
    let cell = &sim.cells()[0];
    assert_eq!(cell.phase(), Phase::Moving);
    assert!((cell.position()[0] - 90.0).abs() < 1e-3, "x = {}", cell.position()[0]);
    assert!((cell.position()[1] - 100.0).abs() < 1e-3);

    // The cell reached its vertex at t=90 and sits there until the timer runs out.
    for now in 91..300 {
        sim.tick(now);
    }
    sim.tick(300);
    assert!(sim.cells()[0].is_resting());
    let frozen = sim.cells()[0].clone();

    for now in 301..800 {
        sim.tick(now);
        assert_eq!(sim.cells()[0].position(), frozen.position());
        assert_eq!(sim.cells()[0].leg_phase(), frozen.leg_phase());
        assert!(sim.cells()[0].is_resting());
    }

    sim.tick(800);
    assert_eq!(sim.cells()[0].phase(), Phase::Moving);
    assert_eq!(sim.cells()[0].phase_ends_at(), 1_100);
}

#[test]
fn zero_lls_leaves_every_cell_at_spawn() {
    let settings = SimulationSettings {
        lls_count: 0,
        cell_count: 100,
        ..SimulationSettings::default()
    };
    let mut rng = SmallRng::seed_from_u64(17);
    let mut sim = Simulation::new(&settings, &mut rng, 0);
    assert!(sim.field().is_empty());
    assert!(sim.index().nearest_vertex([10.0, 10.0]).is_none());

    let spawn: Vec<[f32; 2]> = sim.cells().iter().map(Fibroblast::position).collect();
    for now in (0..10_000).step_by(5) {
        sim.tick(now);
    }
    let after: Vec<[f32; 2]> = sim.cells().iter().map(Fibroblast::position).collect();
    assert_eq!(spawn, after);
    assert!(sim.census().mean_vertex_distance.is_none());
}

#[test]
fn serial_and_parallel_ticks_agree() {
    let base = SimulationSettings {
        cell_count: 300,
        ..SimulationSettings::default()
    };
    let mut serial = Simulation::new(&base, &mut SmallRng::seed_from_u64(4), 0);
    let mut parallel = Simulation::new(
        &SimulationSettings {
            parallel_update: true,
            ..base.clone()
        },
        &mut SmallRng::seed_from_u64(4),
        0,
    );
    assert_eq!(serial.cells(), parallel.cells());

    for now in (0..4_000).step_by(5) {
        serial.tick(now);
        parallel.tick(now);
    }
    assert_eq!(serial.cells(), parallel.cells());
}

#[test]
fn cell_order_does_not_change_outcomes() {
    let settings = SimulationSettings {
        lls_count: 10,
        cell_count: 50,
        ..SimulationSettings::default()
    };
    let mut rng = SmallRng::seed_from_u64(8);
    let field = TargetField::generate(
        settings.lls_count,
        settings.bounds(),
        &settings.lls_params(),
        &mut rng,
    );
    let cells = spawn_cells(50, settings.bounds(), cell_params(), &mut rng, 0);
    let mut reversed_cells = cells.clone();
    reversed_cells.reverse();

    let mut forward = Simulation::from_parts(field.clone(), cells, VertexIndexKind::Scan, false);
    let mut backward = Simulation::from_parts(field, reversed_cells, VertexIndexKind::Scan, false);
    for now in (0..2_000).step_by(5) {
        forward.tick(now);
        backward.tick(now);
    }

    let mut expected = forward.cells().to_vec();
    expected.reverse();
    assert_eq!(expected, backward.cells());
}

#[test]
fn cells_settle_near_lls_vertices() {
    let settings = SimulationSettings {
        cell_count: 200,
        rng_seed: Some(3),
        ..SimulationSettings::default()
    };
    let mut sim = Simulation::new(&settings, &mut SmallRng::seed_from_u64(3), 0);
    let before = sim.census().mean_vertex_distance.expect("field placed");

    for now in (0..60_000).step_by(5) {
        sim.tick(now);
    }
    let after = sim.census().mean_vertex_distance.expect("field placed");
    assert!(after < before, "{after} !< {before}");
    // Overshoot keeps cells within one step of their vertex.
    for cell in sim.cells() {
        let nearest = sim.index().nearest_vertex(cell.position()).expect("vertex");
        assert!(nearest.distance_sq.sqrt() <= 1.0 + 1e-3);
    }
}

#[test]
fn generated_default_field_respects_spacing() {
    let settings = SimulationSettings::default();
    let mut rng = SmallRng::seed_from_u64(1234);
    let params = settings.lls_params();
    let field = TargetField::generate(30, Bounds::new(1000, 600), &params, &mut rng);
    assert!(field.len() <= 30);
    for lls in field.targets() {
        assert_eq!(lls.vertices().len(), 15);
    }
    for (i, a) in field.targets().iter().enumerate() {
        for b in &field.targets()[i + 1..] {
            let dx = a.center()[0] - b.center()[0];
            let dy = a.center()[1] - b.center()[1];
            let min = (a.max_radius() + b.max_radius() + params.margin) as f32;
            assert!(dx.hypot(dy) >= min - 1e-3);
        }
    }
}
