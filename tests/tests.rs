use mdcell::simulation::forces::{ForceTerm, NeighbourView, PairFault};
use mdcell::{
    ExecutionStrategy, ForceModel, LennardJones, NVec2, Parameters, Particle, PairFaultKind, RoundReport, Scenario,
    ScenarioConfig, SimulationError, UnitCell, WallForce,
};

/// Parameters with walls and gravity switched off
pub fn free_space_params() -> Parameters {
    Parameters {
        dt: 1e-5,
        box_width: 1.0,
        wall_stiffness: 0.0,
        gravity: 0.0,
        particle_radius: 0.04,
        particle_mass: 1.0,
        epsilon: 1.0,
        min_separation: 1e-6,
    }
}

/// Reference parameters with a coarser step so tests move visibly
pub fn test_params() -> Parameters {
    Parameters {
        dt: 1e-4,
        ..Parameters::reference()
    }
}

/// Two particles at rest, separated by `dist` along x around the box center
pub fn two_particles(dist: f64) -> Vec<Particle> {
    vec![
        Particle::new(NVec2::new(0.5 - dist / 2.0, 0.5), NVec2::zeros(), 0.04, 1.0),
        Particle::new(NVec2::new(0.5 + dist / 2.0, 0.5), NVec2::zeros(), 0.04, 1.0),
    ]
}

/// Run `rounds` rounds and return the final snapshot
pub fn run(cell: &mut UnitCell, rounds: usize) -> Vec<mdcell::ParticleSnapshot> {
    for _ in 0..rounds {
        cell.advance_one_round().unwrap();
    }
    cell.snapshot()
}

// ==================================================================================
// Force tests
// ==================================================================================

#[test]
fn wall_force_at_minus_five() {
    let wall = WallForce {
        box_width: 100.0,
        stiffness: 1.0,
    };
    let f = wall.force(&NVec2::new(-5.0, 50.0));
    assert_eq!(f.x, 5.0);
    assert_eq!(f.y, 0.0);
}

#[test]
fn wall_then_gravity_acceleration() {
    let p = Parameters {
        box_width: 100.0,
        wall_stiffness: 1.0,
        gravity: 10.0,
        ..free_space_params()
    };
    let forces = ForceModel::standard(&p);
    let positions = [NVec2::new(-5.0, 50.0)];
    let masses = [1.0];
    let view = NeighbourView::new(&positions, &masses);

    let a = forces.acceleration_on(0, &view, &mut Vec::new());
    assert_eq!(a.x, 5.0);
    assert_eq!(a.y, -10.0);
}

#[test]
fn reaction_is_exact_negative() {
    let lj = LennardJones {
        sigma: 0.04,
        epsilon: 1.0,
        min_separation: 1e-6,
    };
    let xi = NVec2::new(0.412, 0.733);
    let xj = NVec2::new(0.401, 0.781);
    let (fij, _) = lj.pair_force(&xi, &xj);
    let (fji, _) = lj.pair_force(&xj, &xi);
    assert_eq!(fij, -fji);
}

#[test]
fn contact_repels_and_two_radii_attract() {
    let p = free_space_params();
    let lj = LennardJones {
        sigma: p.particle_radius,
        epsilon: p.epsilon,
        min_separation: p.min_separation,
    };

    // i on the left of j
    let xi = NVec2::new(0.5, 0.5);

    let (at_contact, _) = lj.pair_force(&xi, &NVec2::new(0.5 + p.particle_radius, 0.5));
    assert!(lj.f_over_distance(p.particle_radius) > 0.0);
    assert!(at_contact.x < 0.0, "contact force should push i away from j, got {at_contact:?}");

    let (at_two, _) = lj.pair_force(&xi, &NVec2::new(0.5 + 2.0 * p.particle_radius, 0.5));
    assert!(lj.f_over_distance(2.0 * p.particle_radius) < 0.0);
    assert!(at_two.x > 0.0, "force at two radii should pull i toward j, got {at_two:?}");

    // repulsion at contact dominates attraction at two radii
    assert!(at_contact.norm() > at_two.norm());
}

#[test]
fn net_pair_force_is_zero() {
    let p = free_space_params();
    let forces = ForceModel::standard(&p);
    let positions = [NVec2::new(0.40, 0.50), NVec2::new(0.45, 0.52), NVec2::new(0.47, 0.46)];
    let masses = [1.0, 1.0, 1.0];
    let view = NeighbourView::new(&positions, &masses);

    let mut out = vec![NVec2::zeros(); 3];
    forces.accumulate_accels(&view, &mut out, &mut Vec::new());

    let net: NVec2 = out.iter().sum();
    assert!(net.norm() < 1e-9 * out[0].norm().max(1.0), "net force not zero: {net:?}");
}

// ==================================================================================
// Strategy tests
// ==================================================================================

#[test]
fn sequential_and_concurrent_are_bitwise_identical() {
    let p = test_params();
    let mut seq = UnitCell::create(12, p.clone(), ExecutionStrategy::Sequential, 2024).unwrap();
    let mut conc = UnitCell::create(12, p, ExecutionStrategy::Concurrent, 2024).unwrap();

    assert_eq!(seq.snapshot(), conc.snapshot());
    for round in 0..200 {
        let a = seq.advance_one_round().unwrap();
        let b = conc.advance_one_round().unwrap();
        assert_eq!(a, b, "round report {round}");
    }
    assert_eq!(seq.snapshot(), conc.snapshot());
    assert_eq!(seq.elapsed_time(), conc.elapsed_time());
}

#[test]
fn concurrent_reports_pair_faults_like_sequential() {
    let p = free_space_params();
    let stacked = vec![
        Particle::new(NVec2::new(0.5, 0.5), NVec2::zeros(), 0.04, 1.0),
        Particle::new(NVec2::new(0.5, 0.5), NVec2::zeros(), 0.04, 1.0),
        Particle::new(NVec2::new(0.9, 0.9), NVec2::zeros(), 0.04, 1.0),
    ];
    let mut seq = UnitCell::from_particles(stacked.clone(), p.clone(), ExecutionStrategy::Sequential).unwrap();
    let mut conc = UnitCell::from_particles(stacked, p, ExecutionStrategy::Concurrent).unwrap();

    let a = seq.advance_one_round().unwrap();
    let b = conc.advance_one_round().unwrap();
    assert_eq!(a, b);
    assert_eq!(
        a.pair_faults(),
        &[PairFault {
            i: 0,
            j: 1,
            kind: PairFaultKind::Coincident
        }]
    );

    // the round still committed and nothing went non-finite
    assert!(seq.snapshot().iter().all(|s| s.position.x.is_finite() && s.acceleration.y.is_finite()));
}

// ==================================================================================
// Conservation tests
// ==================================================================================

#[test]
fn two_body_momentum_is_conserved() {
    let p = free_space_params();
    for strategy in [ExecutionStrategy::Sequential, ExecutionStrategy::Concurrent] {
        let mut cell = UnitCell::from_particles(two_particles(0.06), p.clone(), strategy).unwrap();
        let p0 = cell.total_momentum();

        for _ in 0..2000 {
            cell.advance_one_round().unwrap();
            let drift = (cell.total_momentum() - p0).norm();
            assert!(drift < 1e-9, "{strategy:?}: momentum drifted by {drift}");
        }

        // they actually interacted
        let s = cell.snapshot();
        assert!(s[0].velocity.norm() > 0.0);
    }
}

#[test]
fn symmetric_pair_stays_mirrored() {
    let mut cell = UnitCell::from_particles(two_particles(0.05), free_space_params(), ExecutionStrategy::Sequential).unwrap();
    let s = run(&mut cell, 500);

    // mirror images about x = 0.5, no vertical motion
    assert!((s[0].position.x + s[1].position.x - 1.0).abs() < 1e-12);
    assert_eq!(s[0].position.y, 0.5);
    assert_eq!(s[1].position.y, 0.5);
    assert!((s[0].velocity.x + s[1].velocity.x).abs() < 1e-9);
}

// ==================================================================================
// Pause tests
// ==================================================================================

#[test]
fn paused_rounds_change_nothing() {
    for strategy in [ExecutionStrategy::Sequential, ExecutionStrategy::Concurrent] {
        let mut cell = UnitCell::create(6, test_params(), strategy, 11).unwrap();
        run(&mut cell, 5);

        let t = cell.elapsed_time();
        let before = cell.snapshot();

        cell.set_paused(true);
        for _ in 0..10 {
            assert_eq!(cell.advance_one_round().unwrap(), RoundReport::Paused);
        }
        assert_eq!(cell.elapsed_time(), t);
        assert_eq!(cell.snapshot(), before);
        assert_eq!(cell.rounds(), 5);
    }
}

#[test]
fn pausing_does_not_change_the_trajectory() {
    let p = test_params();
    let mut reference = UnitCell::create(8, p.clone(), ExecutionStrategy::Concurrent, 5).unwrap();
    let mut interrupted = UnitCell::create(8, p, ExecutionStrategy::Concurrent, 5).unwrap();

    run(&mut reference, 20);

    let handle = interrupted.pause_handle();
    for round in 0..20 {
        if round % 3 == 0 {
            handle.set_paused(true);
            interrupted.advance_one_round().unwrap();
            interrupted.advance_one_round().unwrap();
            handle.set_paused(false);
        }
        interrupted.advance_one_round().unwrap();
    }

    assert_eq!(reference.snapshot(), interrupted.snapshot());
    assert_eq!(reference.elapsed_time(), interrupted.elapsed_time());
}

// ==================================================================================
// Failure tests
// ==================================================================================

/// Panics while evaluating one chosen particle
struct Faulty {
    victim: usize,
}

impl ForceTerm for Faulty {
    fn force_on(&self, i: usize, _view: &NeighbourView<'_>, _force: &mut NVec2, _faults: &mut Vec<PairFault>) {
        if i == self.victim {
            panic!("worker for particle {i} lost");
        }
    }
}

#[test]
fn dead_worker_fails_the_round() {
    let p = test_params();
    let particles = mdcell::RandomPlacement::in_box(p.box_width).place(4, &p, 1);
    let forces = ForceModel::standard(&p).with(Faulty { victim: 2 });
    let mut cell = UnitCell::with_forces(particles, p, ExecutionStrategy::Concurrent, forces).unwrap();
    let before = cell.snapshot();

    let err = cell.advance_one_round().unwrap_err();
    assert!(matches!(err, SimulationError::ConcurrencyFault(_)), "got {err:?}");

    // no partial commit, and the pool stays failed
    assert_eq!(cell.snapshot(), before);
    assert_eq!(cell.rounds(), 0);
    assert!(matches!(cell.advance_one_round(), Err(SimulationError::ConcurrencyFault(_))));
}

/// Produces NaN for one particle
struct Poison;

impl ForceTerm for Poison {
    fn force_on(&self, i: usize, _view: &NeighbourView<'_>, force: &mut NVec2, _faults: &mut Vec<PairFault>) {
        if i == 1 {
            force.x = f64::NAN;
        }
    }
}

#[test]
fn nan_round_is_refused() {
    for strategy in [ExecutionStrategy::Sequential, ExecutionStrategy::Concurrent] {
        let p = free_space_params();
        let forces = ForceModel::standard(&p).with(Poison);
        let mut cell = UnitCell::with_forces(two_particles(0.1), p, strategy, forces).unwrap();
        let before = cell.snapshot();

        let err = cell.advance_one_round().unwrap_err();
        assert!(
            matches!(err, SimulationError::DegenerateState { particle: 1, round: 1 }),
            "{strategy:?}: got {err:?}"
        );
        assert_eq!(cell.snapshot(), before);
        assert_eq!(cell.elapsed_time(), 0.0);
    }
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut p = test_params();
    p.particle_mass = 0.0;
    assert!(matches!(
        UnitCell::create(3, p, ExecutionStrategy::Sequential, 0),
        Err(SimulationError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        UnitCell::create(0, test_params(), ExecutionStrategy::Concurrent, 0),
        Err(SimulationError::InvalidConfiguration(_))
    ));
}

// ==================================================================================
// Scenario tests
// ==================================================================================

const TWO_BODY: &str = r#"
engine:
  strategy: "concurrent"
  rounds: 50
parameters:
  dt: 1.0e-5
  box_width: 1.0
  wall_stiffness: 0.0
  gravity: 0.0
  particle_radius: 0.04
  particle_mass: 1.0
  epsilon: 1.0
particles:
  explicit:
    - x: [0.45, 0.5]
    - x: [0.55, 0.5]
"#;

#[test]
fn scenario_runs_to_round_limit() {
    let cfg = ScenarioConfig::from_yaml_str(TWO_BODY).unwrap();
    let mut scenario = Scenario::build_scenario(cfg).unwrap();
    assert_eq!(scenario.cell.len(), 2);
    assert_eq!(scenario.parameters.min_separation, Parameters::default_min_separation(0.04));

    let committed = scenario.run().unwrap();
    assert_eq!(committed, 50);
    assert_eq!(scenario.cell.rounds(), 50);
    assert!((scenario.cell.elapsed_time() - 50.0 * 1e-5).abs() < 1e-15);
}

#[test]
fn shipped_two_body_scenario_runs() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join("two_body.yaml");
    let cfg = ScenarioConfig::from_yaml_file(&path).unwrap();
    let mut scenario = Scenario::build_scenario(cfg).unwrap();
    let p0 = scenario.cell.total_momentum();

    let committed = scenario.run().unwrap();
    assert!(committed > 0);
    assert!(scenario.cell.elapsed_time() >= 0.01 - 1e-12);
    assert!((scenario.cell.total_momentum() - p0).norm() < 1e-9);
}

#[test]
fn scenario_with_bad_parameters_is_rejected() {
    let cfg = ScenarioConfig::from_yaml_str(&TWO_BODY.replace("dt: 1.0e-5", "dt: -1.0")).unwrap();
    assert!(matches!(
        Scenario::build_scenario(cfg),
        Err(SimulationError::InvalidConfiguration(_))
    ));
}
