use hydrosim::*;

fn unit_box() -> SolidEntity {
    let mut solid = SolidEntity::from_mesh(
        "box",
        TriangleMesh::cuboid(Vec3::splat(0.5), 1),
        MaterialId(0),
        1.0,
    );
    solid.set_arbitrary_physical_properties(
        1.0,
        inertia_box(Vec3::splat(0.5), 1.0),
        Transform::IDENTITY,
    );
    solid
}

/// A 1 m box released 1 cm above a frictionless floor.
fn box_above_floor() -> SimulationManager {
    let mut world = RigidWorld::new();
    world.add_plane(StaticPlane::floor(0.0, None));

    let mut context = SimulationContext::new(world);
    context.materials_mut().add(Material::new("box", 1000.0, 0.0));
    context.add_solid(unit_box(), Transform::from_position(Vec3::new(0.0, 0.51, 0.0)));
    SimulationManager::new(context)
}

struct StuckJoint;

impl Joint for StuckJoint {
    fn apply_damping(&mut self, _engine: &mut dyn DynamicsEngine) {}

    fn velocity(&self, _engine: &dyn DynamicsEngine) -> f32 {
        0.0
    }

    fn solve_position_ic(&mut self, _engine: &mut dyn DynamicsEngine, _tolerance: f32) -> bool {
        false
    }
}

#[test]
fn box_settles_onto_the_floor() {
    let mut manager = box_above_floor();
    manager.start().expect("initial conditions should settle");

    assert_eq!(manager.mode(), SimulationMode::Running);
    let stats = manager.context().stats();
    let iterations = stats.lock().ic_iterations;
    assert!((100..=500).contains(&iterations), "{iterations} iterations");
    assert_eq!(stats.lock().mode, SimulationMode::Running);

    let handle = manager.context().solids()[0].handle().unwrap();
    let pose = manager.context().engine().world_transform(handle).unwrap();
    assert!(pose.position.y > 0.49 && pose.position.y < 0.5, "{pose:?}");
    let speed = manager.context().engine().linear_velocity(handle).unwrap();
    assert!(speed.length() < 1e-4);
}

#[test]
fn running_out_of_iterations_fails_the_start() {
    let mut manager = box_above_floor();
    manager.context().settings().lock().ic.max_iterations = 50;

    let err = manager.start().unwrap_err();
    assert!(
        matches!(err, SimulationError::IcNotConverged { iterations: 50, .. }),
        "{err:?}"
    );
    assert_eq!(manager.mode(), SimulationMode::Failed);
    assert_eq!(manager.context().stats().lock().mode, SimulationMode::Failed);
    assert_eq!(manager.step(), Err(SimulationError::NotReady));
}

#[test]
fn unsolved_joints_keep_settling_going() {
    let mut manager = box_above_floor();
    manager.context().settings().lock().ic.max_iterations = 400;
    manager.add_joint(StuckJoint);

    assert!(matches!(
        manager.start(),
        Err(SimulationError::IcNotConverged { iterations: 400, .. })
    ));
}

#[test]
fn wall_clock_limit_stops_settling() {
    let mut manager = box_above_floor();
    manager.context().settings().lock().ic.max_time = 0.0;
    manager.add_joint(StuckJoint);

    let err = manager.start().unwrap_err();
    assert!(matches!(err, SimulationError::IcTimedOut { .. }), "{err:?}");
}

#[test]
fn weightless_settling_ends_after_warmup() {
    let mut manager = box_above_floor();
    manager.context().settings().lock().ic.gravity = false;

    let report = manager.solve_initial_conditions().unwrap();
    assert_eq!(report.iterations, 100);
}

#[test]
fn disabled_settling_starts_immediately() {
    let mut manager = box_above_floor();
    manager.context().settings().lock().ic.enabled = false;

    manager.start().unwrap();
    assert_eq!(manager.mode(), SimulationMode::Running);
    assert_eq!(manager.context().stats().lock().ic_iterations, 0);

    let handle = manager.context().solids()[0].handle().unwrap();
    let pose = manager.context().engine().world_transform(handle).unwrap();
    assert_eq!(pose.position.y, 0.51);
}
