use hydrosim::*;

fn main() {
    let mut context = SimulationContext::new(RigidWorld::new());
    context.settings().lock().ic.enabled = false;
    context.add_fluid(Ocean::new(0.0, FluidProperties::seawater()));

    let mut hull = SolidEntity::from_mesh(
        "pontoon",
        TriangleMesh::cuboid(Vec3::new(1.0, 0.25, 0.5), 4),
        MaterialId(0),
        400.0,
    );
    hull.fit_proxy(ProxyKind::Ellipsoid, 1025.0);
    let handle = context.add_solid(
        hull,
        Transform::from_position_rotation(Vec3::new(0.0, 0.5, 0.0), Quat::from_rotation_x(0.3)),
    );

    let mut manager = SimulationManager::new(context);
    if let Err(err) = manager.start() {
        eprintln!("failed to start: {err}");
        return;
    }

    for second in 1..=10 {
        for _ in 0..1000 {
            if let Err(err) = manager.step() {
                eprintln!("step failed: {err}");
                return;
            }
        }
        let Ok(pose) = manager.context().geometry_pose(handle) else {
            return;
        };
        let buoyancy = manager
            .context()
            .solid(handle)
            .map(|solid| solid.fluid_forces().buoyancy.force.y)
            .unwrap_or_default();
        println!(
            "t = {second:>2} s  height {:+.3} m  roll {:+.3} rad  buoyancy {:.1} N",
            pose.position.y,
            pose.rotation.to_euler(glam::EulerRot::XYZ).0,
            buoyancy
        );
    }
}
