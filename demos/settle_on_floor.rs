use hydrosim::*;

fn main() {
    let mut world = RigidWorld::new();
    let mut materials = MaterialTable::new();
    let concrete = materials.add(Material::new("concrete", 2400.0, 0.1));
    let aluminium = materials.add(Material::aluminium());
    materials.set_friction(concrete, aluminium, FrictionPair::new(0.7, 0.5));
    world.add_plane(StaticPlane::floor(-10.0, Some(concrete)));

    let mut context = SimulationContext::new(world);
    *context.materials_mut() = materials;
    context.add_fluid(Ocean::new(0.0, FluidProperties::seawater()));

    // a bottom lander, denser than seawater, released just above the seabed
    let mut lander = SolidEntity::from_mesh(
        "lander",
        TriangleMesh::cuboid(Vec3::new(0.6, 0.3, 0.6), 2),
        aluminium,
        1800.0,
    );
    lander.fit_proxy(ProxyKind::Cylinder, 1025.0);
    let handle = context.add_solid(lander, Transform::from_position(Vec3::new(0.0, -9.6, 0.0)));

    let mut manager = SimulationManager::new(context);
    match manager.start() {
        Ok(()) => {
            let stats = manager.context().stats();
            println!(
                "settled after {} iterations",
                stats.lock().ic_iterations
            );
        }
        Err(err) => {
            eprintln!("initial conditions failed: {err}");
            return;
        }
    }

    match manager.run_for(std::time::Duration::from_millis(500)) {
        Ok(ticks) => println!("ran {ticks} ticks"),
        Err(err) => eprintln!("run failed: {err}"),
    }
    if let Ok(pose) = manager.context().geometry_pose(handle) {
        println!("lander rests at {:?}", pose.position);
    }
}
