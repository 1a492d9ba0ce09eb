use approx::assert_relative_eq;
use hydrosim::*;

fn body(material: MaterialId, point_velocity: Vec3) -> ContactBody {
    ContactBody {
        material,
        point_velocity,
        angular_velocity: Vec3::ZERO,
    }
}

fn unit_cube(material: MaterialId, speed: f32) -> RigidBodyDesc {
    let mut contact_points = Vec::new();
    for x in [-0.5, 0.5] {
        for y in [-0.5, 0.5] {
            for z in [-0.5, 0.5] {
                contact_points.push(Vec3::new(x, y, z));
            }
        }
    }
    RigidBodyDesc {
        transform: Transform::from_position(Vec3::new(0.0, 0.4995, 0.0)),
        velocity: Velocity::new(Vec3::new(speed, 0.0, 0.0), Vec3::ZERO),
        mass: 1.0,
        inertia: Vec3::splat(1.0 / 6.0),
        material,
        contact_points,
        ..RigidBodyDesc::default()
    }
}

fn slide(pair: FrictionPair) -> f32 {
    let mut materials = MaterialTable::new();
    let floor = materials.add(Material::new("floor", 1000.0, 0.0));
    let sled = materials.add(Material::new("sled", 1000.0, 0.0));
    materials.set_friction(floor, sled, pair);

    let mut world = RigidWorld::new();
    world.set_material_table(&materials);
    world.add_plane(StaticPlane::floor(0.0, Some(floor)));
    let handle = world.add_body(unit_cube(sled, 1.0));

    for _ in 0..800 {
        world.clear_forces();
        world.apply_central_force(handle, Vec3::new(0.0, -9.81, 0.0));
        world.step(0.001);
    }
    world
        .world_transform(handle)
        .map(|transform| transform.position.x)
        .unwrap_or(f32::NAN)
}

#[test]
fn friction_pairs_are_symmetric() {
    let mut materials = MaterialTable::new();
    let steel = materials.add(Material::steel());
    let rubber = materials.add(Material::rubber());
    materials.set_friction(rubber, steel, FrictionPair::new(0.9, 0.7));

    let model = ContactFrictionModel::default();
    let slow = body(steel, Vec3::ZERO);
    let fast = body(rubber, Vec3::new(0.2, 0.0, 0.0));
    let ab = model.evaluate(&materials, Some(&slow), Some(&fast), Vec3::Y);
    let ba = model.evaluate(&materials, Some(&fast), Some(&slow), Vec3::Y);

    assert_relative_eq!(ab.combined_friction, ba.combined_friction);
    assert_relative_eq!(ab.restitution, ba.restitution);
    assert_eq!(ab.slip.map(|s| -s), ba.slip);
}

#[test]
fn friction_decays_monotonically_with_slip() {
    let model = ContactFrictionModel::default();
    let mut previous = model.blend(0.9, 0.3, 0.0);
    assert_relative_eq!(previous, 0.9);
    for speed in [0.01, 0.05, 0.1, 0.5, 1.0, 10.0] {
        let value = model.blend(0.9, 0.3, speed);
        assert!(value < previous && value >= 0.3, "slip {speed}: {value}");
        previous = value;
    }
}

#[test]
fn unknown_pairs_fall_back_to_the_default() {
    let mut materials = MaterialTable::new();
    let a = materials.add(Material::neutral());
    let b = materials.add(Material::aluminium());
    let model = ContactFrictionModel::default();
    let coefficients = model.evaluate(
        &materials,
        Some(&body(a, Vec3::ZERO)),
        Some(&body(b, Vec3::ZERO)),
        Vec3::Y,
    );
    let fallback = materials.friction(a, b);
    assert_eq!(coefficients.static_friction, fallback.static_friction);
    assert_eq!(coefficients.dynamic_friction, fallback.dynamic_friction);
}

#[test]
fn rougher_floors_stop_sliders_sooner() {
    let rough = slide(FrictionPair::new(0.6, 0.5));
    let smooth = slide(FrictionPair::new(0.25, 0.2));
    let frictionless = slide(FrictionPair::frictionless());

    assert!(rough > 0.0);
    assert!(rough < smooth, "rough {rough}, smooth {smooth}");
    assert!(smooth < frictionless, "smooth {smooth}, frictionless {frictionless}");
    // v² / (2 μ g) for the rough floor
    assert_relative_eq!(rough, 1.0 / (2.0 * 0.5 * 9.81), max_relative = 0.3);
}
