use approx::assert_relative_eq;
use hydrosim::*;

fn stretched_sphere(radii: Vec3) -> TriangleMesh {
    let sphere = TriangleMesh::uv_sphere(1.0, 12, 24);
    let vertices = sphere.vertices.iter().map(|v| *v * radii).collect();
    TriangleMesh::builder(vertices, sphere.indices).build()
}

#[test]
fn sphere_proxy_is_isotropic() {
    let mut solid = SolidEntity::from_mesh(
        "ball",
        TriangleMesh::uv_sphere(0.3, 16, 32),
        MaterialId(0),
        1000.0,
    );
    assert!(solid.fit_proxy(ProxyKind::Sphere, 1025.0));

    let added = solid.added_mass();
    let t = added.translational;
    assert_relative_eq!(t.x, t.y, max_relative = 1e-6);
    assert_relative_eq!(t.y, t.z, max_relative = 1e-6);
    let expected = 2.0 / 3.0 * std::f32::consts::PI * 1025.0 * 0.3_f32.powi(3);
    assert_relative_eq!(t.x, expected, max_relative = 1e-3);
    assert_eq!(added.rotational, Vec3::ZERO);
    assert_eq!(solid.proxy().drag_scale(), Vec3::ONE);
}

#[test]
fn cylinder_proxy_follows_the_long_axis() {
    let mut solid = SolidEntity::from_mesh(
        "torpedo",
        TriangleMesh::cuboid(Vec3::new(0.25, 0.25, 1.5), 1),
        MaterialId(0),
        1000.0,
    );
    assert!(solid.fit_proxy(ProxyKind::Cylinder, 1000.0));

    let HydrodynamicProxy::Cylinder { pose, height, .. } = *solid.proxy() else {
        panic!("expected a cylinder, got {:?}", solid.proxy());
    };
    let axis = solid.cg_frame().rotation * (pose.rotation * Vec3::Z);
    assert_relative_eq!(axis.z.abs(), 1.0, epsilon = 1e-4);
    assert_relative_eq!(height, 3.0, epsilon = 1e-4);

    // the axial direction resists least and has no added inertia
    let local_axis = (pose.rotation * Vec3::Z).abs();
    let axial = if local_axis.x > 0.9 {
        0
    } else if local_axis.y > 0.9 {
        1
    } else {
        2
    };
    let t = solid.added_mass().translational.to_array();
    let r = solid.added_mass().rotational.to_array();
    for i in 0..3 {
        if i != axial {
            assert!(t[axial] < t[i]);
            assert!(r[i] > 0.0);
        }
    }
    assert_eq!(r[axial], 0.0);
}

#[test]
fn ellipsoid_proxy_recovers_hull_shape() {
    let mut solid = SolidEntity::from_mesh(
        "hull",
        stretched_sphere(Vec3::new(2.0, 0.5, 0.8)),
        MaterialId(0),
        1000.0,
    );
    assert!(solid.fit_proxy(ProxyKind::Ellipsoid, 1000.0));

    let HydrodynamicProxy::Ellipsoid { radii, pose } = *solid.proxy() else {
        panic!("expected an ellipsoid, got {:?}", solid.proxy());
    };
    // radii are expressed along the proxy axes; compare the sorted set
    let mut fitted = radii.to_array();
    fitted.sort_by(f32::total_cmp);
    assert_relative_eq!(fitted[0], 0.5, max_relative = 1e-3);
    assert_relative_eq!(fitted[1], 0.8, max_relative = 1e-3);
    assert_relative_eq!(fitted[2], 2.0, max_relative = 1e-3);
    assert!(pose.position.length() < 1e-3);

    let scale = solid.proxy().drag_scale();
    assert_relative_eq!(scale.max_element(), 1.0);
    assert_relative_eq!(scale.min_element(), 0.25, max_relative = 1e-3);
}

#[test]
fn unfit_proxy_means_no_added_mass() {
    let mut solid = SolidEntity::from_mesh(
        "tetra",
        TriangleMesh::builder(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .build(),
        MaterialId(0),
        1000.0,
    );
    assert!(!solid.fit_proxy(ProxyKind::Ellipsoid, 1000.0));
    assert!(solid.proxy().is_none());
    assert_eq!(solid.added_mass().diagonal(), [0.0; 6]);
}

#[test]
fn lamb_factor_decreases_with_slenderness() {
    let mut previous = hydrosim::hydrodynamics::lamb_k_factor(1.0, 1.0);
    for ratio in [1.5, 2.0, 4.0, 8.0] {
        let k = hydrosim::hydrodynamics::lamb_k_factor(ratio, 1.0);
        assert!(k < previous, "ratio {ratio}: {k} >= {previous}");
        previous = k;
    }
}
