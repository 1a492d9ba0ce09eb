use approx::assert_relative_eq;
use hydrosim::*;

fn tetrahedron(indices: Vec<[u32; 3]>) -> TriangleMesh {
    TriangleMesh::builder(
        vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
        indices,
    )
    .build()
}

#[test]
fn weld_vertices_reduces_duplicates() {
    let vertices = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    let indices = vec![[1, 3, 4]];

    let mesh = TriangleMesh::builder(vertices, indices)
        .weld_vertices(0.01)
        .build();

    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.indices, vec![[0, 1, 2]]);
}

#[test]
fn triangle_soup_welds_into_the_same_solid() {
    let reference = TriangleMesh::cuboid(Vec3::new(0.5, 0.2, 0.3), 2);
    let soup: Vec<Vec3> = reference
        .triangles(&Transform::IDENTITY)
        .flatten()
        .collect();
    let indices = (0..reference.triangle_count() as u32)
        .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
        .collect();

    let welded = TriangleMesh::builder(soup, indices)
        .weld_vertices(1e-4)
        .build();
    assert_eq!(welded.vertices.len(), reference.vertices.len());

    let a = MeshMassProperties::compute(&reference, 1000.0);
    let b = MeshMassProperties::compute(&welded, 1000.0);
    assert_relative_eq!(a.volume, b.volume, epsilon = 1e-9);
    assert_relative_eq!(a.volume, 0.24, epsilon = 1e-6);
}

#[test]
fn recentred_mesh_has_centroid_at_origin() {
    let mesh = TriangleMesh::cuboid(Vec3::splat(0.5), 1);
    let moved = TriangleMesh::builder(mesh.vertices, mesh.indices)
        .translate(Vec3::new(3.0, -2.0, 1.0))
        .recenter()
        .build();
    let props = MeshMassProperties::compute(&moved, 1.0);
    assert!(props.centroid.length() < 1e-6);
    assert_relative_eq!(moved.bounds.center().length(), 0.0, epsilon = 1e-6);
}

#[test]
fn inward_wound_hulls_are_flipped() {
    let outward = tetrahedron(vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]);
    let inward = tetrahedron(vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]]);
    assert!(MeshMassProperties::compute(&inward, 1.0).volume < 0.0);

    let a = SolidEntity::from_mesh("a", outward, MaterialId(0), 1000.0);
    let b = SolidEntity::from_mesh("b", inward, MaterialId(0), 1000.0);
    assert_relative_eq!(a.volume(), 1.0 / 6.0, epsilon = 1e-6);
    assert_relative_eq!(b.volume(), a.volume(), epsilon = 1e-6);
    assert_relative_eq!(b.mass(), a.mass(), epsilon = 1e-3);
}

#[test]
fn mass_properties_follow_density() {
    let mesh = TriangleMesh::cuboid(Vec3::new(1.0, 0.5, 0.25), 1);
    let solid = SolidEntity::from_mesh("slab", mesh, MaterialId(0), 800.0);
    // 2 × 1 × 0.5 m
    assert_relative_eq!(solid.mass(), 800.0, epsilon = 1e-3);
    let inertia = solid.inertia();
    assert_relative_eq!(inertia.x, 800.0 * (1.0 + 0.25) / 12.0, max_relative = 1e-4);
    assert_relative_eq!(inertia.y, 800.0 * (4.0 + 0.25) / 12.0, max_relative = 1e-4);
    assert_relative_eq!(inertia.z, 800.0 * (4.0 + 1.0) / 12.0, max_relative = 1e-4);
}
