use std::collections::HashMap;
use std::f32::consts::PI;

use glam::{DMat3, DVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::types::Transform;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Box covering all of space, used by unbounded fluid volumes.
    pub fn infinite() -> Self {
        Self {
            min: Vec3::splat(f32::NEG_INFINITY),
            max: Vec3::splat(f32::INFINITY),
        }
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.extend(p);
        }
        bounds
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn radius(&self) -> f32 {
        self.extent().length()
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// The eight corners: `min`, `max`, and every mix of min and max coordinates.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            lo,
            hi,
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
        ]
    }

    /// Bounds of this box after a rigid transform.
    pub fn transformed(&self, transform: &Transform) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::from_points(self.corners().map(|c| transform.transform_point(c)))
    }
}

/// Triangle mesh in its own geometry frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<[u32; 3]>,
    pub bounds: Aabb,
}

impl TriangleMesh {
    pub fn builder(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>) -> MeshBuilder {
        MeshBuilder::new(vertices, indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Triangles with vertices mapped through `transform`.
    ///
    /// Faces referencing out-of-range vertices are skipped.
    pub fn triangles<'a>(
        &'a self,
        transform: &'a Transform,
    ) -> impl Iterator<Item = [Vec3; 3]> + 'a {
        self.indices.iter().filter_map(move |face| {
            let a = self.vertices.get(face[0] as usize)?;
            let b = self.vertices.get(face[1] as usize)?;
            let c = self.vertices.get(face[2] as usize)?;
            Some([
                transform.transform_point(*a),
                transform.transform_point(*b),
                transform.transform_point(*c),
            ])
        })
    }

    /// Closed box with each face split into `subdivisions²` quads, centred at the origin.
    pub fn cuboid(half_extents: Vec3, subdivisions: u32) -> TriangleMesh {
        let n = subdivisions.max(1);
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for (normal, u, v) in faces {
            let hn = (normal * half_extents).abs().max_element();
            let hu = (u * half_extents).abs().max_element();
            let hv = (v * half_extents).abs().max_element();
            let base = vertices.len() as u32;
            for j in 0..=n {
                for i in 0..=n {
                    let s = 2.0 * i as f32 / n as f32 - 1.0;
                    let t = 2.0 * j as f32 / n as f32 - 1.0;
                    vertices.push(normal * hn + u * (hu * s) + v * (hv * t));
                }
            }
            let row = n + 1;
            for j in 0..n {
                for i in 0..n {
                    let a = base + j * row + i;
                    let b = a + 1;
                    let c = a + row + 1;
                    let d = a + row;
                    indices.push([a, b, c]);
                    indices.push([a, c, d]);
                }
            }
        }

        MeshBuilder::new(vertices, indices)
            .weld_vertices(half_extents.min_element() * 1e-4)
            .build()
    }

    /// Latitude/longitude sphere centred at the origin, outward winding.
    pub fn uv_sphere(radius: f32, rings: u32, segments: u32) -> TriangleMesh {
        let rings = rings.max(2);
        let segments = segments.max(3);

        let mut vertices = vec![Vec3::new(0.0, radius, 0.0)];
        for k in 1..rings {
            let phi = PI * k as f32 / rings as f32;
            for s in 0..segments {
                let theta = 2.0 * PI * s as f32 / segments as f32;
                vertices.push(Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.sin(),
                ));
            }
        }
        vertices.push(Vec3::new(0.0, -radius, 0.0));
        let south = (vertices.len() - 1) as u32;

        let ring_vertex = |k: u32, s: u32| 1 + (k - 1) * segments + (s % segments);
        let mut indices = Vec::new();
        for s in 0..segments {
            indices.push([0, ring_vertex(1, s + 1), ring_vertex(1, s)]);
        }
        for k in 1..rings - 1 {
            for s in 0..segments {
                let a = ring_vertex(k, s);
                let b = ring_vertex(k, s + 1);
                let c = ring_vertex(k + 1, s + 1);
                let d = ring_vertex(k + 1, s);
                indices.push([a, b, c]);
                indices.push([a, c, d]);
            }
        }
        for s in 0..segments {
            indices.push([ring_vertex(rings - 1, s), ring_vertex(rings - 1, s + 1), south]);
        }

        MeshBuilder::new(vertices, indices).build()
    }
}

/// Helper used to cook triangle meshes from raw vertex/index buffers.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    vertices: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    /// Deduplicates vertices using a quantized grid.
    pub fn weld_vertices(mut self, epsilon: f32) -> Self {
        if epsilon <= 0.0 || self.vertices.is_empty() {
            return self;
        }

        let inv = 1.0 / epsilon;
        let mut map: HashMap<(i64, i64, i64), u32> = HashMap::new();
        let mut new_vertices: Vec<Vec3> = Vec::new();
        let mut remap: Vec<u32> = Vec::with_capacity(self.vertices.len());

        for v in &self.vertices {
            let key = (
                (v.x * inv).round() as i64,
                (v.y * inv).round() as i64,
                (v.z * inv).round() as i64,
            );
            let index = *map.entry(key).or_insert_with(|| {
                let idx = new_vertices.len() as u32;
                new_vertices.push(*v);
                idx
            });
            remap.push(index);
        }

        for tri in &mut self.indices {
            for corner in tri.iter_mut() {
                if let Some(&mapped) = remap.get(*corner as usize) {
                    *corner = mapped;
                }
            }
        }

        self.vertices = new_vertices;
        self
    }

    /// Recenters vertices around their centroid.
    pub fn recenter(mut self) -> Self {
        if self.vertices.is_empty() {
            return self;
        }
        let centroid: Vec3 =
            self.vertices.iter().copied().sum::<Vec3>() / self.vertices.len() as f32;
        for vertex in &mut self.vertices {
            *vertex -= centroid;
        }
        self
    }

    /// Moves every vertex by `offset`.
    pub fn translate(mut self, offset: Vec3) -> Self {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
        self
    }

    pub fn build(self) -> TriangleMesh {
        let bounds = Aabb::from_points(self.vertices.iter().copied());
        TriangleMesh {
            vertices: self.vertices,
            indices: self.indices,
            bounds,
        }
    }
}

/// Volume integrals of a closed, outward-wound triangle mesh.
#[derive(Debug, Clone, Copy)]
pub struct MeshMassProperties {
    pub volume: f64,
    pub mass: f64,
    /// Centroid of the enclosed volume in the geometry frame.
    pub centroid: DVec3,
    /// Inertia tensor about the centroid, in the geometry frame.
    pub inertia: DMat3,
}

impl MeshMassProperties {
    /// Integrates volume, centroid, and inertia with signed tetrahedra fanned from the origin.
    pub fn compute(mesh: &TriangleMesh, density: f64) -> MeshMassProperties {
        let mut volume = 0.0;
        let mut first_moment = DVec3::ZERO;
        let mut second_moment = DMat3::ZERO;

        for [a, b, c] in mesh.triangles(&Transform::IDENTITY) {
            let (a, b, c) = (a.as_dvec3(), b.as_dvec3(), c.as_dvec3());
            let v = a.dot(b.cross(c)) / 6.0;
            let sum = a + b + c;
            volume += v;
            first_moment += sum * (v / 4.0);
            second_moment += (outer(a, a) + outer(b, b) + outer(c, c) + outer(sum, sum))
                * (v / 20.0);
        }

        let centroid = if volume.abs() > f64::EPSILON {
            first_moment / volume
        } else {
            DVec3::ZERO
        };
        let covariance = second_moment - outer(centroid, centroid) * volume;
        let trace = covariance.x_axis.x + covariance.y_axis.y + covariance.z_axis.z;
        let inertia = (DMat3::IDENTITY * trace - covariance) * density;

        MeshMassProperties {
            volume,
            mass: volume * density,
            centroid,
            inertia,
        }
    }
}

fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}
