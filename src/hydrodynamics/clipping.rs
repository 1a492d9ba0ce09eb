use glam::Vec3;

/// Cross-product magnitude below which a face is treated as degenerate.
pub const DEGENERATE_EPSILON: f32 = 1e-9;

/// Part of a triangle lying on one side of the fluid surface.
///
/// Winding of the source triangle is preserved, so outward normals stay outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClippedTriangle {
    Empty,
    Triangle([Vec3; 3]),
    Quad([Vec3; 4]),
}

impl ClippedTriangle {
    /// The clipped polygon split into triangles sharing the source face normal.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> {
        let (first, second) = match *self {
            ClippedTriangle::Empty => (None, None),
            ClippedTriangle::Triangle(t) => (Some(t), None),
            ClippedTriangle::Quad([a, b, c, d]) => (Some([a, b, c]), Some([a, c, d])),
        };
        first.into_iter().chain(second)
    }

    pub fn area(&self) -> f32 {
        self.triangles().map(|t| triangle_area(&t)).sum()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ClippedTriangle::Empty)
    }
}

/// Geometric quantities of one wetted face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub centroid: Vec3,
    /// Unnormalized normal; its length is twice the area.
    pub normal: Vec3,
    pub unit_normal: Vec3,
    pub area: f32,
}

impl Face {
    /// Returns `None` for degenerate triangles.
    pub fn from_triangle(tri: &[Vec3; 3]) -> Option<Face> {
        let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
        let length = normal.length();
        if length < DEGENERATE_EPSILON {
            return None;
        }
        Some(Face {
            centroid: (tri[0] + tri[1] + tri[2]) / 3.0,
            normal,
            unit_normal: normal / length,
            area: 0.5 * length,
        })
    }
}

pub fn triangle_area(tri: &[Vec3; 3]) -> f32 {
    0.5 * (tri[1] - tri[0]).cross(tri[2] - tri[0]).length()
}

/// Clips `tri` to the submerged side (`depth >= 0`).
///
/// Crossing points are interpolated linearly along each edge whose end depths differ in
/// sign: for an edge from a submerged vertex `B` to a dry vertex `A`, the crossing lies at
/// `B + (A - B) · dB / (dB + |dA|)`.
pub fn clip_triangle_below(tri: &[Vec3; 3], depths: [f32; 3]) -> ClippedTriangle {
    let dry = depths.iter().filter(|&&d| d < 0.0).count();
    match dry {
        0 => ClippedTriangle::Triangle(*tri),
        3 => ClippedTriangle::Empty,
        1 => {
            let a = depths.iter().position(|&d| d < 0.0).unwrap_or(0);
            let (b, c) = ((a + 1) % 3, (a + 2) % 3);
            ClippedTriangle::Quad([
                crossing(tri[b], depths[b], tri[a], depths[a]),
                tri[b],
                tri[c],
                crossing(tri[c], depths[c], tri[a], depths[a]),
            ])
        }
        _ => {
            let s = depths.iter().position(|&d| d >= 0.0).unwrap_or(0);
            let (n1, n2) = ((s + 1) % 3, (s + 2) % 3);
            ClippedTriangle::Triangle([
                tri[s],
                crossing(tri[s], depths[s], tri[n1], depths[n1]),
                crossing(tri[s], depths[s], tri[n2], depths[n2]),
            ])
        }
    }
}

/// Clips `tri` to the dry side (`depth <= 0`).
pub fn clip_triangle_above(tri: &[Vec3; 3], depths: [f32; 3]) -> ClippedTriangle {
    clip_triangle_below(tri, depths.map(|d| -d))
}

/// Point where depth crosses zero on the edge from `wet` (depth ≥ 0) to `dry` (depth < 0).
fn crossing(wet: Vec3, wet_depth: f32, dry: Vec3, dry_depth: f32) -> Vec3 {
    let t = wet_depth / (wet_depth + dry_depth.abs());
    wet + (dry - wet) * t
}
