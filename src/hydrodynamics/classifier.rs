use serde::{Deserialize, Serialize};

use crate::core::mesh::Aabb;
use crate::fluid::FluidField;

/// How a body sits relative to a fluid's free surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Immersion {
    Outside,
    Crossing,
    Inside,
}

/// Classifies a body from the depth of the eight corners of its world AABB.
///
/// Corners are a coarse stand-in for the hull: a thin or concave body whose corners are
/// all wet can still have dry parts, and vice versa.
pub fn classify(world_bounds: &Aabb, fluid: &dyn FluidField) -> Immersion {
    let submerged = world_bounds
        .corners()
        .iter()
        .filter(|corner| fluid.depth_at(**corner) > 0.0)
        .count();
    match submerged {
        0 => Immersion::Outside,
        8 => Immersion::Inside,
        _ => Immersion::Crossing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::{FluidProperties, Ocean};
    use glam::Vec3;

    fn unit_box_at(y: f32) -> Aabb {
        Aabb::new(Vec3::new(-0.5, y - 0.5, -0.5), Vec3::new(0.5, y + 0.5, 0.5))
    }

    #[test]
    fn classifies_by_corner_count() {
        let ocean = Ocean::new(0.0, FluidProperties::water());
        assert_eq!(classify(&unit_box_at(2.0), &ocean), Immersion::Outside);
        assert_eq!(classify(&unit_box_at(0.0), &ocean), Immersion::Crossing);
        assert_eq!(classify(&unit_box_at(-2.0), &ocean), Immersion::Inside);
    }

    #[test]
    fn corner_on_surface_counts_as_dry() {
        let ocean = Ocean::new(0.0, FluidProperties::water());
        assert_eq!(classify(&unit_box_at(-0.5), &ocean), Immersion::Crossing);
        assert_eq!(classify(&unit_box_at(0.5), &ocean), Immersion::Outside);
    }
}
