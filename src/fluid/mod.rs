//! Fluid volumes bodies can be immersed in.
//!
//! A fluid answers point queries (depth, pressure, velocity) and exposes its bulk
//! properties. Depth is positive below the free surface.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_GRAVITY;
use crate::core::mesh::Aabb;

/// Bulk properties of a liquid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    /// kg/m³
    pub density: f32,
    /// Dynamic viscosity, Pa·s
    pub viscosity: f32,
}

impl FluidProperties {
    pub fn water() -> Self {
        Self {
            density: 1000.0,
            viscosity: 1.002e-3,
        }
    }

    pub fn seawater() -> Self {
        Self {
            density: 1025.0,
            viscosity: 1.08e-3,
        }
    }
}

impl Default for FluidProperties {
    fn default() -> Self {
        Self::water()
    }
}

/// Point queries against a body of fluid.
pub trait FluidField: Send + Sync {
    /// Distance below the free surface; negative above it.
    fn depth_at(&self, point: Vec3) -> f32;
    /// Gauge pressure at `point` (Pa), zero above the surface.
    fn pressure_at(&self, point: Vec3) -> f32;
    /// Velocity of the fluid at `point`.
    fn velocity_at(&self, point: Vec3) -> Vec3;
    fn density(&self) -> f32;
    fn viscosity(&self) -> f32;
    fn gravity(&self) -> Vec3;
    /// Replaces the gravity used for hydrostatic pressure and buoyancy.
    fn set_gravity(&mut self, gravity: Vec3);
    /// Region occupied by this fluid, used for the broadphase overlap test.
    fn bounds(&self) -> Aabb;

    fn is_submerged(&self, point: Vec3) -> bool {
        self.depth_at(point) > 0.0
    }
}

/// Open water with a flat free surface and a uniform current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ocean {
    pub surface_level: f32,
    pub properties: FluidProperties,
    pub current: Vec3,
    pub gravity: Vec3,
    /// Horizontal/vertical limits; unbounded when `None`.
    pub extent: Option<Aabb>,
}

impl Default for Ocean {
    fn default() -> Self {
        Self {
            surface_level: 0.0,
            properties: FluidProperties::seawater(),
            current: Vec3::ZERO,
            gravity: Vec3::from_array(DEFAULT_GRAVITY),
            extent: None,
        }
    }
}

impl Ocean {
    pub fn new(surface_level: f32, properties: FluidProperties) -> Self {
        Self {
            surface_level,
            properties,
            ..Self::default()
        }
    }

    pub fn with_current(mut self, current: Vec3) -> Self {
        self.current = current;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_extent(mut self, extent: Aabb) -> Self {
        self.extent = Some(extent);
        self
    }
}

impl FluidField for Ocean {
    fn depth_at(&self, point: Vec3) -> f32 {
        self.surface_level - point.y
    }

    fn pressure_at(&self, point: Vec3) -> f32 {
        let depth = self.depth_at(point);
        if depth <= 0.0 {
            return 0.0;
        }
        self.properties.density * self.gravity.length() * depth
    }

    fn velocity_at(&self, _point: Vec3) -> Vec3 {
        self.current
    }

    fn density(&self) -> f32 {
        self.properties.density
    }

    fn viscosity(&self) -> f32 {
        self.properties.viscosity
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn bounds(&self) -> Aabb {
        match self.extent {
            Some(extent) => extent,
            None => {
                let mut bounds = Aabb::infinite();
                bounds.max.y = self.surface_level;
                bounds
            }
        }
    }
}

/// A finite box of still liquid, filled up to its top face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub volume: Aabb,
    pub properties: FluidProperties,
    pub gravity: Vec3,
}

impl Pool {
    pub fn new(volume: Aabb, properties: FluidProperties) -> Self {
        Self {
            volume,
            properties,
            gravity: Vec3::from_array(DEFAULT_GRAVITY),
        }
    }

    fn contains_horizontally(&self, point: Vec3) -> bool {
        point.x >= self.volume.min.x
            && point.x <= self.volume.max.x
            && point.z >= self.volume.min.z
            && point.z <= self.volume.max.z
            && point.y >= self.volume.min.y
    }
}

impl FluidField for Pool {
    fn depth_at(&self, point: Vec3) -> f32 {
        let depth = self.volume.max.y - point.y;
        if depth > 0.0 && !self.contains_horizontally(point) {
            // outside the walls: report as dry
            return -f32::EPSILON;
        }
        depth
    }

    fn pressure_at(&self, point: Vec3) -> f32 {
        let depth = self.depth_at(point);
        if depth <= 0.0 {
            return 0.0;
        }
        self.properties.density * self.gravity.length() * depth
    }

    fn velocity_at(&self, _point: Vec3) -> Vec3 {
        Vec3::ZERO
    }

    fn density(&self) -> f32 {
        self.properties.density
    }

    fn viscosity(&self) -> f32 {
        self.properties.viscosity
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn bounds(&self) -> Aabb {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ocean_pressure_is_hydrostatic() {
        let ocean = Ocean::new(1.0, FluidProperties::water());
        assert_relative_eq!(ocean.depth_at(Vec3::new(5.0, -1.0, 3.0)), 2.0);
        assert_relative_eq!(ocean.pressure_at(Vec3::new(0.0, -1.0, 0.0)), 1000.0 * 9.81 * 2.0);
        assert_eq!(ocean.pressure_at(Vec3::new(0.0, 2.0, 0.0)), 0.0);
    }

    #[test]
    fn unbounded_ocean_ends_at_surface() {
        let ocean = Ocean::new(0.5, FluidProperties::seawater());
        let bounds = ocean.bounds();
        assert_eq!(bounds.max.y, 0.5);
        assert!(bounds.overlaps(&Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))));
        assert!(!bounds.overlaps(&Aabb::new(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(2.0))));
    }

    #[test]
    fn pool_walls_are_dry_outside() {
        let pool = Pool::new(
            Aabb::new(Vec3::new(-1.0, -2.0, -1.0), Vec3::new(1.0, 0.0, 1.0)),
            FluidProperties::water(),
        );
        assert_relative_eq!(pool.depth_at(Vec3::new(0.0, -1.0, 0.0)), 1.0);
        assert!(pool.depth_at(Vec3::new(3.0, -1.0, 0.0)) <= 0.0);
        assert_eq!(pool.pressure_at(Vec3::new(3.0, -1.0, 0.0)), 0.0);
    }
}
