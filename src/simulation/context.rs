use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::config::{FluidDynamicsSettings, SimulationSettings};
use crate::core::material::MaterialTable;
use crate::core::solid::{HasMesh, SolidEntity};
use crate::core::types::Transform;
use crate::dynamics::engine::DynamicsEngine;
use crate::error::{SimulationError, SimulationResult};
use crate::fluid::FluidField;
use crate::hydrodynamics::forces::{compute_all, BodyState, FluidJob, ForceAccumulator};
use crate::utils::allocator::BodyHandle;

use super::stats::SimulationStats;

/// Everything a tick operates on. Passed explicitly; there is no global instance.
pub struct SimulationContext {
    engine: Box<dyn DynamicsEngine>,
    solids: Vec<SolidEntity>,
    fluids: Vec<Box<dyn FluidField>>,
    materials: MaterialTable,
    settings: Arc<Mutex<SimulationSettings>>,
    stats: Arc<Mutex<SimulationStats>>,
}

impl SimulationContext {
    pub fn new<E: DynamicsEngine + 'static>(engine: E) -> Self {
        Self::with_engine(Box::new(engine))
    }

    pub fn with_engine(engine: Box<dyn DynamicsEngine>) -> Self {
        Self {
            engine,
            solids: Vec::new(),
            fluids: Vec::new(),
            materials: MaterialTable::new(),
            settings: Arc::new(Mutex::new(SimulationSettings::default())),
            stats: Arc::new(Mutex::new(SimulationStats::default())),
        }
    }

    pub fn engine(&self) -> &dyn DynamicsEngine {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> &mut dyn DynamicsEngine {
        self.engine.as_mut()
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialTable {
        &mut self.materials
    }

    /// Shared settings handle; other threads may edit it between steps.
    pub fn settings(&self) -> Arc<Mutex<SimulationSettings>> {
        Arc::clone(&self.settings)
    }

    pub fn settings_snapshot(&self) -> SimulationSettings {
        self.settings.lock().clone()
    }

    pub fn stats(&self) -> Arc<Mutex<SimulationStats>> {
        Arc::clone(&self.stats)
    }

    /// Registers `solid` with the engine, its geometry frame placed at `geometry_pose`.
    pub fn add_solid(&mut self, mut solid: SolidEntity, geometry_pose: Transform) -> BodyHandle {
        let handle = self.engine.add_body(solid.rigid_body_desc(geometry_pose));
        solid.set_handle(handle);
        info!(
            "Registered solid '{}' as {handle} (mass {:.3} kg, volume {:.4} m³)",
            solid.name,
            solid.mass(),
            solid.volume()
        );
        self.solids.push(solid);
        handle
    }

    /// Unregisters a solid from the engine and hands it back without a handle.
    pub fn remove_solid(&mut self, handle: BodyHandle) -> SimulationResult<SolidEntity> {
        let index = self
            .solids
            .iter()
            .position(|solid| solid.handle() == Some(handle))
            .ok_or(SimulationError::UnknownBody(handle))?;
        if !self.engine.remove_body(handle) {
            warn!("Engine no longer knew solid '{}' ({handle})", self.solids[index].name);
        }
        let mut solid = self.solids.remove(index);
        solid.clear_handle();
        info!("Removed solid '{}' ({handle})", solid.name);
        Ok(solid)
    }

    pub fn solids(&self) -> &[SolidEntity] {
        &self.solids
    }

    pub fn solid(&self, handle: BodyHandle) -> Option<&SolidEntity> {
        self.solids.iter().find(|solid| solid.handle() == Some(handle))
    }

    pub fn solid_by_name(&self, name: &str) -> Option<&SolidEntity> {
        self.solids.iter().find(|solid| solid.name == name)
    }

    pub fn add_fluid<F: FluidField + 'static>(&mut self, fluid: F) -> usize {
        self.fluids.push(Box::new(fluid));
        self.fluids.len() - 1
    }

    pub fn fluids(&self) -> &[Box<dyn FluidField>] {
        &self.fluids
    }

    /// World pose of a solid's geometry frame.
    pub fn geometry_pose(&self, handle: BodyHandle) -> SimulationResult<Transform> {
        let solid = self.solid(handle).ok_or(SimulationError::UnknownBody(handle))?;
        let cg = self
            .engine
            .world_transform(handle)
            .ok_or(SimulationError::UnknownBody(handle))?;
        Ok(solid.geometry_to_world(&cg))
    }

    fn body_state(&self, handle: BodyHandle) -> Option<BodyState> {
        Some(BodyState {
            cg: self.engine.world_transform(handle)?,
            velocity: self.engine.velocity(handle)?,
            world_bounds: self.engine.aabb(handle)?,
        })
    }

    pub(crate) fn apply_solid_gravity(&mut self, gravity: Vec3) {
        for solid in &self.solids {
            if let Some(handle) = solid.handle() {
                self.engine.apply_central_force(handle, gravity * solid.mass());
            }
        }
    }

    /// Makes every fluid volume weigh its water with the same gravity the solids fall under.
    pub(crate) fn sync_fluid_gravity(&mut self, gravity: Vec3) {
        for fluid in &mut self.fluids {
            if fluid.gravity() != gravity {
                debug!("Fluid gravity {} replaced by {gravity}", fluid.gravity());
                fluid.set_gravity(gravity);
            }
        }
    }

    /// Computes and applies fluid loads for every overlapping (solid, fluid) pair.
    ///
    /// Returns the number of pairs evaluated.
    pub(crate) fn apply_fluid_forces(&mut self, settings: &FluidDynamicsSettings) -> usize {
        let handles: Vec<BodyHandle> = self.solids.iter().filter_map(|s| s.handle()).collect();
        if handles.is_empty() || self.fluids.is_empty() {
            for solid in &mut self.solids {
                solid.set_fluid_forces(ForceAccumulator::default());
            }
            return 0;
        }

        let index_of: HashMap<BodyHandle, usize> = self
            .solids
            .iter()
            .enumerate()
            .filter_map(|(index, solid)| solid.handle().map(|handle| (handle, index)))
            .collect();
        let pairs = self.engine.fluid_overlaps(&handles, &self.fluids);

        let mut owners = Vec::with_capacity(pairs.len());
        let mut jobs = Vec::with_capacity(pairs.len());
        for (handle, volume) in &pairs {
            let (Some(&index), Some(fluid), Some(state)) = (
                index_of.get(handle),
                self.fluids.get(*volume),
                self.body_state(*handle),
            ) else {
                warn!("Skipping fluid pair ({handle}, volume {volume}): body state unavailable");
                continue;
            };
            owners.push(index);
            jobs.push(FluidJob {
                body: &self.solids[index],
                state,
                fluid: fluid.as_ref(),
            });
        }
        let results = compute_all(&jobs, settings);
        drop(jobs);

        let mut totals = vec![ForceAccumulator::default(); self.solids.len()];
        for (index, forces) in owners.into_iter().zip(results) {
            totals[index] += forces;
        }

        for (solid, forces) in self.solids.iter_mut().zip(totals) {
            if let (Some(handle), false) = (solid.handle(), forces.is_zero()) {
                let wrench = forces.total();
                self.engine.apply_central_force(handle, wrench.force);
                self.engine.apply_torque(handle, wrench.torque);
            }
            solid.set_fluid_forces(forces);
        }
        pairs.len()
    }

    pub(crate) fn update_accelerations(&mut self, dt: f32) {
        for solid in &mut self.solids {
            let Some(velocity) = solid.handle().and_then(|h| self.engine.velocity(h)) else {
                continue;
            };
            solid.motion_mut().update(velocity, dt);
        }
    }

    pub(crate) fn reset_motion_filters(&mut self) {
        for solid in &mut self.solids {
            let velocity = solid
                .handle()
                .and_then(|h| self.engine.velocity(h))
                .unwrap_or_default();
            solid.motion_mut().reset(velocity);
        }
    }

    pub(crate) fn publish<F: FnOnce(&mut SimulationStats)>(&self, update: F) {
        update(&mut self.stats.lock());
    }
}
