//! Contracts of the objects the tick drives besides free solids.
//!
//! Implementations live outside this crate; the tick only relies on the call order.

use glam::Vec3;

use crate::dynamics::engine::DynamicsEngine;

use super::context::SimulationContext;

pub trait Actuator: Send {
    /// Applies this tick's actuation to the engine.
    fn update(&mut self, dt: f32, engine: &mut dyn DynamicsEngine);
}

pub trait Joint: Send {
    fn apply_damping(&mut self, engine: &mut dyn DynamicsEngine);
    /// Relative velocity of the joint coordinate (m/s or rad/s).
    fn velocity(&self, engine: &dyn DynamicsEngine) -> f32;
    /// Nudges the joint towards a consistent position; `true` once within `tolerance`.
    fn solve_position_ic(&mut self, engine: &mut dyn DynamicsEngine, tolerance: f32) -> bool;
}

pub trait Multibody: Send {
    fn apply_gravity(&mut self, gravity: Vec3, engine: &mut dyn DynamicsEngine);
    fn apply_damping(&mut self, engine: &mut dyn DynamicsEngine);
    /// `true` when every joint velocity is below `tolerance`.
    fn joints_at_rest(&self, engine: &dyn DynamicsEngine, tolerance: f32) -> bool;
    fn solve_position_ic(&mut self, engine: &mut dyn DynamicsEngine, tolerance: f32) -> bool;
}

pub trait Cable: Send {
    fn apply_gravity(&mut self, gravity: Vec3, engine: &mut dyn DynamicsEngine);
}

pub trait Sensor: Send {
    /// Samples the post-integration state.
    fn update(&mut self, dt: f32, context: &SimulationContext);
}

pub trait Controller: Send {
    fn update(&mut self, dt: f32);
}

/// A robot or vehicle bundling its own actuators, sensors and controllers.
pub trait SystemEntity: Send {
    fn update_actuators(&mut self, dt: f32, engine: &mut dyn DynamicsEngine);
    fn apply_gravity(&mut self, gravity: Vec3, engine: &mut dyn DynamicsEngine);
    fn apply_damping(&mut self, engine: &mut dyn DynamicsEngine);
    fn update_sensors(&mut self, dt: f32, context: &SimulationContext);
    fn update_controllers(&mut self, dt: f32);
}
