//! # Physics Step
//!
//! The engine does not simulate anything itself. It calls one
//! [`PhysicsStep`] per frame, between the early and late scheduler passes,
//! then reads positions back through [`PhysicsStep::world`].

use lumen_rendering::World;

/// External simulation advanced once per frame.
pub trait PhysicsStep {
    /// Advances the simulation by `dt` seconds of scaled time.
    fn step(&mut self, dt: f32);

    /// World the camera should draw this frame.
    ///
    /// `None` means "no world attached": the camera draws its placeholder.
    fn world(&self) -> Option<&dyn World> {
        None
    }
}

/// No simulation and no world.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPhysics;

impl PhysicsStep for NoPhysics {
    fn step(&mut self, _dt: f32) {}
}
