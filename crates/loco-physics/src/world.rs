//! The physics collaborator contract.
//!
//! # Pluggability
//!
//! The locomotion and task layers talk to physics only through
//! [`PhysicsWorld`], so an application can put any engine behind it.  The
//! bundled [`SimpleWorld`](crate::SimpleWorld) is a small deterministic
//! reference used by tests and the demo.

use loco_core::BodyId;

use crate::{BodyDesc, BodyState, Capability, ContactMask, PhysicsResult, Ray, RayHit, Shape, Volume};

pub trait PhysicsWorld {
    /// Every body `ray` passes through within its length, ascending by
    /// distance.  Bodies in `exclude` are skipped.
    fn ray_cast_piercing(&self, ray: &Ray, mask: ContactMask, exclude: &[BodyId]) -> Vec<RayHit>;

    /// Bodies overlapping `volume`, in ascending id order.
    fn volume_cast(&self, volume: &Volume, mask: ContactMask, exclude: &[BodyId]) -> Vec<BodyId>;

    fn body(&self, id: BodyId) -> Option<&BodyState>;

    fn body_mut(&mut self, id: BodyId) -> Option<&mut BodyState>;

    fn insert_body(&mut self, desc: BodyDesc) -> PhysicsResult<BodyId>;

    fn remove_body(&mut self, id: BodyId) -> PhysicsResult<BodyState>;

    /// Replace a body's collider (crouching swaps the character capsule).
    fn set_shape(&mut self, id: BodyId, shape: Shape) -> PhysicsResult<()>;

    fn supports(&self, capability: Capability) -> bool;

    /// Advance the world by `dt` seconds.
    fn step(&mut self, dt: f32);
}
