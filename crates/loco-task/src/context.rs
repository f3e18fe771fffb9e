//! Per-tick inputs handed to the task machine.

use glam::Vec3;

use loco_core::{AgentRng, BodyId, EntityHandle};
use loco_nav::Navigator;
use loco_physics::PhysicsWorld;

/// Read-only view of the other entities a task may refer to.
///
/// Implemented by the simulation; handles that no longer resolve return
/// `None` / `false` everywhere.
pub trait EntityView {
    /// Where the entity stands (a character's feet).
    fn ground_position(&self, entity: EntityHandle) -> Option<Vec3>;

    /// The point to aim and trace line of sight at.
    fn aim_point(&self, entity: EntityHandle) -> Option<Vec3>;

    fn velocity(&self, entity: EntityHandle) -> Option<Vec3>;

    fn body(&self, entity: EntityHandle) -> Option<BodyId>;

    fn is_alive(&self, entity: EntityHandle) -> bool;

    /// `true` once the entity is marked for deletion (it still resolves
    /// until the end-of-tick flush).
    fn is_marked(&self, entity: EntityHandle) -> bool;
}

/// Everything a task needs for one tick.
///
/// Built by the simulation once per agent per tick.
pub struct TaskContext<'a> {
    pub agent:     EntityHandle,
    /// The agent's own body, skipped by line-of-sight traces.
    pub body:      Option<BodyId>,
    /// Ground position of the agent (its feet).
    pub feet:      Vec3,
    /// Line-of-sight origin.
    pub eye:       Vec3,
    pub dt:        f32,

    /// Locomotion state as of the previous tick.
    pub on_ground:            bool,
    pub since_ground_contact: f32,
    /// An animation is playing that must not be interrupted by movement.
    pub animation_locked:     bool,

    pub physics:   &'a dyn PhysicsWorld,
    pub navigator: &'a dyn Navigator,
    pub entities:  &'a dyn EntityView,
    pub rng:       &'a mut AgentRng,
}
