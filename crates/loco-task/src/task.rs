//! Task variants.

use glam::Vec3;

use loco_core::EntityHandle;

/// Default Move reach distance.
pub const DEFAULT_REACH: f32 = 1.5;

/// Where a Move task is headed, or what an Attack task engages.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveTarget {
    Position(Vec3),
    /// Follow an entity's current ground position.
    Entity(EntityHandle),
}

/// One unit of agent behaviour.  Tasks only refer to other entities by
/// handle and never own them.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Task {
    /// Stand still.  Never finishes on its own.
    #[default]
    Idle,
    /// Walk to `target`; finishes within `reach_distance`.
    Move { target: MoveTarget, reach_distance: f32 },
    /// Engage `target`.  An entity target finishes once it is marked for
    /// deletion; a position target never finishes on its own.
    Attack { target: MoveTarget },
}

/// Discriminant of [`Task`], used for logging and persistence tags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Idle,
    Move,
    Attack,
}

impl TaskKind {
    pub fn tag(self) -> &'static str {
        match self {
            TaskKind::Idle => "idle",
            TaskKind::Move => "move",
            TaskKind::Attack => "attack",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl Task {
    pub fn move_to(position: Vec3, reach_distance: f32) -> Self {
        Task::Move { target: MoveTarget::Position(position), reach_distance }
    }

    pub fn follow(entity: EntityHandle, reach_distance: f32) -> Self {
        Task::Move { target: MoveTarget::Entity(entity), reach_distance }
    }

    pub fn attack(entity: EntityHandle) -> Self {
        Task::Attack { target: MoveTarget::Entity(entity) }
    }

    /// Attack a fixed point, e.g. suppressive fire on a doorway.
    pub fn attack_position(position: Vec3) -> Self {
        Task::Attack { target: MoveTarget::Position(position) }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Idle => TaskKind::Idle,
            Task::Move { .. } => TaskKind::Move,
            Task::Attack { .. } => TaskKind::Attack,
        }
    }

    /// The entity this task refers to, if any.
    pub fn target_entity(&self) -> Option<EntityHandle> {
        match *self {
            Task::Move { target: MoveTarget::Entity(e), .. } | Task::Attack { target: MoveTarget::Entity(e) } => {
                Some(e)
            }
            _ => None,
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Task::Idle)
    }
}
