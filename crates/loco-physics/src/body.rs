//! Rigid-body state exposed to the locomotion layer.

use glam::{Quat, Vec3};

use crate::ContactMask;

/// How the backend moves a body.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyKind {
    /// Never moves.
    Static,
    /// Integrated from velocity, forces and impulses.
    Dynamic,
    /// Moved by its velocity only; ignores forces.
    Kinematic,
}

/// Collider geometry in the body's local frame.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Solid region `{ p : normal · p ≤ offset }`.
    HalfSpace { normal: Vec3, offset: f32 },
    /// Box centred on the body origin.
    Cuboid { half_extents: Vec3 },
    /// Points within `radius` of the segment `a → b`.
    Capsule { a: Vec3, b: Vec3, radius: f32 },
}

/// Everything needed to insert a body into a world.
#[derive(Clone, Debug)]
pub struct BodyDesc {
    pub kind:            BodyKind,
    pub shape:           Shape,
    pub position:        Vec3,
    pub rotation:        Quat,
    pub mass:            f32,
    pub group:           ContactMask,
    pub linear_velocity: Vec3,
}

impl BodyDesc {
    pub fn fixed(shape: Shape, position: Vec3) -> Self {
        Self {
            kind: BodyKind::Static,
            shape,
            position,
            rotation: Quat::IDENTITY,
            mass: 0.0,
            group: ContactMask::STATIC,
            linear_velocity: Vec3::ZERO,
        }
    }

    pub fn dynamic(shape: Shape, position: Vec3, mass: f32) -> Self {
        Self { kind: BodyKind::Dynamic, mass, group: ContactMask::DYNAMIC, ..Self::fixed(shape, position) }
    }

    pub fn kinematic(shape: Shape, position: Vec3) -> Self {
        Self { kind: BodyKind::Kinematic, group: ContactMask::DYNAMIC, ..Self::fixed(shape, position) }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_group(mut self, group: ContactMask) -> Self {
        self.group = group;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }
}

// ── BodyState ─────────────────────────────────────────────────────────────────

/// Mutable per-body state.  Impulses and forces are accumulated and consumed
/// by the next `PhysicsWorld::step`.
#[derive(Clone, Debug)]
pub struct BodyState {
    pub kind:             BodyKind,
    pub group:            ContactMask,
    pub position:         Vec3,
    pub rotation:         Quat,
    pub linear_velocity:  Vec3,
    pub angular_velocity: Vec3,
    pub mass:             f32,
    /// Fraction of world gravity applied (0 = weightless).
    pub gravity_scale:    f32,
    pub linear_damping:   f32,
    pub angular_damping:  f32,
    pub sleeping:         bool,

    pending_impulse: Vec3,
    pending_force:   Vec3,
}

impl BodyState {
    pub fn new(kind: BodyKind, position: Vec3, mass: f32) -> Self {
        Self {
            kind,
            group: ContactMask::ALL,
            position,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            sleeping: false,
            pending_impulse: Vec3::ZERO,
            pending_force: Vec3::ZERO,
        }
    }

    pub(crate) fn from_desc(desc: &BodyDesc) -> Self {
        Self {
            group: desc.group,
            rotation: desc.rotation,
            linear_velocity: desc.linear_velocity,
            ..Self::new(desc.kind, desc.position, desc.mass)
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Queue an instantaneous change of momentum.  Wakes the body.
    pub fn add_impulse(&mut self, impulse: Vec3) {
        if impulse != Vec3::ZERO {
            self.pending_impulse += impulse;
            self.sleeping = false;
        }
    }

    /// Queue a force applied over the next step.  Wakes the body.
    pub fn add_force(&mut self, force: Vec3) {
        if force != Vec3::ZERO {
            self.pending_force += force;
            self.sleeping = false;
        }
    }

    /// Drain the accumulated `(impulse, force)`.
    pub fn take_pending(&mut self) -> (Vec3, Vec3) {
        let out = (self.pending_impulse, self.pending_force);
        self.pending_impulse = Vec3::ZERO;
        self.pending_force = Vec3::ZERO;
        out
    }

    pub fn pending_impulse(&self) -> Vec3 {
        self.pending_impulse
    }

    /// Put the body to sleep, discarding its motion.
    pub fn sleep(&mut self) {
        self.sleeping = true;
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.pending_impulse = Vec3::ZERO;
        self.pending_force = Vec3::ZERO;
    }

    pub fn wake(&mut self) {
        self.sleeping = false;
    }
}
