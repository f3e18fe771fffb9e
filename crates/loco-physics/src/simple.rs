//! `SimpleWorld`: a small deterministic [`PhysicsWorld`].
//!
//! # Scope
//!
//! Half-spaces, oriented boxes and capsules.  Bounded static colliders live in
//! an R-tree (`rstar`) for broadphase; half-spaces and moving bodies are tested
//! by brute force.  Dynamic bodies are integrated with explicit Euler
//! (impulses, forces, gravity, damping).  There is no contact solver: a dynamic
//! body whose move would newly overlap static geometry keeps the axis that is
//! still free (horizontal or vertical) and loses velocity on the blocked one.
//!
//! Body ids are never reused, so a stale id simply stops resolving.  Static
//! bodies are indexed at insertion and must not be moved afterwards.

use glam::{Quat, Vec3};
use rstar::{RTree, RTreeObject, AABB};

use loco_core::BodyId;

use crate::geometry::Posed;
use crate::{
    BodyDesc, BodyKind, BodyState, Bounds, Capability, ContactMask, PhysicsError, PhysicsResult,
    PhysicsWorld, Ray, RayHit, Shape, Volume,
};

/// Standard gravity, world-down.
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, 0.0, -9.81);

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct StaticEntry {
    min: [f32; 3],
    max: [f32; 3],
    id:  BodyId,
}

impl StaticEntry {
    fn new(bounds: Bounds, id: BodyId) -> Self {
        Self { min: bounds.min.to_array(), max: bounds.max.to_array(), id }
    }
}

impl RTreeObject for StaticEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

struct Slot {
    state: BodyState,
    shape: Shape,
}

impl Slot {
    fn posed(&self) -> Posed {
        Posed::new(&self.shape, self.state.position, self.state.rotation)
    }
}

// ── SimpleWorld ───────────────────────────────────────────────────────────────

pub struct SimpleWorld {
    slots:        Vec<Option<Slot>>,
    gravity:      Vec3,
    static_index: RTree<StaticEntry>,
    /// Static colliders without finite bounds (half-spaces).
    unbounded:    Vec<BodyId>,
    unsupported:  Vec<Capability>,
}

impl Default for SimpleWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleWorld {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            gravity: DEFAULT_GRAVITY,
            static_index: RTree::new(),
            unbounded: Vec::new(),
            unsupported: Vec::new(),
        }
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Report `capability` as unsupported (exercises controller fallbacks).
    pub fn without_capability(mut self, capability: Capability) -> Self {
        if !self.unsupported.contains(&capability) {
            self.unsupported.push(capability);
        }
        self
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn shape(&self, id: BodyId) -> Option<&Shape> {
        self.slot(id).map(|s| &s.shape)
    }

    // ── Scene helpers ─────────────────────────────────────────────────────

    /// Infinite floor whose surface is the plane `z = height`.
    pub fn add_ground_plane(&mut self, height: f32) -> PhysicsResult<BodyId> {
        self.insert_body(BodyDesc::fixed(
            Shape::HalfSpace { normal: Vec3::Z, offset: height },
            Vec3::ZERO,
        ))
    }

    /// Infinite plane through `point` tilted `angle` radians from flat, rising
    /// toward +X.
    pub fn add_slope(&mut self, point: Vec3, angle: f32) -> PhysicsResult<BodyId> {
        let normal = Vec3::new(-angle.sin(), 0.0, angle.cos());
        self.insert_body(BodyDesc::fixed(
            Shape::HalfSpace { normal, offset: normal.dot(point) },
            Vec3::ZERO,
        ))
    }

    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, rotation: Quat) -> PhysicsResult<BodyId> {
        self.insert_body(
            BodyDesc::fixed(Shape::Cuboid { half_extents }, center).with_rotation(rotation),
        )
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn slot(&self, id: BodyId) -> Option<&Slot> {
        self.slots.get(id.index()).and_then(|s| s.as_ref())
    }

    fn rebuild_static_index(&mut self) {
        let mut entries = Vec::new();
        self.unbounded.clear();
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(slot) = slot else { continue };
            if !slot.state.is_static() {
                continue;
            }
            let id = BodyId(i as u32);
            match slot.posed().bounds() {
                Some(b) => entries.push(StaticEntry::new(b, id)),
                None => self.unbounded.push(id),
            }
        }
        self.static_index = RTree::bulk_load(entries);
    }

    /// Bodies that might touch `area`, ascending by id.
    fn candidates(&self, area: &Bounds, statics_only: bool) -> Vec<BodyId> {
        let envelope = AABB::from_corners(area.min.to_array(), area.max.to_array());
        let mut out: Vec<BodyId> = self
            .static_index
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.id)
            .chain(self.unbounded.iter().copied())
            .collect();
        if !statics_only {
            out.extend(self.slots.iter().enumerate().filter_map(|(i, s)| {
                s.as_ref().filter(|s| !s.state.is_static()).map(|_| BodyId(i as u32))
            }));
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Static bodies overlapping `collider` (excluding `own`).
    fn static_overlaps(&self, own: BodyId, collider: &Posed) -> Vec<BodyId> {
        let Some(area) = collider.bounds() else { return Vec::new() };
        self.candidates(&area, true)
            .into_iter()
            .filter(|&id| id != own)
            .filter(|&id| self.slot(id).is_some_and(|s| s.posed().overlaps(collider)))
            .collect()
    }

    /// Move `from → to`, dropping whichever axis newly penetrates statics.
    ///
    /// Returns the reached position and `(horizontal_blocked, vertical_blocked)`.
    fn resolve_move(&self, id: BodyId, shape: &Shape, rotation: Quat, from: Vec3, to: Vec3) -> (Vec3, bool, bool) {
        let before = self.static_overlaps(id, &Posed::new(shape, from, rotation));
        let blocked = |p: Vec3| {
            self.static_overlaps(id, &Posed::new(shape, p, rotation))
                .iter()
                .any(|b| !before.contains(b))
        };

        if !blocked(to) {
            return (to, false, false);
        }
        let horizontal = Vec3::new(to.x, to.y, from.z);
        if !blocked(horizontal) {
            return (horizontal, false, true);
        }
        let vertical = Vec3::new(from.x, from.y, to.z);
        if !blocked(vertical) {
            return (vertical, true, false);
        }
        (from, true, true)
    }

    fn integrate(&self, id: BodyId, shape: &Shape, mut state: BodyState, dt: f32) -> BodyState {
        let (impulse, force) = state.take_pending();
        match state.kind {
            BodyKind::Static => return state,
            BodyKind::Kinematic => {
                state.position += state.linear_velocity * dt;
                integrate_rotation(&mut state, dt);
                return state;
            }
            BodyKind::Dynamic => {}
        }
        if state.sleeping {
            return state;
        }

        let inv_mass = if state.mass > 0.0 { 1.0 / state.mass } else { 0.0 };
        state.linear_velocity += impulse * inv_mass;
        state.linear_velocity += (force * inv_mass + self.gravity * state.gravity_scale) * dt;

        if self.supports(Capability::Damping) {
            state.linear_velocity /= 1.0 + state.linear_damping * dt;
            state.angular_velocity /= 1.0 + state.angular_damping * dt;
        }

        let target = state.position + state.linear_velocity * dt;
        let (reached, horizontal_blocked, vertical_blocked) =
            self.resolve_move(id, shape, state.rotation, state.position, target);
        state.position = reached;
        if horizontal_blocked {
            state.linear_velocity.x = 0.0;
            state.linear_velocity.y = 0.0;
        }
        if vertical_blocked {
            state.linear_velocity.z = 0.0;
        }
        integrate_rotation(&mut state, dt);
        state
    }
}

fn integrate_rotation(state: &mut BodyState, dt: f32) {
    if state.angular_velocity != Vec3::ZERO {
        state.rotation = (Quat::from_scaled_axis(state.angular_velocity * dt) * state.rotation).normalize();
    }
}

fn validate_shape(shape: &Shape) -> PhysicsResult<Shape> {
    match *shape {
        Shape::HalfSpace { normal, offset } => {
            let len = normal.length();
            if !(len.is_finite() && len > 1e-6) {
                return Err(PhysicsError::InvalidShape("half-space normal is zero".into()));
            }
            Ok(Shape::HalfSpace { normal: normal / len, offset: offset / len })
        }
        Shape::Cuboid { half_extents } => {
            if half_extents.cmple(Vec3::ZERO).any() {
                return Err(PhysicsError::InvalidShape(format!("non-positive half extents {half_extents}")));
            }
            Ok(*shape)
        }
        Shape::Capsule { radius, .. } => {
            if !(radius > 0.0) {
                return Err(PhysicsError::InvalidShape(format!("non-positive capsule radius {radius}")));
            }
            Ok(*shape)
        }
    }
}

// ── PhysicsWorld impl ─────────────────────────────────────────────────────────

impl PhysicsWorld for SimpleWorld {
    fn ray_cast_piercing(&self, ray: &Ray, mask: ContactMask, exclude: &[BodyId]) -> Vec<RayHit> {
        if ray.direction == Vec3::ZERO || ray.length < 0.0 {
            return Vec::new();
        }
        let mut hits: Vec<RayHit> = self
            .candidates(&ray.bounds(), false)
            .into_iter()
            .filter(|id| !exclude.contains(id))
            .filter_map(|id| {
                let slot = self.slot(id)?;
                if !slot.state.group.intersects(mask) {
                    return None;
                }
                let (distance, normal) = slot.posed().ray_hit(ray)?;
                Some(RayHit { position: ray.point_at(distance), normal, distance, body: id })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.body.cmp(&b.body)));
        hits
    }

    fn volume_cast(&self, volume: &Volume, mask: ContactMask, exclude: &[BodyId]) -> Vec<BodyId> {
        let query = Posed::from_volume(volume);
        self.candidates(&volume.bounds(), false)
            .into_iter()
            .filter(|id| !exclude.contains(id))
            .filter(|&id| {
                self.slot(id)
                    .is_some_and(|s| s.state.group.intersects(mask) && s.posed().overlaps(&query))
            })
            .collect()
    }

    fn body(&self, id: BodyId) -> Option<&BodyState> {
        self.slot(id).map(|s| &s.state)
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut BodyState> {
        self.slots.get_mut(id.index()).and_then(|s| s.as_mut()).map(|s| &mut s.state)
    }

    fn insert_body(&mut self, desc: BodyDesc) -> PhysicsResult<BodyId> {
        let shape = validate_shape(&desc.shape)?;
        let id = BodyId::try_from(self.slots.len())
            .map_err(|_| PhysicsError::InvalidShape("body id space exhausted".into()))?;
        let state = BodyState::from_desc(&desc);
        let is_static = state.is_static();
        self.slots.push(Some(Slot { state, shape }));

        if is_static {
            let posed = Posed::new(&shape, desc.position, desc.rotation);
            match posed.bounds() {
                Some(b) => self.static_index.insert(StaticEntry::new(b, id)),
                None => self.unbounded.push(id),
            }
        }
        log::trace!("inserted {id} ({:?})", desc.kind);
        Ok(id)
    }

    fn remove_body(&mut self, id: BodyId) -> PhysicsResult<BodyState> {
        let slot = self
            .slots
            .get_mut(id.index())
            .and_then(|s| s.take())
            .ok_or(PhysicsError::BodyNotFound(id))?;
        if slot.state.is_static() {
            self.rebuild_static_index();
        }
        Ok(slot.state)
    }

    fn set_shape(&mut self, id: BodyId, shape: Shape) -> PhysicsResult<()> {
        if !self.supports(Capability::ShapeChange) {
            return Err(PhysicsError::Unsupported(Capability::ShapeChange));
        }
        let shape = validate_shape(&shape)?;
        let slot = self
            .slots
            .get_mut(id.index())
            .and_then(|s| s.as_mut())
            .ok_or(PhysicsError::BodyNotFound(id))?;
        slot.shape = shape;
        if slot.state.is_static() {
            self.rebuild_static_index();
        }
        Ok(())
    }

    fn supports(&self, capability: Capability) -> bool {
        !self.unsupported.contains(&capability)
    }

    fn step(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        for i in 0..self.slots.len() {
            let id = BodyId(i as u32);
            let Some((state, shape)) = self.slots[i].as_ref().map(|s| (s.state.clone(), s.shape)) else {
                continue;
            };
            let next = self.integrate(id, &shape, state, dt);
            if let Some(slot) = self.slots[i].as_mut() {
                slot.state = next;
            }
        }
    }
}
