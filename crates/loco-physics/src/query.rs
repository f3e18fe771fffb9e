//! World-space query primitives shared by every physics backend.

use glam::Vec3;

use loco_core::BodyId;

// ── Capsule ───────────────────────────────────────────────────────────────────

/// A world-space capsule: the set of points within `radius` of the segment
/// `start → end`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capsule {
    pub start:  Vec3,
    pub end:    Vec3,
    pub radius: f32,
}

impl Capsule {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Vertical capsule whose lowest point is `bottom` and whose total height
    /// (tip to tip) is `height`.
    pub fn upright(bottom: Vec3, height: f32, radius: f32) -> Self {
        let start = bottom + Vec3::Z * radius;
        let end = bottom + Vec3::Z * (height - radius).max(radius);
        Self { start, end, radius }
    }

    #[inline]
    pub fn translated(&self, offset: Vec3) -> Capsule {
        Capsule { start: self.start + offset, end: self.end + offset, radius: self.radius }
    }

    #[inline]
    pub fn with_radius_scale(&self, scale: f32) -> Capsule {
        Capsule { radius: self.radius * scale, ..*self }
    }

    /// The segment endpoint with the lower Z (centre of the bottom hemisphere).
    #[inline]
    pub fn lower_endpoint(&self) -> Vec3 {
        if self.start.z <= self.end.z { self.start } else { self.end }
    }

    /// Axis-aligned bounds.
    pub fn bounds(&self) -> Bounds {
        let r = Vec3::splat(self.radius);
        Bounds { min: self.start.min(self.end) - r, max: self.start.max(self.end) + r }
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// A world-space axis-aligned box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }
}

/// Shape accepted by [`PhysicsWorld::volume_cast`](crate::PhysicsWorld::volume_cast).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Volume {
    Capsule(Capsule),
    Bounds(Bounds),
}

impl Volume {
    pub fn bounds(&self) -> Bounds {
        match self {
            Volume::Capsule(c) => c.bounds(),
            Volume::Bounds(b) => *b,
        }
    }
}

// ── Rays ──────────────────────────────────────────────────────────────────────

/// A finite ray.  `direction` is normalized on construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin:    Vec3,
    pub direction: Vec3,
    pub length:    f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3, length: f32) -> Self {
        Self { origin, direction: direction.normalize_or_zero(), length }
    }

    /// Ray from `from` to `to`.
    pub fn between(from: Vec3, to: Vec3) -> Self {
        let d = to - from;
        Self::new(from, d, d.length())
    }

    #[inline]
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.origin, self.point_at(self.length))
    }
}

/// One intersection reported by a piercing ray cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    pub position: Vec3,
    /// Outward surface normal, unit length.
    pub normal:   Vec3,
    pub distance: f32,
    pub body:     BodyId,
}

// ── Filtering ─────────────────────────────────────────────────────────────────

/// Collision-group bitmask.  A query only sees bodies whose group intersects
/// the query mask.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactMask(pub u32);

impl ContactMask {
    pub const NONE:      ContactMask = ContactMask(0);
    pub const STATIC:    ContactMask = ContactMask(1 << 0);
    pub const DYNAMIC:   ContactMask = ContactMask(1 << 1);
    pub const CHARACTER: ContactMask = ContactMask(1 << 2);
    pub const ALL:       ContactMask = ContactMask(u32::MAX);

    #[inline]
    pub fn intersects(self, other: ContactMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for ContactMask {
    type Output = ContactMask;
    fn bitor(self, rhs: ContactMask) -> ContactMask {
        ContactMask(self.0 | rhs.0)
    }
}

impl Default for ContactMask {
    fn default() -> Self {
        ContactMask::ALL
    }
}

/// Optional backend features a controller may ask about before relying on
/// them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Capability {
    /// Bodies can be put to sleep and woken.
    Sleep,
    /// Colliders can be replaced at runtime with `set_shape`.
    ShapeChange,
    /// Per-body linear/angular damping is honoured.
    Damping,
}
