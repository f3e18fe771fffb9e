//! Narrowphase geometry for [`SimpleWorld`](crate::SimpleWorld).
//!
//! Only the pairs the locomotion layer needs: capsule/box volumes against
//! half-spaces, oriented boxes and capsules, plus rays against the same three
//! collider kinds.  Overlap tests are strict (touching is not overlapping).

use glam::{Quat, Vec3};

use crate::{Bounds, Capsule, Ray, Shape, Volume};

const EPS: f32 = 1e-6;

/// Iterations of the ternary search in [`segment_box_distance`].
const TERNARY_STEPS: usize = 48;

// ── Posed collider ────────────────────────────────────────────────────────────

/// A collider transformed into world space.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Posed {
    HalfSpace { normal: Vec3, offset: f32 },
    Box { center: Vec3, rotation: Quat, half: Vec3 },
    Capsule(Capsule),
}

impl Posed {
    pub(crate) fn new(shape: &Shape, position: Vec3, rotation: Quat) -> Self {
        match *shape {
            Shape::HalfSpace { normal, offset } => {
                let n = (rotation * normal).normalize_or_zero();
                Posed::HalfSpace { normal: n, offset: offset + n.dot(position) }
            }
            Shape::Cuboid { half_extents } => {
                Posed::Box { center: position, rotation, half: half_extents }
            }
            Shape::Capsule { a, b, radius } => Posed::Capsule(Capsule::new(
                position + rotation * a,
                position + rotation * b,
                radius,
            )),
        }
    }

    /// World bounds, or `None` for unbounded colliders.
    pub(crate) fn bounds(&self) -> Option<Bounds> {
        match *self {
            Posed::HalfSpace { .. } => None,
            Posed::Box { center, rotation, half } => {
                let ext = box_world_extent(rotation, half);
                Some(Bounds::new(center - ext, center + ext))
            }
            Posed::Capsule(c) => Some(c.bounds()),
        }
    }

    pub(crate) fn from_volume(volume: &Volume) -> Self {
        match *volume {
            Volume::Capsule(c) => Posed::Capsule(c),
            Volume::Bounds(b) => Posed::Box { center: b.center(), rotation: Quat::IDENTITY, half: b.half_extents() },
        }
    }

    /// `true` if the two colliders share interior points.
    pub(crate) fn overlaps(&self, other: &Posed) -> bool {
        use Posed::{Box, Capsule, HalfSpace};
        match (*self, *other) {
            (HalfSpace { normal, offset }, o) | (o, HalfSpace { normal, offset }) => {
                o.reaches_below(normal, offset)
            }
            (Box { center: c1, rotation: r1, half: h1 }, Box { center: c2, rotation: r2, half: h2 }) => {
                boxes_overlap(c1, r1, h1, c2, r2, h2)
            }
            (Box { center, rotation, half }, Capsule(c)) | (Capsule(c), Box { center, rotation, half }) => {
                segment_box_distance(c.start, c.end, center, rotation, half) < c.radius
            }
            (Capsule(a), Capsule(b)) => {
                let r = a.radius + b.radius;
                segment_segment_distance_sq(a.start, a.end, b.start, b.end) < r * r
            }
        }
    }

    /// `true` if some point of `self` lies strictly inside `normal · p ≤ offset`.
    fn reaches_below(&self, normal: Vec3, offset: f32) -> bool {
        match *self {
            Posed::HalfSpace { .. } => true,
            Posed::Box { center, rotation, half } => {
                let local = rotation.inverse() * normal;
                normal.dot(center) - local.abs().dot(half) < offset
            }
            Posed::Capsule(c) => normal.dot(c.start).min(normal.dot(c.end)) - c.radius < offset,
        }
    }

    /// First intersection of `ray` with this collider as `(distance, normal)`.
    ///
    /// A ray starting inside the collider hits at distance 0.
    pub(crate) fn ray_hit(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        let hit = match *self {
            Posed::HalfSpace { normal, offset } => ray_half_space(ray, normal, offset),
            Posed::Box { center, rotation, half } => ray_box(ray, center, rotation, half),
            Posed::Capsule(c) => ray_capsule(ray, &c),
        }?;
        (hit.0 <= ray.length).then_some(hit)
    }
}

fn box_world_extent(rotation: Quat, half: Vec3) -> Vec3 {
    let (x, y, z) = (rotation * Vec3::X, rotation * Vec3::Y, rotation * Vec3::Z);
    x.abs() * half.x + y.abs() * half.y + z.abs() * half.z
}

// ── Distances ─────────────────────────────────────────────────────────────────

/// Distance from a box-local point to the box `[-half, half]`.
#[inline]
fn point_box_distance(local: Vec3, half: Vec3) -> f32 {
    (local.abs() - half).max(Vec3::ZERO).length()
}

/// Minimum distance between segment `a → b` and an oriented box.
///
/// Distance to a convex set is convex along a line, so a ternary search over
/// the segment parameter converges to the minimum.
pub(crate) fn segment_box_distance(a: Vec3, b: Vec3, center: Vec3, rotation: Quat, half: Vec3) -> f32 {
    let inv = rotation.inverse();
    let la = inv * (a - center);
    let lb = inv * (b - center);
    let at = |t: f32| point_box_distance(la.lerp(lb, t), half);

    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    for _ in 0..TERNARY_STEPS {
        let m1 = lo + (hi - lo) / 3.0;
        let m2 = hi - (hi - lo) / 3.0;
        if at(m1) <= at(m2) {
            hi = m2;
        } else {
            lo = m1;
        }
    }
    at(0.5 * (lo + hi)).min(at(0.0)).min(at(1.0))
}

/// Squared distance between segments `p1 → q1` and `p2 → q2`.
pub(crate) fn segment_segment_distance_sq(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> f32 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.dot(d1);
    let e = d2.dot(d2);
    let f = d2.dot(r);

    let (s, t);
    if a <= EPS && e <= EPS {
        return r.length_squared();
    }
    if a <= EPS {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(r);
        if e <= EPS {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s0 = if denom > EPS { ((b * f - c * e) / denom).clamp(0.0, 1.0) } else { 0.0 };
            let mut t0 = (b * s0 + f) / e;
            if t0 < 0.0 {
                t0 = 0.0;
                s0 = (-c / a).clamp(0.0, 1.0);
            } else if t0 > 1.0 {
                t0 = 1.0;
                s0 = ((b - c) / a).clamp(0.0, 1.0);
            }
            s = s0;
            t = t0;
        }
    }
    let c1 = p1 + d1 * s;
    let c2 = p2 + d2 * t;
    c1.distance_squared(c2)
}

/// Separating-axis test for two oriented boxes.
pub(crate) fn boxes_overlap(c1: Vec3, r1: Quat, h1: Vec3, c2: Vec3, r2: Quat, h2: Vec3) -> bool {
    let a = [r1 * Vec3::X, r1 * Vec3::Y, r1 * Vec3::Z];
    let b = [r2 * Vec3::X, r2 * Vec3::Y, r2 * Vec3::Z];
    let d = c2 - c1;

    let separated = |axis: Vec3| {
        if axis.length_squared() < EPS {
            return false;
        }
        let axis = axis.normalize();
        let ra = a[0].dot(axis).abs() * h1.x + a[1].dot(axis).abs() * h1.y + a[2].dot(axis).abs() * h1.z;
        let rb = b[0].dot(axis).abs() * h2.x + b[1].dot(axis).abs() * h2.y + b[2].dot(axis).abs() * h2.z;
        d.dot(axis).abs() >= ra + rb
    };

    for axis in a.iter().chain(b.iter()) {
        if separated(*axis) {
            return false;
        }
    }
    for i in &a {
        for j in &b {
            if separated(i.cross(*j)) {
                return false;
            }
        }
    }
    true
}

// ── Rays ──────────────────────────────────────────────────────────────────────

fn ray_half_space(ray: &Ray, normal: Vec3, offset: f32) -> Option<(f32, Vec3)> {
    let s = normal.dot(ray.origin) - offset;
    if s <= 0.0 {
        return Some((0.0, normal));
    }
    let denom = normal.dot(ray.direction);
    if denom >= -EPS {
        return None;
    }
    Some((-s / denom, normal))
}

fn ray_box(ray: &Ray, center: Vec3, rotation: Quat, half: Vec3) -> Option<(f32, Vec3)> {
    let inv = rotation.inverse();
    let o = inv * (ray.origin - center);
    let d = inv * ray.direction;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut entry_normal = Vec3::ZERO;

    for axis in 0..3 {
        let (oa, da, ha) = (o[axis], d[axis], half[axis]);
        if da.abs() < EPS {
            if oa < -ha || oa > ha {
                return None;
            }
            continue;
        }
        let inv_d = 1.0 / da;
        let mut t1 = (-ha - oa) * inv_d;
        let mut t2 = (ha - oa) * inv_d;
        let mut n = Vec3::ZERO;
        n[axis] = -da.signum();
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        if t1 > t_min {
            t_min = t1;
            entry_normal = n;
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    if t_min < 0.0 {
        return Some((0.0, -ray.direction));
    }
    Some((t_min, rotation * entry_normal))
}

fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let m = ray.origin - center;
    let b = m.dot(ray.direction);
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    Some(-b - disc.sqrt())
}

fn ray_capsule(ray: &Ray, capsule: &Capsule) -> Option<(f32, Vec3)> {
    let (a, b, r) = (capsule.start, capsule.end, capsule.radius);
    let axis = b - a;
    let axis_len_sq = axis.length_squared();

    let closest_on_axis = |p: Vec3| {
        if axis_len_sq <= EPS {
            return a;
        }
        let t = ((p - a).dot(axis) / axis_len_sq).clamp(0.0, 1.0);
        a + axis * t
    };

    if ray.origin.distance_squared(closest_on_axis(ray.origin)) <= r * r {
        return Some((0.0, -ray.direction));
    }

    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t >= 0.0 && best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    consider(ray_sphere(ray, a, r).unwrap_or(f32::INFINITY));
    consider(ray_sphere(ray, b, r).unwrap_or(f32::INFINITY));

    // Cylinder body between the caps.
    if axis_len_sq > EPS {
        let m = ray.origin - a;
        let n = ray.direction;
        let md = m.dot(axis);
        let nd = n.dot(axis);
        let qa = axis_len_sq - nd * nd;
        if qa.abs() > EPS {
            let qb = axis_len_sq * m.dot(n) - nd * md;
            let qc = axis_len_sq * (m.length_squared() - r * r) - md * md;
            let disc = qb * qb - qa * qc;
            if disc >= 0.0 {
                let t = (-qb - disc.sqrt()) / qa;
                let s = md + t * nd;
                if (0.0..=axis_len_sq).contains(&s) {
                    consider(t);
                }
            }
        }
    }

    let t = best.filter(|t| t.is_finite())?;
    let p = ray.point_at(t);
    let normal = (p - closest_on_axis(p)).normalize_or_zero();
    Some((t, normal))
}
