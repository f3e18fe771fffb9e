//! Ground contact probe: sweep down, then fan rays to classify the surface.
//!
//! The sweep finds how far the character could drop before touching
//! anything.  The ray fan then starts from the lower hemisphere centre at that
//! contact and looks for the first surface flatter than the slope limit.  When
//! only steep surfaces are found their horizontal normals combine into an
//! anti-slide push.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;

use loco_core::BodyId;
use loco_core::math::{flat, slope_angle};
use loco_physics::{PhysicsWorld, Ray};

use crate::sweep::Sweep;
use crate::CapsuleShape;
use crate::CharacterConfig;

/// Ground distance reported when nothing walkable is below.
pub const AIRBORNE_DISTANCE: f32 = 1.0e6;

/// Tilt bands of the ray fan.  Band `i` is tilted `i · 90° / BANDS` from
/// straight down.
const BANDS: usize = 8;
/// Horizontal directions per tilted band.
const DIRECTIONS: usize = 16;
/// Fan ray length as a multiple of the capsule radius.
const RAY_LENGTH_FACTOR: f32 = 1.3;
/// Sweep length as a multiple of the capsule height.
const SWEEP_DEPTH_FACTOR: f32 = 1.5;

/// Fresh per-tick probe result.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundContact {
    /// Distance from the character position down to the ground.
    pub distance:         f32,
    pub body:             Option<BodyId>,
    /// Horizontal anti-slide push (zero unless only steep surfaces were hit).
    pub push:             Vec3,
    /// How far the capsule dropped before touching, when the sweep blocked.
    pub collision_offset: Option<f32>,
}

impl GroundContact {
    pub fn airborne() -> Self {
        Self { distance: AIRBORNE_DISTANCE, body: None, push: Vec3::ZERO, collision_offset: None }
    }

    /// The capsule was already touching geometry before dropping at all.
    #[inline]
    pub fn embedded(&self) -> bool {
        self.collision_offset == Some(0.0)
    }
}

impl Default for GroundContact {
    fn default() -> Self {
        Self::airborne()
    }
}

/// Unit directions of the fan in cast order: straight down first, then each
/// tilted band sweeping all the way round.
pub fn fan_directions() -> Vec<Vec3> {
    let mut out = Vec::with_capacity(1 + (BANDS - 1) * DIRECTIONS);
    out.push(Vec3::NEG_Z);
    for band in 1..BANDS {
        let tilt = band as f32 * FRAC_PI_2 / BANDS as f32;
        let (sin_t, cos_t) = tilt.sin_cos();
        for j in 0..DIRECTIONS {
            let azimuth = j as f32 * TAU / DIRECTIONS as f32;
            let (sin_a, cos_a) = azimuth.sin_cos();
            out.push(Vec3::new(sin_t * cos_a, sin_t * sin_a, -cos_t));
        }
    }
    out
}

/// Probe the ground under a character at `position` using `shape`.
pub fn probe_ground<W: PhysicsWorld + ?Sized>(
    world:    &W,
    config:   &CharacterConfig,
    shape:    &CapsuleShape,
    position: Vec3,
    exclude:  &[BodyId],
) -> GroundContact {
    let capsule = shape.query_capsule(position);
    let sweep = Sweep {
        capsules:        std::slice::from_ref(&capsule),
        displacement:    Vec3::NEG_Z * (SWEEP_DEPTH_FACTOR * shape.height),
        step:            shape.radius / 2.0,
        first_iteration: true,
        mask:            config.ground_mask,
        exclude,
    }
    .run(world);

    if !sweep.blocked {
        return GroundContact::airborne();
    }

    let offset = sweep.distance;
    let origin = capsule.lower_endpoint() - Vec3::Z * offset;
    let length = RAY_LENGTH_FACTOR * capsule.radius;
    let max_slope = config.max_slope();

    let mut steep_normals = Vec3::ZERO;
    let mut steep_hits = 0usize;
    for dir in fan_directions() {
        let ray = Ray::new(origin, dir, length);
        for hit in world.ray_cast_piercing(&ray, config.ground_mask, exclude) {
            if slope_angle(hit.normal) < max_slope {
                return GroundContact {
                    distance:         shape.position_to_floor + offset,
                    body:             Some(hit.body),
                    push:             Vec3::ZERO,
                    collision_offset: Some(offset),
                };
            }
            steep_normals += flat(hit.normal);
            steep_hits += 1;
        }
    }

    let push = if steep_hits > 0 {
        steep_normals.normalize_or_zero() * (2.0 * config.mass)
    } else {
        Vec3::ZERO
    };
    GroundContact { distance: AIRBORNE_DISTANCE, body: None, push, collision_offset: Some(offset) }
}
