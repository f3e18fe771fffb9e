//! Character shape and tuning.

use glam::Vec3;

use loco_physics::{Capsule, ContactMask, Shape};

use crate::{MotionError, MotionResult};

/// Probe and resolver queries use radii shrunk by this factor so a capsule
/// resting exactly on a surface does not count as overlapping it.
pub const QUERY_RADIUS_SCALE: f32 = 0.99;

// ── CapsuleShape ──────────────────────────────────────────────────────────────

/// One collision form of a character (standing or crouched).
///
/// The character position sits `position_to_floor` above the feet.  The
/// query capsule spans the full `height` from the feet; the physics collider
/// starts `walk_up_height` above the feet so ledges up to that height never
/// block it and are left to the climb resolver.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapsuleShape {
    pub height:            f32,
    pub radius:            f32,
    pub walk_up_height:    f32,
    pub position_to_floor: f32,
}

impl CapsuleShape {
    pub const STANDING: CapsuleShape =
        CapsuleShape { height: 1.8, radius: 0.4, walk_up_height: 0.5, position_to_floor: 1.15 };

    pub const CROUCHED: CapsuleShape =
        CapsuleShape { height: 1.2, radius: 0.4, walk_up_height: 0.3, position_to_floor: 0.8 };

    /// Length of the collider's inner segment.
    #[inline]
    pub fn segment_length(&self) -> f32 {
        self.height - 2.0 * self.radius - self.walk_up_height
    }

    pub fn validate(&self) -> MotionResult<()> {
        if !(self.radius > 0.0) {
            return Err(MotionError::NonPositiveRadius(self.radius));
        }
        if self.segment_length() < 0.0 {
            return Err(MotionError::NegativeSegment {
                height:         self.height,
                radius:         self.radius,
                walk_up_height: self.walk_up_height,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn feet(&self, position: Vec3) -> Vec3 {
        position - Vec3::Z * self.position_to_floor
    }

    /// Full-height capsule used by the probe and the climb resolver.
    pub fn query_capsule(&self, position: Vec3) -> Capsule {
        Capsule::upright(self.feet(position), self.height, self.radius).with_radius_scale(QUERY_RADIUS_SCALE)
    }

    /// World-space copy of the physics collider at `position`.
    pub fn body_capsule(&self, position: Vec3) -> Capsule {
        let feet = self.feet(position);
        Capsule::new(
            feet + Vec3::Z * (self.walk_up_height + self.radius),
            feet + Vec3::Z * (self.height - self.radius),
            self.radius,
        )
    }

    /// The physics collider in the body's local frame.
    pub fn body_shape(&self) -> Shape {
        let lift = self.walk_up_height + self.radius - self.position_to_floor;
        Shape::Capsule {
            a:      Vec3::Z * lift,
            b:      Vec3::Z * (self.height - self.radius - self.position_to_floor),
            radius: self.radius,
        }
    }
}

impl Default for CapsuleShape {
    fn default() -> Self {
        Self::STANDING
    }
}

// ── Damping and quirks ────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DampingConfig {
    pub airborne:           f32,
    pub grounded:           f32,
    /// Grounded damping used when `BackendQuirks::alternate_ground_damping` is set.
    pub grounded_alternate: f32,
}

impl Default for DampingConfig {
    fn default() -> Self {
        Self { airborne: 0.15, grounded: 5.0, grounded_alternate: 10.0 }
    }
}

/// Workarounds for physics backends that misbehave in specific ways.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackendQuirks {
    pub alternate_ground_damping: bool,
    /// Force sleep when position and velocity are bit-identical between
    /// ticks but the sleep policy did not trigger.
    pub zero_velocity_stall:      bool,
}

// ── CharacterConfig ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CharacterConfig {
    pub standing:          CapsuleShape,
    pub crouched:          CapsuleShape,
    pub mass:              f32,
    /// Steepest walkable surface, in degrees from flat.
    pub max_slope_deg:     f32,

    pub run_speed:         f32,
    pub walk_speed:        f32,
    pub crouch_speed:      f32,
    /// Horizontal speed reachable while airborne.
    pub fly_speed:         f32,
    pub ground_accel:      f32,
    pub air_accel:         f32,
    pub jump_speed:        f32,

    /// Below this horizontal speed a grounded, idle character may sleep.
    pub min_sleep_speed:   f32,
    /// Seconds for the visual crouch blend to go 0 → 1.
    pub crouch_blend_time: f32,

    pub damping:           DampingConfig,
    pub quirks:            BackendQuirks,
    /// Groups the probe and resolver collide with.
    pub ground_mask:       ContactMask,
}

impl CharacterConfig {
    pub fn validate(&self) -> MotionResult<()> {
        self.standing.validate()?;
        self.crouched.validate()
    }

    #[inline]
    pub fn max_slope(&self) -> f32 {
        self.max_slope_deg.to_radians()
    }

    pub fn shape(&self, crouched: bool) -> &CapsuleShape {
        if crouched { &self.crouched } else { &self.standing }
    }
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            standing:          CapsuleShape::STANDING,
            crouched:          CapsuleShape::CROUCHED,
            mass:              80.0,
            max_slope_deg:     45.0,
            run_speed:         6.0,
            walk_speed:        2.5,
            crouch_speed:      1.5,
            fly_speed:         2.0,
            ground_accel:      40.0,
            air_accel:         8.0,
            jump_speed:        5.0,
            min_sleep_speed:   0.05,
            crouch_blend_time: 0.25,
            damping:           DampingConfig::default(),
            quirks:            BackendQuirks::default(),
            ground_mask:       ContactMask::ALL,
        }
    }
}
