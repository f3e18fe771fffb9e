//! Per-character locomotion controller.
//!
//! # Tick order
//!
//! [`LocomotionController::tick`] runs once per simulation step, before the
//! physics step:
//!
//! 1. wake a sleeping character whose ground moves, or that has input;
//! 2. probe the ground and evaluate the on-ground predicate;
//! 3. choose damping (airborne or grounded);
//! 4. grounded: zero spin and climb any step ahead of the steering vector;
//! 5. apply the anti-slide push;
//! 6. grounded on a moving body: inherit its velocity;
//! 7. steer toward `move_vector × side_speed` relative to the ground;
//! 8. ground support: cancel gravity and snap onto the surface;
//! 9. fire a buffered jump;
//! 10. sleep policy.
//!
//! All changes are written back to the body in one go at the end.

use glam::{Quat, Vec3};

use loco_core::math::{flat, yaw_towards};
use loco_core::BodyId;
use loco_physics::{BodyState, Capability, PhysicsWorld, Volume};

use crate::climb::climb_height;
use crate::probe::{probe_ground, GroundContact};
use crate::timers::{CROUCH_LOCK_SECS, GRACE_SECS, JUMP_BUFFER_SECS, JUMP_COOLDOWN_SECS};
use crate::{CapsuleShape, CharacterConfig, LocomotionTimers, MotionError, MotionResult};

/// The climb resolver looks this many seconds of full-speed travel ahead.
pub const CLIMB_LOOKAHEAD_SECS: f32 = 0.15;
/// Ground distance error below which no snap happens.  Step lifts at or
/// below this are left to ground support as well.
pub const GROUND_SNAP_TOLERANCE: f32 = 0.05;
/// Slack above `position_to_floor` within which the character still counts
/// as grounded.
pub const GROUND_SLACK: f32 = 0.2;
/// Share of a moving ground body's velocity added every tick.
pub const GROUND_VELOCITY_SHARE: f32 = 0.25;

const JUMP_NUDGE: f32 = 0.05;
/// Ground bodies slower than this do not wake a sleeping character.
const WAKE_SPEED: f32 = 0.01;
/// Idle time before sleeping, in ticks.
const SLEEP_DELAY_TICKS: f32 = 2.5;
/// Exponential smoothing rate of the ground-relative velocity, per second.
const SMOOTHING_RATE: f32 = 10.0;

// ── Persisted state ───────────────────────────────────────────────────────────

/// What survives a save/load of a character's locomotion.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocomotionSnapshot {
    pub ground_distance: f32,
    pub timers:          LocomotionTimers,
    pub crouched:        bool,
    pub crouch_blend:    f32,
    pub last_velocity:   Vec3,
}

// ── LocomotionController ──────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct LocomotionController {
    pub config: CharacterConfig,
    pub timers: LocomotionTimers,

    contact:      GroundContact,
    on_ground:    bool,
    move_vector:  Vec3,
    walking:      bool,
    crouched:     bool,
    crouch_blend: f32,
    facing:       Option<Quat>,

    relative_velocity: Vec3,
    smoothed_velocity: Vec3,
    last_position:     Vec3,
    last_velocity:     Vec3,

    /// Set when the configured capsules are invalid; `tick` does nothing.
    degraded: bool,
    warned:   Vec<Capability>,
}

impl LocomotionController {
    /// Build a controller.  An invalid capsule configuration is logged and
    /// yields a degraded controller that skips every tick.
    pub fn new(config: CharacterConfig) -> Self {
        let degraded = match config.validate() {
            Ok(()) => false,
            Err(e) => {
                log::error!("invalid character capsule, locomotion disabled: {e}");
                true
            }
        };
        Self {
            config,
            timers: LocomotionTimers::default(),
            contact: GroundContact::airborne(),
            on_ground: false,
            move_vector: Vec3::ZERO,
            walking: false,
            crouched: false,
            crouch_blend: 0.0,
            facing: None,
            relative_velocity: Vec3::ZERO,
            smoothed_velocity: Vec3::ZERO,
            last_position: Vec3::NAN,
            last_velocity: Vec3::ZERO,
            degraded,
            warned: Vec::new(),
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The active collision form.
    pub fn shape(&self) -> &CapsuleShape {
        self.config.shape(self.crouched)
    }

    /// Result of the most recent probe.
    pub fn contact(&self) -> &GroundContact {
        &self.contact
    }

    pub fn ground_distance(&self) -> f32 {
        self.contact.distance
    }

    /// On-ground state as of the last tick.
    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    /// Seconds since the character last counted as grounded (0 while grounded).
    pub fn elapsed_since_ground_contact(&self) -> f32 {
        self.timers.time_not_on_ground
    }

    /// Velocity relative to the supporting body, as of the last tick.
    pub fn ground_relative_velocity(&self) -> Vec3 {
        self.relative_velocity
    }

    pub fn smoothed_ground_relative_velocity(&self) -> Vec3 {
        self.smoothed_velocity
    }

    pub fn move_vector(&self) -> Vec3 {
        self.move_vector
    }

    pub fn is_crouched(&self) -> bool {
        self.crouched
    }

    /// Visual crouch factor in `[0, 1]`.
    pub fn crouch_blend(&self) -> f32 {
        self.crouch_blend
    }

    /// Apply the on-ground predicate to `contact` with the current timers.
    pub fn evaluates_on_ground(&self, contact: &GroundContact) -> bool {
        if self.timers.jump_cooling_down() {
            return false;
        }
        if self.timers.in_grace() {
            return true;
        }
        contact.distance - GROUND_SLACK < self.shape().position_to_floor && contact.body.is_some()
    }

    /// Horizontal speed the steering vector is scaled by.
    pub fn side_speed(&self) -> f32 {
        if !self.on_ground {
            self.config.fly_speed
        } else if self.crouched {
            self.config.crouch_speed
        } else if self.walking {
            self.config.walk_speed
        } else {
            self.config.run_speed
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Desired horizontal direction, length clamped to 1.
    pub fn set_move_vector(&mut self, v: Vec3) {
        self.move_vector = flat(v).clamp_length_max(1.0);
    }

    pub fn set_walking(&mut self, walking: bool) {
        self.walking = walking;
    }

    /// Buffer a jump; it fires on the next tick the character may jump.
    pub fn request_jump(&mut self) {
        self.timers.jump_buffer = JUMP_BUFFER_SECS;
    }

    /// Face `direction` (horizontal part only) from the next tick on.
    pub fn turn_to(&mut self, direction: Vec3) {
        if let Some(yaw) = yaw_towards(direction) {
            self.facing = Some(yaw);
        }
    }

    /// Switch between standing and crouched.  Returns `false` when the
    /// change is locked or the destination capsule would overlap geometry.
    pub fn set_crouch<W: PhysicsWorld + ?Sized>(
        &mut self,
        crouch: bool,
        body:   BodyId,
        world:  &mut W,
    ) -> MotionResult<bool> {
        if crouch == self.crouched {
            return Ok(true);
        }
        if self.degraded || self.timers.crouch_lock > 0.0 {
            return Ok(false);
        }

        let position = world.body(body).ok_or(MotionError::BodyNotFound(body))?.position;
        let from = *self.shape();
        let to = *self.config.shape(crouch);
        let new_position = from.feet(position) + Vec3::Z * to.position_to_floor;

        let dest = Volume::Capsule(to.body_capsule(new_position));
        let blockers = world.volume_cast(&dest, self.config.ground_mask, &[body]);
        if !blockers.is_empty() {
            log::debug!("{body}: crouch={crouch} rejected, blocked by {blockers:?}");
            return Ok(false);
        }

        if self.supports(&*world, Capability::ShapeChange) {
            world.set_shape(body, to.body_shape())?;
        }
        world.body_mut(body).ok_or(MotionError::BodyNotFound(body))?.position = new_position;
        self.crouched = crouch;
        self.timers.crouch_lock = CROUCH_LOCK_SECS;
        Ok(true)
    }

    /// Probe the ground under `body` without advancing any state.
    pub fn probe<W: PhysicsWorld + ?Sized>(&self, body: BodyId, world: &W) -> MotionResult<GroundContact> {
        let position = world.body(body).ok_or(MotionError::BodyNotFound(body))?.position;
        Ok(probe_ground(world, &self.config, self.shape(), position, &[body]))
    }

    /// Vertical lift needed to move `body` by `move_offset`.
    pub fn climb<W: PhysicsWorld + ?Sized>(&self, body: BodyId, world: &W, move_offset: Vec3) -> MotionResult<f32> {
        let position = world.body(body).ok_or(MotionError::BodyNotFound(body))?.position;
        Ok(climb_height(world, &self.config, self.shape(), position, move_offset, &[body]))
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    pub fn tick<W: PhysicsWorld + ?Sized>(&mut self, body: BodyId, world: &mut W, dt: f32) -> MotionResult<()> {
        if self.degraded || !(dt > 0.0) {
            return Ok(());
        }
        self.timers.count_down(dt);
        self.advance_crouch_blend(dt);

        let state = world.body(body).ok_or(MotionError::BodyNotFound(body))?.clone();
        let stalled = state.position == self.last_position && state.linear_velocity == self.last_velocity;
        self.last_position = state.position;
        self.last_velocity = state.linear_velocity;

        let shape = *self.shape();
        let exclude = [body];
        let mut position = state.position;
        let mut velocity = state.linear_velocity;
        let mut angular_velocity = state.angular_velocity;

        // 1. Wake.
        let mut sleeping = state.sleeping;
        if sleeping && (self.move_vector != Vec3::ZERO || self.timers.jump_buffer > 0.0 || self.ground_moving(&*world)) {
            log::trace!("{body}: woken");
            sleeping = false;
        }

        // 2. Probe.
        self.contact = probe_ground(&*world, &self.config, &shape, position, &exclude);
        self.on_ground = self.evaluates_on_ground(&self.contact);
        self.timers.record_contact(self.on_ground, dt);
        if !self.on_ground {
            sleeping = false;
        }

        let ground = self.contact.body.and_then(|id| world.body(id));
        let ground_velocity = ground.filter(|g| !g.is_static()).map_or(Vec3::ZERO, |g| g.linear_velocity);
        let ground_moving = ground.is_some_and(|g| !g.is_static() && !g.sleeping);
        let ground_still = ground.is_none_or(|g| g.is_static() || g.sleeping);

        if sleeping {
            self.record_relative_velocity(Vec3::ZERO, dt);
            return Ok(());
        }

        let jump_now = self.timers.jump_buffer > 0.0
            && self.on_ground
            && self.timers.time_on_ground > dt
            && !self.timers.jump_cooling_down();

        // 3. Damping.
        let damping = if !self.on_ground || jump_now {
            self.config.damping.airborne
        } else if self.config.quirks.alternate_ground_damping {
            self.config.damping.grounded_alternate
        } else {
            self.config.damping.grounded
        };

        // 4. Spin and step climbing.
        if self.on_ground {
            angular_velocity = Vec3::ZERO;
            if self.move_vector != Vec3::ZERO && !self.timers.in_grace() {
                let offset = self.move_vector * self.side_speed() * CLIMB_LOOKAHEAD_SECS;
                let lift = climb_height(&*world, &self.config, &shape, position, offset, &exclude);
                if lift > GROUND_SNAP_TOLERANCE && lift <= shape.walk_up_height {
                    log::trace!("{body}: stepping up {lift:.3}");
                    position.z += lift;
                    self.timers.grace = GRACE_SECS;
                }
            }
        }

        // 5. Anti-slide push, spread over one second of ticks.
        let mut impulse = self.contact.push * dt;

        // 6. Moving ground.
        if self.on_ground && ground_moving {
            for axis in 0..3 {
                let (v, g) = (velocity[axis], ground_velocity[axis]);
                if v * g > 0.0 && v.abs() < g.abs() {
                    velocity[axis] = g;
                }
            }
            velocity += ground_velocity * GROUND_VELOCITY_SHARE;
        }

        // 7. Steering.
        let damping_supported = self.supports(&*world, Capability::Damping);
        if self.on_ground || self.move_vector != Vec3::ZERO {
            let accel = if self.on_ground { self.config.ground_accel } else { self.config.air_accel };
            let wish = self.move_vector * self.side_speed();
            let current = flat(velocity - ground_velocity);
            let change = (wish - current).clamp_length_max(accel * dt);
            let horizontal = flat(velocity);
            let mut desired = horizontal + change;
            if damping_supported {
                // The backend divides by (1 + d·dt) after applying impulses.
                desired *= 1.0 + damping * dt;
            }
            impulse += (desired - horizontal) * self.config.mass;
        }

        // 8. Ground support.
        let mut gravity_scale = 1.0;
        if self.on_ground && !jump_now {
            gravity_scale = 0.0;
            velocity.z = velocity.z.max(0.0);
            if !self.timers.in_grace() {
                position.z += self.support_correction(&*world, &shape, position, &exclude);
            }
        }

        // 9. Jump.
        if jump_now {
            log::trace!("{body}: jump");
            velocity.z = self.config.jump_speed;
            position.z += JUMP_NUDGE;
            self.timers.jump_buffer = 0.0;
            self.timers.jump_cooldown = JUMP_COOLDOWN_SECS;
            self.timers.grace = 0.0;
            self.on_ground = false;
        }

        // 10. Sleep policy.
        let mut predicted = velocity + impulse / self.config.mass.max(f32::EPSILON);
        if damping_supported {
            predicted /= 1.0 + damping * dt;
        }
        let idle = self.move_vector == Vec3::ZERO && self.timers.jump_buffer == 0.0;
        if self.on_ground && ground_still && idle && flat(predicted).length() < self.config.min_sleep_speed {
            self.timers.sleep += dt;
        } else {
            self.timers.sleep = 0.0;
        }
        let mut go_to_sleep = self.timers.sleep > SLEEP_DELAY_TICKS * dt;
        if !go_to_sleep && self.config.quirks.zero_velocity_stall && stalled && idle {
            go_to_sleep = true;
        }
        if go_to_sleep && !self.supports(&*world, Capability::Sleep) {
            go_to_sleep = false;
        }

        // Write back.
        let b = world.body_mut(body).ok_or(MotionError::BodyNotFound(body))?;
        b.position = position;
        b.linear_velocity = velocity;
        b.angular_velocity = angular_velocity;
        b.gravity_scale = gravity_scale;
        b.sleeping = false;
        if damping_supported {
            b.linear_damping = damping;
        }
        if let Some(facing) = self.facing {
            b.rotation = facing;
        }
        if go_to_sleep {
            log::trace!("{body}: going to sleep");
            b.sleep();
            self.timers.sleep = 0.0;
        } else {
            b.add_impulse(impulse);
        }

        let relative = if go_to_sleep { Vec3::ZERO } else { predicted - ground_velocity };
        self.record_relative_velocity(relative, dt);
        Ok(())
    }

    // ── Persistence ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> LocomotionSnapshot {
        LocomotionSnapshot {
            ground_distance: self.contact.distance,
            timers:          self.timers,
            crouched:        self.crouched,
            crouch_blend:    self.crouch_blend,
            last_velocity:   self.last_velocity,
        }
    }

    /// Restore persisted state.  The caller is responsible for giving the
    /// body the collider matching `snapshot.crouched`.
    pub fn restore(&mut self, snapshot: &LocomotionSnapshot) {
        self.contact = GroundContact { distance: snapshot.ground_distance, ..GroundContact::airborne() };
        self.timers = snapshot.timers;
        self.crouched = snapshot.crouched;
        self.crouch_blend = snapshot.crouch_blend.clamp(0.0, 1.0);
        self.last_velocity = snapshot.last_velocity;
        self.on_ground = self.timers.time_on_ground > 0.0;
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Capability check that warns once per controller when unsupported.
    fn supports<W: PhysicsWorld + ?Sized>(&mut self, world: &W, capability: Capability) -> bool {
        if world.supports(capability) {
            return true;
        }
        if !self.warned.contains(&capability) {
            log::warn!("physics backend lacks {capability:?}; skipping it for this character");
            self.warned.push(capability);
        }
        false
    }

    /// `true` if the last known ground body is awake and moving.
    fn ground_moving<W: PhysicsWorld + ?Sized>(&self, world: &W) -> bool {
        self.contact
            .body
            .and_then(|id| world.body(id))
            .is_some_and(|g: &BodyState| {
                !g.sleeping
                    && (g.linear_velocity.length() > WAKE_SPEED || g.angular_velocity.length() > WAKE_SPEED)
            })
    }

    /// Vertical correction that keeps the feet on the surface.
    ///
    /// Embedded feet are lifted out with the climb resolver at zero offset;
    /// otherwise a ground distance off by more than the tolerance is snapped
    /// back to `position_to_floor` when within the support band.
    fn support_correction<W: PhysicsWorld + ?Sized>(
        &self,
        world:    &W,
        shape:    &CapsuleShape,
        position: Vec3,
        exclude:  &[BodyId],
    ) -> f32 {
        if self.contact.embedded() {
            let lift = climb_height(world, &self.config, shape, position, Vec3::ZERO, exclude);
            return if lift <= shape.walk_up_height { lift } else { 0.0 };
        }
        let distance = self.contact.distance;
        let ptf = shape.position_to_floor;
        let in_band = distance >= ptf - shape.walk_up_height && distance <= ptf + GROUND_SLACK;
        let deviation = distance - ptf;
        if in_band && deviation.abs() > GROUND_SNAP_TOLERANCE {
            -deviation
        } else {
            0.0
        }
    }

    fn advance_crouch_blend(&mut self, dt: f32) {
        let target = if self.crouched { 1.0 } else { 0.0 };
        let rate = if self.config.crouch_blend_time > 0.0 { dt / self.config.crouch_blend_time } else { 1.0 };
        let delta = (target - self.crouch_blend).clamp(-rate, rate);
        self.crouch_blend = (self.crouch_blend + delta).clamp(0.0, 1.0);
    }

    fn record_relative_velocity(&mut self, relative: Vec3, dt: f32) {
        self.relative_velocity = relative;
        let alpha = 1.0 - (-SMOOTHING_RATE * dt).exp();
        self.smoothed_velocity += (relative - self.smoothed_velocity) * alpha;
    }
}
