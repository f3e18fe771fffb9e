//! Locomotion timers persisted across ticks.

/// Seconds a buffered jump request stays valid.
pub const JUMP_BUFFER_SECS: f32 = 0.4;
/// Seconds after a jump during which the character never counts as grounded.
pub const JUMP_COOLDOWN_SECS: f32 = 0.2;
/// Seconds a crouch change locks further changes.
pub const CROUCH_LOCK_SECS: f32 = 0.3;
/// Seconds a step-up lift keeps the character grounded.
pub const GRACE_SECS: f32 = 0.2;

/// Countdowns below this are treated as expired.
const EXPIRY_EPSILON: f32 = 1e-6;

/// Countdowns tick toward zero and clamp there; `time_on_ground` and
/// `time_not_on_ground` count up and reset on transition.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocomotionTimers {
    pub time_on_ground:     f32,
    pub time_not_on_ground: f32,
    pub jump_cooldown:      f32,
    pub jump_buffer:        f32,
    pub crouch_lock:        f32,
    pub sleep:              f32,
    pub grace:              f32,
}

impl LocomotionTimers {
    /// Decrement every countdown by `dt`.
    pub fn count_down(&mut self, dt: f32) {
        for t in [&mut self.jump_cooldown, &mut self.jump_buffer, &mut self.crouch_lock, &mut self.grace] {
            *t = (*t - dt).max(0.0);
            if *t < EXPIRY_EPSILON {
                *t = 0.0;
            }
        }
    }

    /// Accumulate grounded / airborne time.
    pub fn record_contact(&mut self, on_ground: bool, dt: f32) {
        if on_ground {
            self.time_on_ground += dt;
            self.time_not_on_ground = 0.0;
        } else {
            self.time_not_on_ground += dt;
            self.time_on_ground = 0.0;
        }
    }

    #[inline]
    pub fn jump_cooling_down(&self) -> bool {
        self.jump_cooldown > 0.0
    }

    #[inline]
    pub fn in_grace(&self) -> bool {
        self.grace > 0.0
    }
}
