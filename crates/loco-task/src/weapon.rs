//! The weapon contract used by Attack, plus a small reference weapon.
//!
//! Attack only needs to know whether a mode is ready, what distances it
//! covers, how fast its projectile travels and how to pull the trigger.
//! Ammunition, projectiles and damage live behind the trait.

use glam::Vec3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FireMode {
    Normal,
    Alternative,
}

impl FireMode {
    pub const ALL: [FireMode; 2] = [FireMode::Normal, FireMode::Alternative];
}

/// Inclusive distance band a fire mode is effective in.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FireRange {
    pub min: f32,
    pub max: f32,
}

impl FireRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.min && distance <= self.max
    }
}

pub trait Weapon {
    /// `true` if `mode` can fire this tick.
    fn is_ready(&self, mode: FireMode) -> bool;

    /// Distance band of `mode`, or `None` if the weapon lacks that mode.
    fn fire_range(&self, mode: FireMode) -> Option<FireRange>;

    /// Projectile speed of `mode`; `None` for hitscan.
    fn projectile_speed(&self, _mode: FireMode) -> Option<f32> {
        None
    }

    /// Muzzle position relative to the owner's eye, in world axes.
    fn muzzle_offset(&self) -> Vec3 {
        Vec3::ZERO
    }

    /// Fire `mode` toward `aim`.  Returns `false` if nothing was fired.
    fn try_fire(&mut self, mode: FireMode, origin: Vec3, aim: Vec3) -> bool;

    /// Advance cooldowns by `dt` seconds.
    fn tick(&mut self, _dt: f32) {}
}

// ── SimpleWeapon ──────────────────────────────────────────────────────────────

/// Parameters of one fire mode of a [`SimpleWeapon`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FireModeSpec {
    pub range:            FireRange,
    /// Seconds between shots.
    pub cooldown:         f32,
    pub projectile_speed: Option<f32>,
}

/// A shot recorded by [`SimpleWeapon`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shot {
    pub mode:   FireMode,
    pub origin: Vec3,
    pub aim:    Vec3,
}

/// Cooldown-gated weapon that logs every shot instead of spawning anything.
#[derive(Clone, Debug, Default)]
pub struct SimpleWeapon {
    pub normal:      Option<FireModeSpec>,
    pub alternative: Option<FireModeSpec>,
    /// Remaining cooldown, shared by both modes.
    pub cooldown:    f32,
    pub shots:       Vec<Shot>,
}

impl SimpleWeapon {
    /// Single-mode hitscan weapon.
    pub fn hitscan(range: FireRange, cooldown: f32) -> Self {
        Self {
            normal: Some(FireModeSpec { range, cooldown, projectile_speed: None }),
            ..Self::default()
        }
    }

    pub fn with_alternative(mut self, spec: FireModeSpec) -> Self {
        self.alternative = Some(spec);
        self
    }

    pub fn spec(&self, mode: FireMode) -> Option<&FireModeSpec> {
        match mode {
            FireMode::Normal => self.normal.as_ref(),
            FireMode::Alternative => self.alternative.as_ref(),
        }
    }
}

impl Weapon for SimpleWeapon {
    fn is_ready(&self, mode: FireMode) -> bool {
        self.cooldown <= 0.0 && self.spec(mode).is_some()
    }

    fn fire_range(&self, mode: FireMode) -> Option<FireRange> {
        self.spec(mode).map(|s| s.range)
    }

    fn projectile_speed(&self, mode: FireMode) -> Option<f32> {
        self.spec(mode).and_then(|s| s.projectile_speed)
    }

    fn try_fire(&mut self, mode: FireMode, origin: Vec3, aim: Vec3) -> bool {
        if !self.is_ready(mode) {
            return false;
        }
        let Some(spec) = self.spec(mode).copied() else { return false };
        self.cooldown = spec.cooldown;
        self.shots.push(Shot { mode, origin, aim });
        true
    }

    fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }
}
