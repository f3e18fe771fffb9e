//! Per-character simulation record.

use glam::{Quat, Vec3};

use loco_core::AgentRng;
use loco_motion::{CharacterConfig, LocomotionController};
use loco_nav::PathConfig;
use loco_task::{AttackConfig, TaskMachine, Weapon};

/// Everything the simulation owns for one character besides its body.
pub struct Character {
    pub controller:       LocomotionController,
    pub tasks:            TaskMachine,
    pub weapons:          Vec<Box<dyn Weapon>>,
    pub rng:              AgentRng,
    /// Set by the application while an animation must not be interrupted;
    /// Move and Attack then leave the steering alone.
    pub animation_locked: bool,
}

impl Character {
    /// `true` when the character was spawned without a usable capsule.
    pub fn is_degraded(&self) -> bool {
        self.controller.is_degraded()
    }
}

/// Spawn parameters for [`Sim::spawn_character`][crate::Sim::spawn_character].
pub struct CharacterSpawn {
    /// Where the character's feet start.
    pub feet:     Vec3,
    pub rotation: Quat,
    pub config:   CharacterConfig,
    pub path:     PathConfig,
    pub attack:   AttackConfig,
    pub weapons:  Vec<Box<dyn Weapon>>,
}

impl CharacterSpawn {
    pub fn at(feet: Vec3) -> Self {
        Self {
            feet,
            rotation: Quat::IDENTITY,
            config:   CharacterConfig::default(),
            path:     PathConfig::default(),
            attack:   AttackConfig::default(),
            weapons:  Vec::new(),
        }
    }

    pub fn with_config(mut self, config: CharacterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_attack(mut self, attack: AttackConfig) -> Self {
        self.attack = attack;
        self
    }

    pub fn with_weapon(mut self, weapon: impl Weapon + 'static) -> Self {
        self.weapons.push(Box::new(weapon));
        self
    }
}

/// Previous and current transform, for render interpolation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pose {
    pub previous: (Vec3, Quat),
    pub current:  (Vec3, Quat),
}

impl Pose {
    pub fn at(position: Vec3, rotation: Quat) -> Self {
        Self { previous: (position, rotation), current: (position, rotation) }
    }

    pub fn record(&mut self, position: Vec3, rotation: Quat) {
        self.previous = self.current;
        self.current = (position, rotation);
    }

    /// Blend `alpha ∈ [0, 1]` of the way from the previous to the current
    /// transform.
    pub fn interpolate(&self, alpha: f32) -> (Vec3, Quat) {
        let t = alpha.clamp(0.0, 1.0);
        (self.previous.0.lerp(self.current.0, t), self.previous.1.slerp(self.current.1, t))
    }
}
