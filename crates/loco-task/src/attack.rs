//! Line of sight and fire control for the Attack task.

use glam::Vec3;

use loco_core::{AgentRng, BodyId};
use loco_physics::{ContactMask, PhysicsWorld, Ray};

use crate::weapon::{FireMode, Weapon};

/// Tuning of an agent's engagement behaviour.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttackConfig {
    /// Closer than this the agent backs away.
    pub optimal_min:           f32,
    /// Within this (and visible) the agent holds position.
    pub optimal_max:           f32,
    /// Eye height above the feet.
    pub eye_height:            f32,
    /// Aim error as a fraction of the target distance.  Zero aims exactly.
    pub aim_spread:            f32,
    /// Travel-time refinement passes for projectile weapons.
    pub prediction_iterations: u32,
    /// Bodies that block line of sight.
    pub sight_mask:            ContactMask,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            optimal_min:           4.0,
            optimal_max:           12.0,
            eye_height:            1.6,
            aim_spread:            0.0,
            prediction_iterations: 3,
            sight_mask:            ContactMask::ALL,
        }
    }
}

/// `true` if nothing but `shooter` and `target` lies between `from` and `to`.
pub fn line_of_sight(
    physics: &dyn PhysicsWorld,
    from:    Vec3,
    to:      Vec3,
    shooter: Option<BodyId>,
    target:  Option<BodyId>,
    mask:    ContactMask,
) -> bool {
    let skip: Vec<BodyId> = shooter.into_iter().chain(target).collect();
    physics.ray_cast_piercing(&Ray::between(from, to), mask, &skip).is_empty()
}

/// Where to aim so a projectile leaving `origin` at `speed` meets a target
/// currently at `position` moving at `velocity`.  Hitscan aims at `position`.
pub fn predict_aim(origin: Vec3, position: Vec3, velocity: Vec3, speed: Option<f32>, iterations: u32) -> Vec3 {
    let Some(speed) = speed.filter(|s| *s > 0.0) else {
        return position;
    };
    let mut aim = position;
    for _ in 0..iterations {
        let travel = origin.distance(aim) / speed;
        aim = position + velocity * travel;
    }
    aim
}

/// Perturb `aim` by up to `spread × distance` on each axis.
pub fn apply_spread(aim: Vec3, origin: Vec3, spread: f32, rng: &mut AgentRng) -> Vec3 {
    if spread <= 0.0 {
        return aim;
    }
    let extent = spread * origin.distance(aim);
    if extent <= 0.0 {
        return aim;
    }
    aim + Vec3::new(
        rng.gen_range(-extent..=extent),
        rng.gen_range(-extent..=extent),
        rng.gen_range(-extent..=extent),
    )
}

/// Target state fire control works from.
#[derive(Copy, Clone, Debug)]
pub struct FireSolution {
    pub aim_point: Vec3,
    pub velocity:  Vec3,
    pub body:      Option<BodyId>,
}

/// Fire every ready weapon whose range holds the target and whose muzzle can
/// see it.  Each weapon fires at most one mode per tick, normal first.
///
/// Returns the number of shots fired.
pub fn fire_weapons(
    weapons: &mut [Box<dyn Weapon>],
    physics: &dyn PhysicsWorld,
    eye:     Vec3,
    shooter: Option<BodyId>,
    target:  &FireSolution,
    config:  &AttackConfig,
    rng:     &mut AgentRng,
) -> usize {
    let mut fired = 0;
    for weapon in weapons.iter_mut() {
        let origin = eye + weapon.muzzle_offset();
        let distance = origin.distance(target.aim_point);
        let mut sight: Option<bool> = None;

        for mode in FireMode::ALL {
            if !weapon.is_ready(mode) {
                continue;
            }
            if !weapon.fire_range(mode).is_some_and(|r| r.contains(distance)) {
                continue;
            }
            let clear = *sight.get_or_insert_with(|| {
                line_of_sight(physics, origin, target.aim_point, shooter, target.body, config.sight_mask)
            });
            if !clear {
                break;
            }
            let aim = predict_aim(
                origin,
                target.aim_point,
                target.velocity,
                weapon.projectile_speed(mode),
                config.prediction_iterations,
            );
            let aim = apply_spread(aim, origin, config.aim_spread, rng);
            if weapon.try_fire(mode, origin, aim) {
                log::trace!("fired {mode:?} at {aim}");
                fired += 1;
                break;
            }
        }
    }
    fired
}
