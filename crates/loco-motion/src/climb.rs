//! Obstacle climb resolver.
//!
//! Lifts the query capsule by the prospective move plus the walk-up
//! allowance and sweeps it back down by the allowance.  The sweep outcome
//! classifies the move:
//!
//! | Sweep                   | Result                                   |
//! |-------------------------|------------------------------------------|
//! | clear                   | `0` (nothing to climb)                   |
//! | blocked at first sample | `+∞` (taller than the allowance)         |
//! | blocked at distance `d` | `walk_up_height − d` (lift needed)       |

use glam::Vec3;

use loco_core::BodyId;
use loco_physics::PhysicsWorld;

use crate::sweep::Sweep;
use crate::{CapsuleShape, CharacterConfig};

/// Vertical lift needed for a character at `position` to move by
/// `move_offset`.
pub fn climb_height<W: PhysicsWorld + ?Sized>(
    world:       &W,
    config:      &CharacterConfig,
    shape:       &CapsuleShape,
    position:    Vec3,
    move_offset: Vec3,
    exclude:     &[BodyId],
) -> f32 {
    let lifted = shape
        .query_capsule(position)
        .translated(move_offset + Vec3::Z * shape.walk_up_height);
    let sweep = Sweep {
        capsules:        std::slice::from_ref(&lifted),
        displacement:    Vec3::NEG_Z * shape.walk_up_height,
        step:            shape.radius / 2.0,
        first_iteration: true,
        mask:            config.ground_mask,
        exclude,
    }
    .run(world);

    if !sweep.blocked {
        0.0
    } else if sweep.at_first_sample {
        f32::INFINITY
    } else {
        (shape.walk_up_height - sweep.distance).max(0.0)
    }
}
